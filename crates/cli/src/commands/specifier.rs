use gitdeps::specifier::{Specifier, derive_identifier};

use crate::{formatters::format_key, terminal_progress_reporter::TerminalProgressReporter};

/// Print the parts of a specifier, one `key: value` line each
pub(crate) fn handle_decode(specifier: &str, reporter: TerminalProgressReporter) -> i32 {
    let decoded = Specifier::decode(specifier);
    let use_colors = reporter.use_colors();
    let line = |key: &str, value: &str| {
        let value = if value.is_empty() { "-" } else { value };
        TerminalProgressReporter::report(0, format!("{}: {value}", format_key(key, use_colors)));
    };

    line("url", &decoded.repository_url);
    line("path", &decoded.subdirectory_path);
    line("revision", &decoded.revision);

    match derive_identifier(&decoded.repository_url) {
        Some(derived) => {
            line("identifier", &derived.identifier);
            line("display_name", &derived.display_name);
        }
        None => reporter.report_warning("No identifier can be derived from this URL"),
    }

    0
}
