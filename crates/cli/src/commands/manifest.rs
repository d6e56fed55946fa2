use std::path::Path;

use dialoguer::Editor;
use gitdeps::{
    config::AppConfig,
    fs::{FileSystem, RealFileSystem},
    manifest::{ManifestFile, ManifestWriteError},
};
use tracing::{debug, info};

use crate::{formatters::format_key, terminal_progress_reporter::TerminalProgressReporter};

pub(crate) fn handle_show(config: &AppConfig, reporter: TerminalProgressReporter) -> i32 {
    let manifest = ManifestFile::new(RealFileSystem, config.manifest_path());
    TerminalProgressReporter::report(
        0,
        format!(
            "{}: {}",
            format_key("path", reporter.use_colors()),
            manifest.path().display()
        ),
    );

    match manifest.read() {
        Ok(text) => {
            TerminalProgressReporter::report(0, text.trim_end());
            0
        }
        Err(e) => {
            reporter.report_error(e);
            reporter.report_suggestion("Check `manifest_path` in config.yaml or pass --manifest-path");
            1
        }
    }
}

/// Replace the manifest with the contents of `file`, or with what the user
/// saves in their editor.
pub(crate) fn handle_edit(
    file: Option<&Path>,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    let manifest = ManifestFile::new(RealFileSystem, config.manifest_path());
    info!("Editing manifest: {}", manifest.path().display());

    let edited = match file {
        Some(file) => match RealFileSystem.read_file(file) {
            Ok(text) => text,
            Err(e) => {
                reporter.report_error(format!("Cannot read '{}': {e}", file.display()));
                return 1;
            }
        },
        None => {
            let current = match manifest.read() {
                Ok(text) => text,
                Err(e) => {
                    reporter.report_error(e);
                    reporter.report_suggestion(
                        "Pass a file to create the manifest: 'gitdeps manifest edit <file>'",
                    );
                    return 1;
                }
            };

            match Editor::new().extension(".json").edit(&current) {
                Ok(Some(text)) if text != current => text,
                Ok(_) => {
                    reporter.report_info("Manifest unchanged.");
                    return 0;
                }
                Err(e) => {
                    reporter.report_error(format!("Could not run the editor: {e}"));
                    reporter.report_suggestion("Set $EDITOR or pass the new manifest as a file");
                    return 1;
                }
            }
        }
    };

    save_manifest(&manifest, &edited, reporter)
}

fn save_manifest<F: FileSystem>(
    manifest: &ManifestFile<F>,
    text: &str,
    reporter: TerminalProgressReporter,
) -> i32 {
    match manifest.replace(text) {
        Ok(git_packages) => {
            reporter.report_success(format!(
                "Saved {} ({git_packages} git package(s))",
                manifest.path().display()
            ));
            0
        }
        Err(e) => {
            debug!(error = ?e, "manifest edit rejected");
            reporter.report_error(&e);
            if !matches!(e, ManifestWriteError::FileSystem { .. }) {
                reporter.report_info("The manifest was not changed.");
            }
            1
        }
    }
}
