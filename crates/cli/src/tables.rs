use comfy_table::{
    ContentArrangement, Row, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL_CONDENSED,
};
use gitdeps::validation::ValidationIssues;

use crate::terminal_progress_reporter::TerminalProgressReporter;

fn styled_table(header: Vec<&'static str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Validation issues, errors first, printed to stderr
pub(crate) struct ValidationTableReporter {
    table: Table,
    rows: usize,
}

impl ValidationTableReporter {
    pub(crate) fn new() -> Self {
        Self {
            table: styled_table(vec!["Category", "Field", "Message", "Suggestion"]),
            rows: 0,
        }
    }

    /// Add every issue, prefixing the category column with the package
    /// identifier when one is given
    pub(crate) fn add_issues(
        &mut self,
        identifier: Option<&str>,
        issues: &ValidationIssues,
        reporter: TerminalProgressReporter,
    ) -> &mut Self {
        let label = |category: String| match identifier {
            Some(id) => format!("{id}: {category}"),
            None => category,
        };

        for error in issues.errors() {
            self.table.add_row(vec![
                reporter.format_error(label(error.category().to_string())),
                error.field().to_string(),
                error.message().to_string(),
                error
                    .suggestion()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            ]);
            self.rows += 1;
        }

        for warning in issues.warnings() {
            self.table.add_row(vec![
                reporter.format_warning(label(warning.category().to_string())),
                warning.field().to_string(),
                warning.message().to_string(),
                warning
                    .suggestion()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            ]);
            self.rows += 1;
        }

        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub(crate) fn print(&self) {
        eprintln!("{}", &self.table);
    }
}

/// A table printed to stdout
pub(crate) struct ListTableReporter {
    table: Table,
}

impl ListTableReporter {
    pub(crate) fn new(header: Vec<&'static str>) -> Self {
        Self {
            table: styled_table(header),
        }
    }

    pub(crate) fn add_row<T: Into<Row>>(&mut self, row: T) -> &mut Self {
        self.table.add_row(row);
        self
    }

    pub(crate) fn print(&self) {
        println!("{}", &self.table);
    }
}
