pub(crate) mod add;
pub(crate) mod delete;
pub(crate) mod edit;
pub(crate) mod install;
pub(crate) mod list;
pub(crate) mod scan;
pub(crate) mod validate;

use gitdeps::{package::PackageDescriptor, validation::ValidationIssues};

use crate::{tables::ValidationTableReporter, terminal_progress_reporter::TerminalProgressReporter};

/// Print validation warnings for a package that is about to be stored.
/// Returns `false` if the package has errors.
pub(crate) fn report_descriptor_issues(
    descriptor: &PackageDescriptor,
    issues: &ValidationIssues,
    reporter: TerminalProgressReporter,
) -> bool {
    if issues.is_empty() {
        return true;
    }

    let mut table = ValidationTableReporter::new();
    table.add_issues(Some(&descriptor.identifier), issues, reporter);
    table.print();

    !issues.has_errors()
}
