pub(crate) mod category;
pub(crate) mod config;
pub(crate) mod manifest;
pub(crate) mod package;
pub(crate) mod specifier;

use gitdeps::{
    backend::ManifestBackend,
    config::AppConfig,
    fs::RealFileSystem,
    package::{
        PackageConfigError,
        port::{PackageStore, StoreError},
        store::YamlPackageStore,
    },
    reconciler::{InstallationReconciler, ReconcileError},
};
use tokio::runtime::Handle;
use tracing::debug;

use crate::{
    cli::{
        CategorySubcommands, ClapCommands, ConfigSubcommands, ManifestSubcommands,
        PackageSubcommands, SpecifierSubcommands,
    },
    terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) type CliStore = YamlPackageStore<RealFileSystem>;
pub(crate) type CliReconciler = InstallationReconciler<CliStore, ManifestBackend<RealFileSystem>>;

/// Primary command dispatcher that routes to the appropriate command handler
pub(crate) async fn dispatch_command(
    command: &ClapCommands,
    config: &AppConfig,
    original_config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    debug!("Dispatching command: {:?}", command);

    match command {
        ClapCommands::Package(package_cmd) => {
            dispatch_package_command(&package_cmd.command, config, reporter).await
        }
        ClapCommands::Category(category_cmd) => {
            dispatch_category_command(&category_cmd.command, config, reporter)
        }
        ClapCommands::Config(config_cmd) => {
            dispatch_config_command(&config_cmd.command, config, original_config, reporter)
        }
        ClapCommands::Specifier(specifier_cmd) => match &specifier_cmd.command {
            SpecifierSubcommands::Decode { specifier } => {
                specifier::handle_decode(specifier, reporter)
            }
        },
        ClapCommands::Manifest(manifest_cmd) => match &manifest_cmd.command {
            ManifestSubcommands::Show => manifest::handle_show(config, reporter),
            ManifestSubcommands::Edit { file } => {
                manifest::handle_edit(file.as_deref(), config, reporter)
            }
        },
    }
}

/// Handle package management commands
async fn dispatch_package_command(
    command: &PackageSubcommands,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    debug!("Handling package command: {:?}", command);

    match command {
        PackageSubcommands::List { category, search } => {
            package::list::handle_list(category.as_deref(), search.as_deref(), config, reporter)
        }
        PackageSubcommands::Add {
            identifier,
            url,
            path,
            revision,
            fields,
        } => package::add::handle_add(
            &package::add::AddArgs {
                identifier,
                url,
                path: path.as_deref(),
                revision: revision.as_deref(),
                fields,
            },
            config,
            reporter,
        ),
        PackageSubcommands::AddUrl {
            url,
            id,
            path,
            revision,
            category,
            install,
        } => {
            package::add::handle_add_url(
                &package::add::AddUrlArgs {
                    url,
                    id: id.as_deref(),
                    path: path.as_deref(),
                    revision: revision.as_deref(),
                    category: category.as_deref(),
                },
                *install,
                config,
                reporter,
            )
            .await
        }
        PackageSubcommands::AddLocal {
            dir,
            category,
            install,
        } => {
            package::add::handle_add_local(dir, category.as_deref(), *install, config, reporter)
                .await
        }
        PackageSubcommands::Edit {
            identifier,
            url,
            path,
            revision,
            fields,
        } => package::edit::handle_edit(
            identifier,
            &package::edit::EditArgs {
                url: url.as_deref(),
                path: path.as_deref(),
                revision: revision.as_deref(),
                fields,
            },
            config,
            reporter,
        ),
        PackageSubcommands::Delete { identifier, yes } => {
            package::delete::handle_delete(identifier, *yes, config, reporter)
        }
        PackageSubcommands::Install { identifier } => {
            package::install::handle_install(identifier, config, reporter).await
        }
        PackageSubcommands::Remove { identifier } => {
            package::install::handle_remove(identifier, config, reporter).await
        }
        PackageSubcommands::Refresh => package::install::handle_refresh(config, reporter).await,
        PackageSubcommands::Scan { import } => {
            package::scan::handle_scan(*import, config, reporter)
        }
        PackageSubcommands::Validate { identifier } => {
            package::validate::handle_validate(identifier.as_deref(), config, reporter)
        }
    }
}

/// Handle category commands
fn dispatch_category_command(
    command: &CategorySubcommands,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    debug!("Handling category command: {:?}", command);

    match command {
        CategorySubcommands::List => category::handle_list(config, reporter),
        CategorySubcommands::Add { name } => category::handle_add(name, config, reporter),
        CategorySubcommands::Delete { name } => category::handle_delete(name, config, reporter),
    }
}

/// Handle configuration management commands
fn dispatch_config_command(
    command: &ConfigSubcommands,
    config: &AppConfig,
    original_config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    debug!("Handling config command: {:?}", command);

    match command {
        ConfigSubcommands::Validate => config::handle_validate(original_config, reporter),
        ConfigSubcommands::Export { file, packages } => {
            config::handle_export(file, packages, config, reporter)
        }
        ConfigSubcommands::Import { file, on_conflict } => {
            config::handle_import(file, *on_conflict, config, reporter)
        }
    }
}

pub(crate) fn open_store(config: &AppConfig) -> CliStore {
    YamlPackageStore::new(RealFileSystem, config.store_path())
}

/// Open the store and the manifest backend. Must be called from within the
/// tokio runtime.
pub(crate) fn open_reconciler(config: &AppConfig) -> Result<CliReconciler, ReconcileError> {
    let backend = ManifestBackend::new(RealFileSystem, config.manifest_path(), Handle::current());
    InstallationReconciler::new(open_store(config), backend)
}

/// Load the store, apply `change` and save the result. Nothing is written if
/// `change` fails.
pub(crate) fn edit_store<R, F>(config: &AppConfig, change: F) -> Result<R, ReconcileError>
where
    F: FnOnce(&mut gitdeps::package::PackageConfig) -> Result<R, PackageConfigError>,
{
    let store = open_store(config);
    let mut packages = store.load().map_err(ReconcileError::Persistence)?;
    let value = change(&mut packages)?;
    store.save(&packages).map_err(ReconcileError::Persistence)?;
    Ok(value)
}

/// Print a library error with a hint where one helps
pub(crate) fn report_reconcile_error(error: &ReconcileError, reporter: TerminalProgressReporter) {
    reporter.report_error(error);

    match error {
        ReconcileError::PackageNotFound(_)
        | ReconcileError::Config(PackageConfigError::PackageNotFound(_)) => {
            reporter.report_suggestion("Run 'gitdeps package list' to see stored packages");
        }
        ReconcileError::Config(PackageConfigError::DuplicateIdentifier(_)) => {
            reporter.report_suggestion("Use 'gitdeps package edit' to change the stored package");
        }
        ReconcileError::Persistence(StoreError::Yaml { path, .. }) => {
            reporter.report_info(format!("Store file: {}", path.display()));
            reporter.report_suggestion("Fix or move the store file and try again");
        }
        ReconcileError::OperationInProgress { .. }
        | ReconcileError::Persistence(_)
        | ReconcileError::Config(_) => {}
    }
}
