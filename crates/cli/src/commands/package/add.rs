use std::path::{self, Path};

use gitdeps::{
    config::AppConfig,
    fs::RealFileSystem,
    package::{PackageDescriptor, PackageDescriptorBuilder, local::read_local_package, port::PackageStore},
    specifier::{Specifier, derive_identifier},
};
use tracing::info;

use super::report_descriptor_issues;
use crate::{
    cli::DescriptorFields,
    commands::{edit_store, open_reconciler, open_store, report_reconcile_error},
    event_reporter::EventReporter,
    terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) struct AddArgs<'a> {
    pub(crate) identifier: &'a str,
    pub(crate) url: &'a str,
    pub(crate) path: Option<&'a str>,
    pub(crate) revision: Option<&'a str>,
    pub(crate) fields: &'a DescriptorFields,
}

pub(crate) struct AddUrlArgs<'a> {
    pub(crate) url: &'a str,
    pub(crate) id: Option<&'a str>,
    pub(crate) path: Option<&'a str>,
    pub(crate) revision: Option<&'a str>,
    pub(crate) category: Option<&'a str>,
}

pub(crate) fn handle_add(
    args: &AddArgs<'_>,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    info!("Adding package: {}", args.identifier);

    let mut builder = PackageDescriptorBuilder::default()
        .identifier(args.identifier)
        .repository_url(args.url)
        .subdirectory_path(args.path.unwrap_or_default());
    if let Some(revision) = args.revision {
        builder = builder.revision(revision);
    }
    let mut descriptor = builder.build();
    apply_fields(&mut descriptor, args.fields);

    add_to_store(descriptor, config, reporter)
}

pub(crate) async fn handle_add_url(
    args: &AddUrlArgs<'_>,
    install: bool,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    let Some(descriptor) = descriptor_from_url(args) else {
        reporter.report_error(format!("Could not derive a package identifier from '{}'", args.url));
        reporter.report_suggestion("Pass one explicitly with --id");
        return 1;
    };

    info!("Adding package {} from {}", descriptor.identifier, args.url);
    if install {
        add_and_install(descriptor, config, reporter).await
    } else {
        add_to_store(descriptor, config, reporter)
    }
}

pub(crate) async fn handle_add_local(
    dir: &Path,
    category: Option<&str>,
    install: bool,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    let dir = path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());

    let mut descriptor = match read_local_package(&RealFileSystem, &dir) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            reporter.report_error(e);
            return 1;
        }
    };
    if let Some(category) = category {
        descriptor.category = category.to_string();
    }

    info!("Adding local package {} from {}", descriptor.identifier, dir.display());
    if install {
        add_and_install(descriptor, config, reporter).await
    } else {
        add_to_store(descriptor, config, reporter)
    }
}

/// Build a descriptor from a specifier URL. `--path` and `--revision` win
/// over the parts encoded in the URL.
fn descriptor_from_url(args: &AddUrlArgs<'_>) -> Option<PackageDescriptor> {
    let specifier = Specifier::decode(args.url);
    let derived = derive_identifier(&specifier.repository_url);

    let (identifier, display_name) = match (args.id, derived) {
        (Some(id), derived) => (
            id.to_string(),
            derived.map(|d| d.display_name).unwrap_or_default(),
        ),
        (None, Some(derived)) => (derived.identifier, derived.display_name),
        (None, None) => return None,
    };

    let mut builder = PackageDescriptorBuilder::default()
        .identifier(&identifier)
        .display_name(&display_name)
        .repository_url(&specifier.repository_url)
        .subdirectory_path(args.path.unwrap_or(&specifier.subdirectory_path))
        .revision(args.revision.unwrap_or(&specifier.revision));
    if let Some(category) = args.category {
        builder = builder.category(category);
    }

    Some(builder.build())
}

pub(super) fn apply_fields(descriptor: &mut PackageDescriptor, fields: &DescriptorFields) {
    if let Some(display_name) = &fields.display_name {
        descriptor.display_name.clone_from(display_name);
    }
    if let Some(description) = &fields.description {
        descriptor.description.clone_from(description);
    }
    if let Some(version) = &fields.version {
        descriptor.version.clone_from(version);
    }
    if let Some(category) = &fields.category {
        descriptor.category.clone_from(category);
    }
}

/// Validate `descriptor` against the stored categories and report issues.
/// Returns `false` if it must not be stored.
fn check_descriptor(
    descriptor: &PackageDescriptor,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> bool {
    let packages = match open_store(config).load() {
        Ok(packages) => packages,
        Err(e) => {
            reporter.report_error(e);
            return false;
        }
    };

    let result = descriptor.validate(packages.categories());
    if report_descriptor_issues(descriptor, result.issues(), reporter) {
        true
    } else {
        reporter.report_error(format!("Package '{}' was not added", descriptor.identifier));
        false
    }
}

fn add_to_store(
    descriptor: PackageDescriptor,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    if !check_descriptor(&descriptor, config, reporter) {
        return 1;
    }

    let identifier = descriptor.identifier.clone();
    match edit_store(config, |packages| packages.add_package(descriptor)) {
        Ok(()) => {
            reporter.report_success(format!("Added '{identifier}'"));
            reporter.report_suggestion(format!(
                "Run 'gitdeps package install {identifier}' to install it"
            ));
            0
        }
        Err(e) => {
            report_reconcile_error(&e, reporter);
            1
        }
    }
}

async fn add_and_install(
    descriptor: PackageDescriptor,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    if !check_descriptor(&descriptor, config, reporter) {
        return 1;
    }

    let mut reconciler = match open_reconciler(config) {
        Ok(reconciler) => reconciler,
        Err(e) => {
            report_reconcile_error(&e, reporter);
            return 1;
        }
    };

    let identifier = descriptor.identifier.clone();
    if let Err(e) = reconciler.update_config(|packages| packages.add_package(descriptor)) {
        report_reconcile_error(&e, reporter);
        return 1;
    }
    reporter.report_success(format!("Added '{identifier}'"));

    if let Err(e) = reconciler.install(&identifier) {
        report_reconcile_error(&e, reporter);
        return 1;
    }
    reporter.report_progress(format!("Installing '{identifier}'"));

    EventReporter::new(reporter)
        .drive(
            &mut reconciler,
            config.tick_interval(),
            config.operation_timeout(),
        )
        .await
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use test_common::{create_local_package_dir, test_config_with_dir};

    use super::*;

    fn reporter() -> TerminalProgressReporter {
        TerminalProgressReporter::new(false)
    }

    fn stored(config: &AppConfig) -> gitdeps::package::PackageConfig {
        open_store(config).load().unwrap()
    }

    #[test]
    fn test_add_stores_descriptor() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());
        let fields = DescriptorFields {
            display_name: Some("Acme Tools".to_string()),
            category: Some("Tools".to_string()),
            ..DescriptorFields::default()
        };

        let code = handle_add(
            &AddArgs {
                identifier: "com.acme.tools",
                url: "https://github.com/acme/tools.git",
                path: Some("/Packages/tools"),
                revision: Some("v2.0.0"),
                fields: &fields,
            },
            &config,
            reporter(),
        );

        assert_eq!(code, 0);
        let package = stored(&config).get("com.acme.tools").cloned().unwrap();
        assert_eq!(package.display_name, "Acme Tools");
        assert_eq!(package.subdirectory_path, "/Packages/tools");
        assert_eq!(package.revision, "v2.0.0");
        assert_eq!(package.category, "Tools");
        assert!(!package.installed);
    }

    #[test]
    fn test_add_duplicate_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());
        let fields = DescriptorFields::default();
        let args = AddArgs {
            identifier: "com.acme.tools",
            url: "https://github.com/acme/tools.git",
            path: None,
            revision: None,
            fields: &fields,
        };

        assert_eq!(handle_add(&args, &config, reporter()), 0);
        assert_eq!(handle_add(&args, &config, reporter()), 1);
        assert_eq!(stored(&config).packages().len(), 1);
    }

    #[test]
    fn test_add_rejects_url_with_fragment() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());
        let fields = DescriptorFields::default();

        let code = handle_add(
            &AddArgs {
                identifier: "com.acme.tools",
                url: "https://github.com/acme/tools.git#main",
                path: None,
                revision: None,
                fields: &fields,
            },
            &config,
            reporter(),
        );

        assert_eq!(code, 1);
        assert!(!config.store_path().exists());
    }

    #[test]
    fn test_descriptor_from_url_derives_identity() {
        let descriptor = descriptor_from_url(&AddUrlArgs {
            url: "https://github.com/Acme/cool-tool.git?path=/Packages/core#v3",
            id: None,
            path: None,
            revision: None,
            category: Some("Utilities"),
        })
        .unwrap();

        assert_eq!(descriptor.identifier, "com.acme.cool-tool");
        assert_eq!(descriptor.display_name, "Cool Tool");
        assert_eq!(descriptor.repository_url, "https://github.com/Acme/cool-tool.git");
        assert_eq!(descriptor.subdirectory_path, "/Packages/core");
        assert_eq!(descriptor.revision, "v3");
        assert_eq!(descriptor.category, "Utilities");
    }

    #[test]
    fn test_descriptor_from_url_overrides() {
        let descriptor = descriptor_from_url(&AddUrlArgs {
            url: "https://github.com/acme/tools.git#v1",
            id: Some("com.example.renamed"),
            path: Some("sub"),
            revision: Some("dev"),
            category: None,
        })
        .unwrap();

        assert_eq!(descriptor.identifier, "com.example.renamed");
        assert_eq!(descriptor.subdirectory_path, "sub");
        assert_eq!(descriptor.revision, "dev");
    }

    #[test]
    fn test_descriptor_from_url_without_owner_needs_id() {
        let args = AddUrlArgs {
            url: "not a url",
            id: None,
            path: None,
            revision: None,
            category: None,
        };

        assert!(descriptor_from_url(&args).is_none());
    }

    #[tokio::test]
    async fn test_add_url_with_install_writes_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());

        let code = handle_add_url(
            &AddUrlArgs {
                url: "https://github.com/acme/tools.git#v1.2.0",
                id: None,
                path: None,
                revision: None,
                category: None,
            },
            true,
            &config,
            reporter(),
        )
        .await;

        assert_eq!(code, 0);
        let manifest = fs::read_to_string(config.manifest_path()).unwrap();
        assert!(manifest.contains(r#""com.acme.tools": "https://github.com/acme/tools.git#v1.2.0""#));
        assert!(stored(&config).get("com.acme.tools").unwrap().installed);
    }

    #[tokio::test]
    async fn test_add_local_stores_file_url() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());
        let dir = create_local_package_dir(&temp_dir, "com.acme.local", "Local Tools");

        let code = handle_add_local(&dir, Some("Tools"), false, &config, reporter()).await;

        assert_eq!(code, 0);
        let package = stored(&config).get("com.acme.local").cloned().unwrap();
        assert!(package.is_local());
        assert_eq!(package.display_name, "Local Tools");
        assert_eq!(package.category, "Tools");
    }

    #[tokio::test]
    async fn test_add_local_without_manifest_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());

        let code = handle_add_local(temp_dir.path(), None, false, &config, reporter()).await;

        assert_eq!(code, 1);
    }
}
