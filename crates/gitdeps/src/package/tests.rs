//! Tests for `PackageConfig` mutations

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;

use super::*;

fn descriptor(identifier: &str) -> PackageDescriptor {
    PackageDescriptorBuilder::default()
        .identifier(identifier)
        .display_name(&identifier.to_uppercase())
        .repository_url(&format!("https://github.com/owner/{identifier}.git"))
        .build()
}

fn config_with(packages: &[(&str, &str)]) -> PackageConfig {
    let mut config = PackageConfig::default();
    for (identifier, category) in packages {
        let mut d = descriptor(identifier);
        d.category = (*category).to_string();
        config.add_package(d).unwrap();
    }
    config
}

fn ids<'a>(packages: impl IntoIterator<Item = &'a PackageDescriptor>) -> Vec<&'a str> {
    packages.into_iter().map(|p| p.identifier.as_str()).collect()
}

#[test]
fn test_add_package_rejects_duplicate_identifier() {
    let mut config = config_with(&[("com.a.tool", "Tools")]);

    let err = config.add_package(descriptor("com.a.tool")).unwrap_err();

    assert_eq!(
        err,
        PackageConfigError::DuplicateIdentifier("com.a.tool".to_string())
    );
    assert_eq!(config.packages().len(), 1);
    assert_eq!(config.get("com.a.tool").unwrap().category, "Tools");
}

#[test]
fn test_add_package_requires_identifier_and_url() {
    let mut config = PackageConfig::default();

    let err = config
        .add_package(PackageDescriptorBuilder::default().identifier("com.a.x").build())
        .unwrap_err();
    assert_eq!(
        err,
        PackageConfigError::MissingField {
            identifier: "com.a.x".to_string(),
            field: "repository_url",
        }
    );

    let err = config
        .add_package(
            PackageDescriptorBuilder::default()
                .repository_url("https://host/x.git")
                .build(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        PackageConfigError::MissingField {
            field: "identifier",
            ..
        }
    ));
    assert!(config.packages().is_empty());
}

#[test]
fn test_add_package_normalizes_category_and_revision() {
    let mut config = PackageConfig::default();
    let mut d = descriptor("com.a.tool");
    d.category = "Nonexistent".to_string();
    d.revision = String::new();
    config.add_package(d).unwrap();

    let mut d = descriptor("com.a.all");
    d.category = ALL_CATEGORY.to_string();
    config.add_package(d).unwrap();

    assert_eq!(config.get("com.a.tool").unwrap().category, FALLBACK_CATEGORY);
    assert_eq!(config.get("com.a.tool").unwrap().revision, "main");
    assert_eq!(config.get("com.a.all").unwrap().category, FALLBACK_CATEGORY);
}

#[test]
fn test_upsert_replaces_or_appends() {
    let mut config = config_with(&[("com.a.tool", "Tools")]);

    let mut replacement = descriptor("com.a.tool");
    replacement.revision = "v2".to_string();
    assert!(config.upsert_package(replacement).unwrap());
    assert!(!config.upsert_package(descriptor("com.a.new")).unwrap());

    assert_eq!(config.get("com.a.tool").unwrap().revision, "v2");
    assert_eq!(ids(config.packages()), vec!["com.a.tool", "com.a.new"]);
}

#[test]
fn test_update_package_keeps_identifier() {
    let mut config = config_with(&[("com.a.tool", "Tools")]);

    config
        .update_package("com.a.tool", |p| {
            p.identifier = "com.a.renamed".to_string();
            p.description = "edited".to_string();
            p.category = "UI".to_string();
        })
        .unwrap();

    let p = config.get("com.a.tool").unwrap();
    assert_eq!(p.description, "edited");
    assert_eq!(p.category, "UI");
    assert!(!config.contains("com.a.renamed"));
}

#[test]
fn test_update_package_rejects_cleared_url() {
    let mut config = config_with(&[("com.a.tool", "Tools")]);
    let before = config.clone();

    let err = config
        .update_package("com.a.tool", |p| p.repository_url.clear())
        .unwrap_err();

    assert!(matches!(err, PackageConfigError::MissingField { .. }));
    assert_eq!(config, before);
}

#[test]
fn test_update_and_remove_unknown_package() {
    let mut config = PackageConfig::default();

    assert_eq!(
        config.update_package("missing", |_| {}),
        Err(PackageConfigError::PackageNotFound("missing".to_string()))
    );
    assert_eq!(
        config.remove_package("missing"),
        Err(PackageConfigError::PackageNotFound("missing".to_string()))
    );
}

#[test]
fn test_remove_package_returns_descriptor() {
    let mut config = config_with(&[("com.a.one", "Tools"), ("com.a.two", "UI")]);

    let removed = config.remove_package("com.a.one").unwrap();

    assert_eq!(removed.identifier, "com.a.one");
    assert_eq!(ids(config.packages()), vec!["com.a.two"]);
}

#[test]
fn test_set_installed() {
    let mut config = config_with(&[("com.a.tool", "Tools")]);

    assert!(config.set_installed("com.a.tool", true));
    assert!(!config.set_installed("com.a.missing", true));
    assert!(config.get("com.a.tool").unwrap().installed);
}

#[test]
fn test_reconcile_installed_matches_set_exactly() {
    let mut config = config_with(&[("com.a.one", "Tools"), ("com.a.two", "Tools")]);
    config.set_installed("com.a.one", true);

    let installed: BTreeSet<String> = ["com.a.two", "com.other.unmanaged"]
        .into_iter()
        .map(String::from)
        .collect();
    config.reconcile_installed(&installed);

    assert!(!config.get("com.a.one").unwrap().installed);
    assert!(config.get("com.a.two").unwrap().installed);
    assert_eq!(config.packages().len(), 2);
}

#[test]
fn test_delete_category_reassigns_packages() {
    let mut config = config_with(&[
        ("com.a.one", "VFX"),
        ("com.a.two", "VFX"),
        ("com.a.three", "Tools"),
    ]);

    let moved = config.delete_category("VFX").unwrap();

    assert_eq!(moved, 2);
    assert!(!config.categories().contains("VFX"));
    assert_eq!(config.get("com.a.one").unwrap().category, FALLBACK_CATEGORY);
    assert_eq!(config.get("com.a.two").unwrap().category, FALLBACK_CATEGORY);
    assert_eq!(config.get("com.a.three").unwrap().category, "Tools");
}

#[test]
fn test_delete_all_category_is_rejected() {
    let mut config = config_with(&[("com.a.one", "Tools")]);
    let before = config.clone();

    let err = config.delete_category(ALL_CATEGORY).unwrap_err();

    assert_eq!(
        err,
        PackageConfigError::Category(CategoryError::Protected("All".to_string()))
    );
    assert_eq!(config, before);
}

#[test]
fn test_add_category_then_use_it() {
    let mut config = PackageConfig::default();
    config.add_category("Audio").unwrap();

    let mut d = descriptor("com.a.synth");
    d.category = "Audio".to_string();
    config.add_package(d).unwrap();

    assert_eq!(config.get("com.a.synth").unwrap().category, "Audio");
}

#[test]
fn test_filter_by_category_and_search() {
    let mut config = config_with(&[
        ("com.a.shader", "VFX"),
        ("com.a.particles", "VFX"),
        ("com.a.console", "Tools"),
    ]);
    config
        .update_package("com.a.console", |p| p.description = "Shader debugging".to_string())
        .unwrap();

    assert_eq!(ids(config.filter(ALL_CATEGORY, "")), vec![
        "com.a.shader",
        "com.a.particles",
        "com.a.console"
    ]);
    assert_eq!(ids(config.filter("VFX", "")), vec![
        "com.a.shader",
        "com.a.particles"
    ]);
    assert_eq!(ids(config.filter(ALL_CATEGORY, "SHADER")), vec![
        "com.a.shader",
        "com.a.console"
    ]);
    assert_eq!(ids(config.filter("VFX", "shader")), vec!["com.a.shader"]);
    assert!(config.filter("Audio", "").is_empty());
}

#[test]
fn test_merge_detected_last_occurrence_wins() {
    let mut config = PackageConfig::default();

    let mut first = descriptor("com.a.tool");
    first.revision = "v1".to_string();
    let mut second = descriptor("com.a.tool");
    second.revision = "v2".to_string();

    let added = config.merge_detected(vec![first, descriptor("com.a.other"), second]);

    assert_eq!(added, vec!["com.a.tool", "com.a.other"]);
    assert_eq!(config.get("com.a.tool").unwrap().revision, "v2");
    assert_eq!(config.packages().len(), 2);
}

#[test]
fn test_merge_detected_skips_existing() {
    let mut config = config_with(&[("com.a.tool", "Tools")]);

    let mut detected = descriptor("com.a.tool");
    detected.revision = "dev".to_string();
    let added = config.merge_detected(vec![detected, descriptor("com.a.new")]);

    assert_eq!(added, vec!["com.a.new"]);
    assert_eq!(config.get("com.a.tool").unwrap().revision, "main");
    assert_eq!(config.get("com.a.tool").unwrap().category, "Tools");
}

#[test]
fn test_descriptor_helpers() {
    let mut d = descriptor("com.a.tool");
    d.subdirectory_path = "Packages/tool".to_string();

    assert_eq!(
        d.specifier(),
        "https://github.com/owner/com.a.tool.git?path=Packages/tool"
    );
    assert!(!d.is_local());
    assert_eq!(d.label(), "COM.A.TOOL");

    d.display_name.clear();
    assert_eq!(d.label(), "com.a.tool");
}
