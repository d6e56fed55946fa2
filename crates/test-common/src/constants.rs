//! Common test constants used across multiple test files.

/// Identifier used by most single-package tests
pub const TEST_IDENTIFIER: &str = "com.acme.tools";

/// Repository the test identifier lives in
pub const TEST_REPOSITORY_URL: &str = "https://github.com/acme/tools.git";

/// Default test revision
pub const TEST_REVISION: &str = "v1.2.0";

/// Category created by tests that need one beyond the built-ins
pub const TEST_CATEGORY: &str = "Networking";

/// Default test store path
pub const TEST_STORE_PATH: &str = "/tmp/gitdeps-test/packages.yaml";

/// Default test manifest path
pub const TEST_MANIFEST_PATH: &str = "/tmp/gitdeps-test/Packages/manifest.json";

/// Environment variable the CLI integration tests point at a temp dir
pub const CONFIG_DIR_ENV: &str = gitdeps::fs::real::CONFIG_DIR_ENV;
