//! gitdeps - A git dependency manager
//!
//! The `gitdeps` library keeps a user-curated list of git-hosted packages,
//! organizes them into categories and reconciles that list against what a
//! package backend reports as installed.
//!
//! # Architecture
//!
//! This library follows the Hexagonal Architecture pattern (also known as Ports and Adapters).
//! The core logic is isolated from file systems, the installing backend and user interfaces
//! through well-defined interfaces (ports).
//!
//! # Main Components
//!
//! - [`specifier`] - Encoding and decoding of `<url>[?path=<sub>][#<rev>]` specifiers
//! - [`manifest`] - Structural scan of a manifest's `"dependencies"` block
//! - [`package`] - Package descriptors, categories, persistence and import/export
//! - [`backend`] - The package backend port, its operation handles and a manifest-editing adapter
//! - [`reconciler`] - The installation reconciler driving add, remove and list operations
//! - [`config`] - Application configuration management
//! - [`fs`] - File system abstractions
//! - [`validation`] - Validation types and utilities
//!
//! # Examples
//!
//! ```no_run
//! use gitdeps::specifier::Specifier;
//!
//! let spec = Specifier::decode("https://github.com/acme/tools.git?path=/Packages/core#v2.0.0");
//! assert_eq!(spec.revision, "v2.0.0");
//! ```

pub mod backend;
pub mod config;
pub mod fs;
pub mod manifest;
pub mod package;
pub mod reconciler;
pub mod specifier;
pub mod validation;
