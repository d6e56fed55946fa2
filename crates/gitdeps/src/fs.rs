//! File system abstractions and the real adapter

pub mod filesystem;
pub mod real;

pub use filesystem::{FileSystem, FileSystemError};
pub use real::RealFileSystem;
