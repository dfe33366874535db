//! Error Types
//!
//! Two layers: `TreeError` for pure tree construction and navigation,
//! `SyncError` for the filesystem engine, which can also surface tree
//! errors while accumulating scanned entries.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by tree construction and the structural algorithms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A builder already holds an entry under this name.
    #[error("Conflicting names: {0}")]
    ConflictingNames(String),

    /// An intermediate path segment names a child that does not exist.
    #[error("No such directory: '{0}'")]
    NoSuchDirectory(String),

    /// An intermediate path segment names a file.
    #[error("Expected a directory, found a file: '{0}'")]
    ExpectedDirectory(String),

    /// The final path segment names a child that does not exist.
    #[error("No such file or directory: '{0}'")]
    NoSuchEntry(String),

    #[error("Cannot merge file into directory")]
    MergeFileIntoDirectory,

    #[error("Cannot merge directory into file")]
    MergeDirectoryIntoFile,
}

/// Failures raised by the filesystem reconciliation engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The destination exists as a non-directory and `replace` was not requested.
    #[error("Destination path already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    /// Nothing exists at the path given to `read`.
    #[error("No file at {}", .0.display())]
    NoSuchPath(PathBuf),

    /// The entry is neither a directory, a regular file, nor a symlink.
    #[error("Unsupported path: {}", .0.display())]
    UnsupportedPath(PathBuf),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
