//! Filesystem Reconciliation
//!
//! Materializes a virtual directory onto a real filesystem location with
//! minimal writes (`generate`) and scans a real location back into a
//! virtual tree (`read`). I/O is blocking, sequential and depth-first;
//! existence and type checks use lstat semantics, so symbolic links are
//! never followed.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::directory::VirtualDirectory;
use crate::error::SyncError;
use crate::node::{VirtualFile, VirtualNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
    Symlink,
    Other,
}

/// lstat the path; `None` when nothing exists there.
fn entry_kind(path: &Path) -> io::Result<Option<EntryKind>> {
    match fs::symlink_metadata(path) {
        Ok(metadata) => {
            let file_type = metadata.file_type();
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else if file_type.is_symlink() {
                EntryKind::Symlink
            } else {
                EntryKind::Other
            };
            Ok(Some(kind))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Remove whatever sits at `path`. A target that no longer exists is fine.
fn delete_recursively(path: &Path) -> Result<(), SyncError> {
    match entry_kind(path)? {
        Some(EntryKind::Directory) => {
            debug!(path = ?path, "Removing directory tree");
            fs::remove_dir_all(path)?;
        }
        Some(_) => {
            debug!(path = ?path, "Removing entry");
            fs::remove_file(path)?;
        }
        None => {}
    }
    Ok(())
}

/// Materialize `directory` at `destination`.
///
/// An existing directory destination is reconciled in place. A
/// non-directory destination fails unless `replace` is set, in which case
/// it is deleted first. File writes are skipped when the existing content
/// already matches, so re-running over an unchanged tree touches nothing.
pub fn generate(
    directory: &VirtualDirectory,
    destination: &Path,
    replace: bool,
) -> Result<(), SyncError> {
    match entry_kind(destination)? {
        Some(EntryKind::Directory) => {}
        Some(_) => {
            if !replace {
                return Err(SyncError::DestinationExists(destination.to_path_buf()));
            }
            delete_recursively(destination)?;
            debug!(path = ?destination, "Creating directory");
            fs::create_dir(destination)?;
        }
        None => {
            debug!(path = ?destination, "Creating directory");
            fs::create_dir(destination)?;
        }
    }

    for (name, child) in directory.entries() {
        let child_destination = destination.join(name);
        match child {
            VirtualNode::Directory(child_directory) => {
                if let Some(kind) = entry_kind(&child_destination)? {
                    if kind != EntryKind::Directory {
                        delete_recursively(&child_destination)?;
                    }
                }
                generate(child_directory, &child_destination, true)?;
            }
            VirtualNode::File(file) => {
                generate_file(file, &child_destination)?;
            }
        }
    }
    Ok(())
}

fn generate_file(file: &VirtualFile, destination: &Path) -> Result<(), SyncError> {
    match entry_kind(destination)? {
        Some(EntryKind::File) => {
            // Only write if content has changed.
            let existing = fs::read(destination)?;
            if String::from_utf8_lossy(&existing) == file.text() {
                debug!(path = ?destination, "Content unchanged, skipping write");
                return Ok(());
            }
        }
        Some(_) => {
            delete_recursively(destination)?;
        }
        None => {}
    }
    debug!(path = ?destination, bytes = file.content().len(), "Writing file");
    fs::write(destination, file.content())?;
    Ok(())
}

/// Scan a real filesystem path into a virtual tree.
///
/// Returns `Ok(None)` for a symbolic link; links are never followed and
/// never appear in the result. Entry kinds other than directories, regular
/// files and symlinks are an error.
pub fn read(source: &Path) -> Result<Option<VirtualNode>, SyncError> {
    match entry_kind(source)? {
        None => Err(SyncError::NoSuchPath(source.to_path_buf())),
        Some(EntryKind::Directory) => {
            let mut builder = VirtualDirectory::builder();
            for entry in fs::read_dir(source)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if let Some(child) = read(&entry.path())? {
                    builder = builder.add_child(&name, child)?;
                }
            }
            Ok(Some(VirtualNode::Directory(builder.build())))
        }
        Some(EntryKind::File) => Ok(Some(VirtualNode::File(VirtualFile::new(fs::read(
            source,
        )?)))),
        Some(EntryKind::Symlink) => {
            debug!(path = ?source, "Ignoring symbolic link");
            Ok(None)
        }
        Some(EntryKind::Other) => Err(SyncError::UnsupportedPath(source.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_tree() -> VirtualDirectory {
        VirtualDirectory::builder()
            .add_file("a.txt", "alpha")
            .unwrap()
            .add_directory(
                "sub",
                VirtualDirectory::builder().add_file("b.txt", "beta").unwrap(),
            )
            .unwrap()
            .build()
    }

    #[test]
    fn test_generate_creates_a_fresh_tree() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("out");

        generate(&sample_tree(), &destination, false).unwrap();

        assert_eq!(fs::read_to_string(destination.join("a.txt")).unwrap(), "alpha");
        assert_eq!(
            fs::read_to_string(destination.join("sub/b.txt")).unwrap(),
            "beta"
        );
    }

    #[test]
    fn test_generate_reuses_an_existing_directory_destination() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("out");
        fs::create_dir(&destination).unwrap();
        fs::write(destination.join("stale.txt"), "old").unwrap();

        generate(&sample_tree(), &destination, false).unwrap();

        // Reconciled in place: new entries written, unrelated entries untouched.
        assert_eq!(fs::read_to_string(destination.join("a.txt")).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(destination.join("stale.txt")).unwrap(), "old");
    }

    #[test]
    fn test_generate_fails_on_non_directory_destination_without_replace() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("out");
        fs::write(&destination, "a file").unwrap();

        let err = generate(&sample_tree(), &destination, false).unwrap_err();
        assert!(matches!(err, SyncError::DestinationExists(_)));
    }

    #[test]
    fn test_generate_replaces_a_non_directory_destination() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("out");
        fs::write(&destination, "a file").unwrap();

        generate(&sample_tree(), &destination, true).unwrap();

        assert!(destination.is_dir());
        assert_eq!(fs::read_to_string(destination.join("a.txt")).unwrap(), "alpha");
    }

    #[test]
    fn test_generate_deletes_a_file_where_a_directory_belongs() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("out");
        fs::create_dir(&destination).unwrap();
        fs::write(destination.join("sub"), "in the way").unwrap();

        generate(&sample_tree(), &destination, false).unwrap();

        assert!(destination.join("sub").is_dir());
        assert_eq!(
            fs::read_to_string(destination.join("sub/b.txt")).unwrap(),
            "beta"
        );
    }

    #[test]
    fn test_generate_deletes_a_directory_where_a_file_belongs() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("out");
        fs::create_dir_all(destination.join("a.txt")).unwrap();
        fs::write(destination.join("a.txt/nested"), "x").unwrap();

        generate(&sample_tree(), &destination, false).unwrap();

        assert!(destination.join("a.txt").is_file());
        assert_eq!(fs::read_to_string(destination.join("a.txt")).unwrap(), "alpha");
    }

    #[test]
    fn test_generate_rewrites_changed_content() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("out");
        fs::create_dir(&destination).unwrap();
        fs::write(destination.join("a.txt"), "outdated").unwrap();

        generate(&sample_tree(), &destination, false).unwrap();

        assert_eq!(fs::read_to_string(destination.join("a.txt")).unwrap(), "alpha");
    }

    #[test]
    fn test_generate_skips_unchanged_files() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("out");

        generate(&sample_tree(), &destination, false).unwrap();

        // A read-only file surfaces any accidental rewrite as an error.
        let target = destination.join("a.txt");
        let mut permissions = fs::metadata(&target).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&target, permissions.clone()).unwrap();

        generate(&sample_tree(), &destination, false).unwrap();

        permissions.set_readonly(false);
        fs::set_permissions(&target, permissions).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "alpha");
    }

    #[test]
    fn test_read_missing_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let err = read(&missing).unwrap_err();
        assert!(matches!(err, SyncError::NoSuchPath(_)));
        assert_eq!(err.to_string(), format!("No file at {}", missing.display()));
    }

    #[test]
    fn test_read_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("f.bin");
        fs::write(&path, [0u8, 159, 146, 150]).unwrap();

        let node = read(&path).unwrap().unwrap();
        assert_eq!(node.as_file().unwrap().content(), &[0u8, 159, 146, 150]);
    }

    #[test]
    fn test_read_scans_a_directory_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::write(root.join("sub/b.txt"), "beta").unwrap();

        let node = read(&root).unwrap().unwrap();
        let directory = node.as_directory().unwrap();
        assert_eq!(directory.len(), 2);
        let leaf = VirtualDirectory::unwrap("sub/b.txt", directory).unwrap();
        assert_eq!(leaf.as_file().unwrap().text(), "beta");
    }

    #[cfg(unix)]
    #[test]
    fn test_read_omits_symbolic_links() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("real.txt"), "real").unwrap();
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.txt")).unwrap();

        assert!(read(&root.join("link.txt")).unwrap().is_none());

        let node = read(&root).unwrap().unwrap();
        let directory = node.as_directory().unwrap();
        assert_eq!(directory.len(), 1);
        assert!(directory.get("real.txt").is_some());
        assert!(directory.get("link.txt").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_read_fails_on_unsupported_entry_kinds() {
        let temp_dir = TempDir::new().unwrap();
        let fifo = temp_dir.path().join("pipe");
        let status = std::process::Command::new("mkfifo")
            .arg(&fifo)
            .status()
            .unwrap();
        assert!(status.success());

        let err = read(&fifo).unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedPath(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_generate_replaces_a_symlink_with_file_content() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("out");
        fs::create_dir(&destination).unwrap();
        fs::write(temp_dir.path().join("elsewhere"), "alpha").unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("elsewhere"),
            destination.join("a.txt"),
        )
        .unwrap();

        generate(&sample_tree(), &destination, false).unwrap();

        // The link itself is removed and replaced by a regular file, even
        // though its target content matched.
        assert!(!destination.join("a.txt").symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(destination.join("a.txt")).unwrap(), "alpha");
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("elsewhere")).unwrap(),
            "alpha"
        );
    }
}
