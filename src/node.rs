//! Leaf and Node Types
//!
//! `VirtualFile` is an immutable holder of file content; `VirtualNode` is
//! the file-or-directory union matched exhaustively throughout the crate.

use std::borrow::Cow;

use crate::directory::VirtualDirectory;

/// Immutable file content.
///
/// Equality is by content; a file has no identity beyond its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    content: Vec<u8>,
}

impl VirtualFile {
    /// Create a file from raw bytes.
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        VirtualFile {
            content: content.into(),
        }
    }

    /// Create a file from text, UTF-8 encoded.
    pub fn from_text(text: &str) -> Self {
        VirtualFile {
            content: text.as_bytes().to_vec(),
        }
    }

    /// The raw bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// UTF-8 view of the content. Invalid sequences are replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

impl From<&str> for VirtualFile {
    fn from(text: &str) -> Self {
        VirtualFile::from_text(text)
    }
}

impl From<String> for VirtualFile {
    fn from(text: String) -> Self {
        VirtualFile {
            content: text.into_bytes(),
        }
    }
}

impl From<Vec<u8>> for VirtualFile {
    fn from(content: Vec<u8>) -> Self {
        VirtualFile { content }
    }
}

impl From<&[u8]> for VirtualFile {
    fn from(content: &[u8]) -> Self {
        VirtualFile {
            content: content.to_vec(),
        }
    }
}

/// A tree entry: file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualNode {
    File(VirtualFile),
    Directory(VirtualDirectory),
}

impl VirtualNode {
    pub fn is_file(&self) -> bool {
        matches!(self, VirtualNode::File(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, VirtualNode::Directory(_))
    }

    /// The file inside, if this is one.
    pub fn as_file(&self) -> Option<&VirtualFile> {
        match self {
            VirtualNode::File(file) => Some(file),
            VirtualNode::Directory(_) => None,
        }
    }

    /// The directory inside, if this is one.
    pub fn as_directory(&self) -> Option<&VirtualDirectory> {
        match self {
            VirtualNode::File(_) => None,
            VirtualNode::Directory(directory) => Some(directory),
        }
    }
}

impl From<VirtualFile> for VirtualNode {
    fn from(file: VirtualFile) -> Self {
        VirtualNode::File(file)
    }
}

impl From<VirtualDirectory> for VirtualNode {
    fn from(directory: VirtualDirectory) -> Self {
        VirtualNode::Directory(directory)
    }
}
