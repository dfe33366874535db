//! Virtual Directory Trees
//!
//! An immutable mapping from name to child node, built through a `Builder`,
//! plus the structural algorithms that compose and decompose trees:
//! `wrap`, `unwrap` and `merged`.
//!
//! Children are held in a `BTreeMap`, so every traversal in this crate
//! (listing, rendering, generation) sees them in sorted-name order.

use std::collections::BTreeMap;

use crate::error::TreeError;
use crate::node::{VirtualFile, VirtualNode};

/// Immutable directory of named children.
///
/// Once built, no operation changes its children; every transformation
/// produces a new value. Sharing a child across several parent trees is
/// safe for the same reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualDirectory {
    children: BTreeMap<String, VirtualNode>,
}

impl VirtualDirectory {
    /// Start building a directory.
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn from_children(children: BTreeMap<String, VirtualNode>) -> Self {
        VirtualDirectory { children }
    }

    /// A defensive copy of the name → child mapping.
    ///
    /// Mutating the returned map never affects this directory.
    pub fn list(&self) -> BTreeMap<String, VirtualNode> {
        self.children.clone()
    }

    /// Borrowing iterator over children in sorted-name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &VirtualNode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Look up a direct child by name.
    pub fn get(&self, name: &str) -> Option<&VirtualNode> {
        self.children.get(name)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Nest `node` under every segment of a slash-delimited path.
    ///
    /// `wrap("a/b/c", node)` produces a chain of single-child directories
    /// `a/ → b/` with `node` as the child named `c`. Segments are used
    /// verbatim as names; no normalization of empty segments, `.`/`..` or
    /// leading/trailing slashes is performed.
    pub fn wrap(path: &str, node: impl Into<VirtualNode>) -> VirtualDirectory {
        Self::wrap_node(path, node.into())
    }

    fn wrap_node(path: &str, node: VirtualNode) -> VirtualDirectory {
        let mut children = BTreeMap::new();
        match path.split_once('/') {
            Some((root_name, remaining)) => {
                children.insert(
                    root_name.to_string(),
                    VirtualNode::Directory(Self::wrap_node(remaining, node)),
                );
            }
            None => {
                children.insert(path.to_string(), node);
            }
        }
        VirtualDirectory { children }
    }

    /// Resolve a slash-delimited path to the node it names.
    ///
    /// Intermediate segments must name existing directories; the final
    /// segment may name either kind.
    pub fn unwrap(path: &str, root: &VirtualDirectory) -> Result<VirtualNode, TreeError> {
        match path.split_once('/') {
            Some((root_name, remaining)) => match root.children.get(root_name) {
                Some(VirtualNode::Directory(child)) => Self::unwrap(remaining, child),
                Some(VirtualNode::File(_)) => {
                    Err(TreeError::ExpectedDirectory(root_name.to_string()))
                }
                None => Err(TreeError::NoSuchDirectory(root_name.to_string())),
            },
            None => root
                .children
                .get(path)
                .cloned()
                .ok_or_else(|| TreeError::NoSuchEntry(path.to_string())),
        }
    }

    /// Combine directories left to right into one.
    ///
    /// Later leaves replace earlier leaves under the same name; two
    /// directories under the same name merge recursively with the same
    /// precedence. A name that resolves to a file in one input and a
    /// directory in another is a fatal conflict.
    pub fn merged<'a, I>(directories: I) -> Result<VirtualDirectory, TreeError>
    where
        I: IntoIterator<Item = &'a VirtualDirectory>,
    {
        let mut merged: BTreeMap<String, VirtualNode> = BTreeMap::new();
        for directory in directories {
            for (name, child) in &directory.children {
                match child {
                    VirtualNode::File(_) => {
                        if let Some(VirtualNode::Directory(_)) = merged.get(name) {
                            return Err(TreeError::MergeFileIntoDirectory);
                        }
                        merged.insert(name.clone(), child.clone());
                    }
                    VirtualNode::Directory(incoming) => match merged.get(name) {
                        Some(VirtualNode::File(_)) => {
                            return Err(TreeError::MergeDirectoryIntoFile);
                        }
                        Some(VirtualNode::Directory(accumulated)) => {
                            let combined = accumulated.merged_with(incoming)?;
                            merged.insert(name.clone(), VirtualNode::Directory(combined));
                        }
                        None => {
                            merged.insert(name.clone(), child.clone());
                        }
                    },
                }
            }
        }
        Ok(VirtualDirectory { children: merged })
    }

    /// Merge `other` into this directory; `other`'s leaves win on conflict.
    pub fn merged_with(&self, other: &VirtualDirectory) -> Result<VirtualDirectory, TreeError> {
        Self::merged([self, other])
    }
}

/// Mutable accumulator producing immutable [`VirtualDirectory`] snapshots.
///
/// `build` may be called at any point; a built directory is a frozen copy
/// and later additions to the builder do not affect it.
#[derive(Debug, Default)]
pub struct Builder {
    children: BTreeMap<String, VirtualNode>,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            children: BTreeMap::new(),
        }
    }

    /// Add a file under `name`.
    pub fn add_file(self, name: &str, content: impl Into<VirtualFile>) -> Result<Self, TreeError> {
        self.add_child(name, VirtualNode::File(content.into()))
    }

    /// Add a directory under `name`. Accepts a directory or a builder.
    pub fn add_directory(
        self,
        name: &str,
        directory: impl Into<VirtualDirectory>,
    ) -> Result<Self, TreeError> {
        self.add_child(name, VirtualNode::Directory(directory.into()))
    }

    /// Add an already-constructed node under `name`.
    ///
    /// Fails if `name` is taken, whatever the kinds involved.
    pub fn add_child(mut self, name: &str, child: impl Into<VirtualNode>) -> Result<Self, TreeError> {
        if self.children.contains_key(name) {
            return Err(TreeError::ConflictingNames(name.to_string()));
        }
        self.children.insert(name.to_string(), child.into());
        Ok(self)
    }

    /// Snapshot the accumulated children into an immutable directory.
    pub fn build(&self) -> VirtualDirectory {
        VirtualDirectory {
            children: self.children.clone(),
        }
    }
}

impl From<Builder> for VirtualDirectory {
    fn from(builder: Builder) -> Self {
        builder.build()
    }
}
