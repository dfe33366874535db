//! Nested-Mapping Interop
//!
//! Converts a directory tree to and from the plain nested
//! `name → (text | mapping)` shape used by configuration-style data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::directory::VirtualDirectory;
use crate::node::{VirtualFile, VirtualNode};

/// One entry of the nested-mapping shape: file text or a nested mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Text(String),
    Mapping(BTreeMap<String, Entry>),
}

impl VirtualDirectory {
    /// Build a tree from a nested mapping.
    ///
    /// Map keys are unique by construction, so this cannot conflict.
    pub fn from_mapping(mapping: &BTreeMap<String, Entry>) -> VirtualDirectory {
        let children = mapping
            .iter()
            .map(|(name, entry)| (name.clone(), node_from_entry(entry)))
            .collect();
        VirtualDirectory::from_children(children)
    }

    /// Render the tree back to a nested mapping: every file becomes its
    /// UTF-8 text, every directory a nested mapping.
    pub fn to_mapping(&self) -> BTreeMap<String, Entry> {
        self.entries()
            .map(|(name, node)| (name.to_string(), entry_from_node(node)))
            .collect()
    }
}

fn node_from_entry(entry: &Entry) -> VirtualNode {
    match entry {
        Entry::Text(text) => VirtualNode::File(VirtualFile::from_text(text)),
        Entry::Mapping(mapping) => {
            VirtualNode::Directory(VirtualDirectory::from_mapping(mapping))
        }
    }
}

fn entry_from_node(node: &VirtualNode) -> Entry {
    match node {
        VirtualNode::File(file) => Entry::Text(file.text().into_owned()),
        VirtualNode::Directory(directory) => Entry::Mapping(directory.to_mapping()),
    }
}
