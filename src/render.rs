//! Tree Rendering
//!
//! Renders a directory as indented text, one entry per line: files as
//! `name`, directories as `name/` with their contents nested one level
//! deeper. Children appear in sorted-name order; that order is part of
//! this module's contract.

use std::fmt;

use crate::directory::VirtualDirectory;
use crate::node::VirtualNode;

const INDENT: &str = "  ";

/// Indentation-tracking text accumulator.
///
/// Two operations: append text (line starts get the current indent prefix)
/// and run a block one level deeper. Opening or closing a nested block
/// terminates an unfinished line.
struct TextWriter {
    out: String,
    level: usize,
    at_line_start: bool,
}

impl TextWriter {
    fn new() -> Self {
        TextWriter {
            out: String::new(),
            level: 0,
            at_line_start: true,
        }
    }

    fn append(&mut self, text: &str) {
        for ch in text.chars() {
            if self.at_line_start && ch != '\n' {
                for _ in 0..self.level {
                    self.out.push_str(INDENT);
                }
            }
            self.out.push(ch);
            self.at_line_start = ch == '\n';
        }
    }

    fn indented(&mut self, block: impl FnOnce(&mut Self)) {
        self.break_line();
        self.level += 1;
        block(self);
        self.break_line();
        self.level -= 1;
    }

    fn break_line(&mut self) {
        if !self.at_line_start {
            self.out.push('\n');
            self.at_line_start = true;
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

impl VirtualDirectory {
    /// Render the tree down to `max_depth` levels of nesting; `-1` means
    /// unlimited. At depth zero a directory's contents are replaced by a
    /// single `...` line.
    pub fn inspect(&self, max_depth: i32) -> String {
        let mut writer = TextWriter::new();
        inspect_into(self, &mut writer, max_depth);
        writer.finish()
    }
}

fn inspect_into(directory: &VirtualDirectory, writer: &mut TextWriter, depth: i32) {
    for (name, child) in directory.entries() {
        match child {
            VirtualNode::File(_) => {
                writer.append(name);
                writer.append("\n");
            }
            VirtualNode::Directory(child_directory) => {
                writer.append(name);
                writer.append("/");
                writer.indented(|writer| {
                    if depth == 0 {
                        writer.append("...");
                    } else {
                        inspect_into(child_directory, writer, depth - 1);
                    }
                });
            }
        }
    }
}

impl fmt::Display for VirtualDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect(-1))
    }
}
