// Block tree built from a flat FIFF directory

use crate::core::constants::*;
use crate::core::error::{RawError, Result};
use crate::core::source::{BlockLocator, TagSource};
use crate::core::tag::DirEntry;

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub block: i32,
    /// Entries belonging directly to this block, block markers excluded.
    pub directory: Vec<DirEntry>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub(crate) fn new(block: i32) -> Self {
        Self {
            block,
            directory: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn nent(&self) -> usize {
        self.directory.len()
    }
}

impl BlockLocator for TreeNode {
    fn find_block(&self, kind: i32) -> Vec<&TreeNode> {
        dir_tree_find(self, kind)
    }
}

/// Nest directory entries into blocks using the start/end markers.
pub fn build_tree<S: TagSource + ?Sized>(source: &S, directory: &[DirEntry]) -> Result<TreeNode> {
    let mut stack = vec![TreeNode::new(FIFFB_ROOT)];

    for entry in directory {
        match entry.kind {
            FIFF_BLOCK_START => {
                let block = source.read_tag(entry.pos)?.as_i32()?;
                stack.push(TreeNode::new(block));
            }
            FIFF_BLOCK_END => {
                if stack.len() < 2 {
                    return Err(RawError::CorruptedData(format!(
                        "Unmatched block end at {}",
                        entry.pos
                    )));
                }
                if let Some(node) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(node);
                    }
                }
            }
            _ => {
                if let Some(node) = stack.last_mut() {
                    node.directory.push(*entry);
                }
            }
        }
    }

    // Close blocks left open by a truncated file
    while stack.len() > 1 {
        if let Some(node) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            }
        }
    }

    stack
        .pop()
        .ok_or_else(|| RawError::CorruptedData("Empty block stack".to_string()))
}

/// All nodes of the given block kind, depth first.
pub fn dir_tree_find(tree: &TreeNode, kind: i32) -> Vec<&TreeNode> {
    let mut found = Vec::new();
    collect(tree, kind, &mut found);
    found
}

fn collect<'a>(node: &'a TreeNode, kind: i32, found: &mut Vec<&'a TreeNode>) {
    if node.block == kind {
        found.push(node);
    }
    for child in &node.children {
        collect(child, kind, found);
    }
}
