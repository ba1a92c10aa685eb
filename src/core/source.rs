// Capabilities the raw reader needs from a FIFF container

use crate::core::error::Result;
use crate::core::tag::Tag;
use crate::core::tree::TreeNode;

/// Positioned tag reads.
///
/// Implementations serialize access to the underlying reader themselves, so
/// `read_tag` takes `&self` and a source can sit behind a shared `RawHandle`.
pub trait TagSource {
    fn read_tag(&self, pos: u64) -> Result<Tag>;
}

/// Lookup of blocks by kind in a parsed directory tree.
pub trait BlockLocator {
    fn find_block(&self, kind: i32) -> Vec<&TreeNode>;
}
