// FIFF raw data reader
// Main library entry point

pub mod core;

// Re-export main types
pub use core::config::ReaderConfig;
pub use core::directory::{BufferDescriptor, PendingSkip, RawDirectory, ResolvedSkip};
pub use core::error::{RawError, Result};
pub use core::file::FiffFile;
pub use core::meas_info::{ChannelInfo, MeasInfo};
pub use core::raw::{setup_read_raw, setup_read_raw_with_config, RawHandle, RawSummary};
pub use core::segment::{read_raw_segment, read_raw_segment_times, Segment};
pub use core::source::{BlockLocator, TagSource};
pub use core::tag::{DirEntry, Tag};
pub use core::tree::TreeNode;

pub use ndarray;
