// Buffer index over a raw data block

use crate::core::constants::*;
use crate::core::error::{RawError, Result};
use crate::core::source::{BlockLocator, TagSource};
use crate::core::tag::DirEntry;
use crate::core::tree::TreeNode;
use serde::Serialize;
use tracing::debug;

/// One contiguous run of samples: a stored buffer, or a skip that reads as zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BufferDescriptor {
    /// `None` for skips, which have no bytes on disk.
    pub ent: Option<DirEntry>,
    pub first: i64,
    /// Inclusive.
    pub last: i64,
    pub nsamp: usize,
}

impl BufferDescriptor {
    fn data(ent: DirEntry, first: i64, nsamp: usize) -> Result<Self> {
        Ok(Self {
            ent: Some(ent),
            first,
            last: advance(first, nsamp)? - 1,
            nsamp,
        })
    }

    fn skip(first: i64, nsamp: usize) -> Result<Self> {
        Ok(Self {
            ent: None,
            first,
            last: advance(first, nsamp)? - 1,
            nsamp,
        })
    }

    pub fn is_skip(&self) -> bool {
        self.ent.is_none()
    }
}

/// A skip as stored in the file, counted in lengths of the buffer that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSkip {
    pub count: usize,
}

/// A skip measured in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSkip {
    pub samples: usize,
}

impl PendingSkip {
    /// Zero and negative counts skip nothing.
    pub fn from_count(count: i32) -> Option<Self> {
        usize::try_from(count)
            .ok()
            .filter(|&count| count > 0)
            .map(|count| Self { count })
    }

    pub fn resolve(self, nsamp: usize) -> Result<ResolvedSkip> {
        let samples = self
            .count
            .checked_mul(nsamp)
            .ok_or_else(|| sample_overflow(self.count, nsamp))?;
        Ok(ResolvedSkip { samples })
    }
}

/// Sample position `nsamp` samples past `pos`.
fn advance(pos: i64, nsamp: usize) -> Result<i64> {
    i64::try_from(nsamp)
        .ok()
        .and_then(|n| pos.checked_add(n))
        .ok_or_else(|| sample_overflow(pos, nsamp))
}

fn sample_overflow(a: impl std::fmt::Display, b: usize) -> RawError {
    RawError::CorruptedData(format!("Sample count overflow at {} + {}", a, b))
}

/// Buffer index of one raw data block.
#[derive(Debug, Clone, Serialize)]
pub struct RawDirectory {
    pub first_samp: i64,
    pub last_samp: i64,
    pub buffers: Vec<BufferDescriptor>,
}

impl RawDirectory {
    pub fn nsamp(&self) -> usize {
        (self.last_samp - self.first_samp + 1) as usize
    }

    pub fn skip_count(&self) -> usize {
        self.buffers.iter().filter(|b| b.is_skip()).count()
    }
}

/// Pick the raw data block, preferring processed raw data over continuous data.
///
/// Unprocessed MaxShield data is only considered when `allow_unprocessed` is set.
pub fn locate_raw_block<'a, L: BlockLocator + ?Sized>(
    locator: &'a L,
    name: &str,
    allow_unprocessed: bool,
) -> Result<&'a TreeNode> {
    for &kind in raw_block_kinds(allow_unprocessed) {
        let found = locator.find_block(kind);
        match found.as_slice() {
            [] => continue,
            [node] => {
                debug!("{}: using raw data block of kind {}", name, kind);
                return Ok(*node);
            }
            nodes => {
                return Err(RawError::AmbiguousRawData {
                    kind,
                    found: nodes.len(),
                })
            }
        }
    }
    Err(RawError::NoRawData(name.to_string()))
}

/// Samples held by a data buffer entry.
pub fn buffer_samples(entry: &DirEntry, nchan: usize) -> Result<usize> {
    let sample_type =
        SampleType::from_i32(entry.type_).ok_or(RawError::UnsupportedDataType(entry.type_))?;
    let width = sample_type.width();
    let size = entry.byte_size()?;
    let bytes_per_sample = width * nchan;

    if bytes_per_sample == 0 || size == 0 || size % bytes_per_sample != 0 {
        return Err(RawError::InvalidBufferSize {
            size: entry.size,
            nchan,
            width,
        });
    }
    Ok(size / bytes_per_sample)
}

/// Index the entries of a raw data block.
///
/// A leading `FIFF_FIRST_SAMPLE` sets the first sample, and a `FIFF_DATA_SKIP`
/// directly after it shifts the start of the recording by that many lengths of
/// the first buffer. Later skips become zero-filled descriptors sized by the
/// buffer that follows them.
pub fn build_directory<S: TagSource + ?Sized>(
    source: &S,
    entries: &[DirEntry],
    nchan: usize,
) -> Result<RawDirectory> {
    let mut rest = entries;
    let mut first_samp = 0i64;

    if let Some((entry, tail)) = rest.split_first() {
        if entry.kind == FIFF_FIRST_SAMPLE {
            first_samp = i64::from(source.read_tag(entry.pos)?.as_i32()?);
            rest = tail;
        }
    }

    let mut initial_skip = None;
    if let Some((entry, tail)) = rest.split_first() {
        if entry.kind == FIFF_DATA_SKIP {
            initial_skip = PendingSkip::from_count(source.read_tag(entry.pos)?.as_i32()?);
            rest = tail;
        }
    }

    rest.iter()
        .try_fold(
            DirectoryFold::new(first_samp, initial_skip),
            |state, entry| state.step(source, entry, nchan),
        )?
        .finish()
}

struct DirectoryFold {
    first_samp: i64,
    cursor: i64,
    initial_skip: Option<PendingSkip>,
    pending_skip: Option<PendingSkip>,
    buffers: Vec<BufferDescriptor>,
}

impl DirectoryFold {
    fn new(first_samp: i64, initial_skip: Option<PendingSkip>) -> Self {
        Self {
            first_samp,
            cursor: first_samp,
            initial_skip,
            pending_skip: None,
            buffers: Vec::new(),
        }
    }

    fn step<S: TagSource + ?Sized>(
        mut self,
        source: &S,
        entry: &DirEntry,
        nchan: usize,
    ) -> Result<Self> {
        match entry.kind {
            FIFF_DATA_SKIP => {
                self.pending_skip = PendingSkip::from_count(source.read_tag(entry.pos)?.as_i32()?);
            }
            FIFF_DATA_BUFFER => {
                let nsamp = buffer_samples(entry, nchan)?;

                if let Some(skip) = self.initial_skip.take() {
                    let shift = skip.resolve(nsamp)?.samples;
                    debug!("Initial skip of {} buffers = {} samples", skip.count, shift);
                    self.first_samp = advance(self.first_samp, shift)?;
                    self.cursor = self.first_samp;
                }

                if let Some(skip) = self.pending_skip.take() {
                    let resolved = skip.resolve(nsamp)?;
                    debug!(
                        "Skip of {} buffers = {} samples at {}",
                        skip.count, resolved.samples, self.cursor
                    );
                    let desc = BufferDescriptor::skip(self.cursor, resolved.samples)?;
                    self.cursor = desc.last + 1;
                    self.buffers.push(desc);
                }

                let desc = BufferDescriptor::data(*entry, self.cursor, nsamp)?;
                self.cursor = desc.last + 1;
                self.buffers.push(desc);
            }
            _ => {}
        }
        Ok(self)
    }

    fn finish(self) -> Result<RawDirectory> {
        if self.buffers.is_empty() {
            return Err(RawError::CorruptedData(
                "Raw data block holds no data buffers".to_string(),
            ));
        }
        // Keeps last_samp - first_samp + 1 representable
        if self.cursor.checked_sub(self.first_samp).is_none() {
            return Err(RawError::CorruptedData(format!(
                "Raw data spans {} ... {}, too many samples to index",
                self.first_samp, self.cursor
            )));
        }
        Ok(RawDirectory {
            first_samp: self.first_samp,
            last_samp: self.cursor - 1,
            buffers: self.buffers,
        })
    }
}
