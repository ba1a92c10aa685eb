// FIFF file access - Thread-safe version

use crate::core::compression::{inflate, is_gzip};
use crate::core::constants::*;
use crate::core::error::{RawError, Result};
use crate::core::source::{BlockLocator, TagSource};
use crate::core::tag::{DirEntry, Tag, TagHeader};
use crate::core::tree::{build_tree, dir_tree_find, TreeNode};
use std::fs::File;
use std::io::{BufReader, Cursor, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};

pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

pub struct FiffFile {
    name: String,
    reader: Mutex<Box<dyn ReadSeek>>,
    directory: Vec<DirEntry>,
    tree: TreeNode,
}

impl FiffFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, true)
    }

    /// Open a file, inflating gzip input into memory when `inflate_gzip` is set.
    pub fn open_with<P: AsRef<Path>>(path: P, inflate_gzip: bool) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let mut file = BufReader::new(File::open(path)?);

        if inflate_gzip && is_gzip(&mut file)? {
            debug!("Inflating gzip stream {}", name);
            let bytes = inflate(file)?;
            return Self::from_reader(name, Cursor::new(bytes));
        }

        Self::from_reader(name, file)
    }

    pub fn from_reader<R: ReadSeek + 'static>(
        name: impl Into<String>,
        mut reader: R,
    ) -> Result<Self> {
        let name = name.into();
        let directory = read_directory(&name, &mut reader)?;
        info!("{}: {} directory entries", name, directory.len());

        let mut file = Self {
            name,
            reader: Mutex::new(Box::new(reader)),
            directory,
            tree: TreeNode::new(FIFFB_ROOT),
        };
        file.tree = build_tree(&file, &file.directory)?;
        Ok(file)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &[DirEntry] {
        &self.directory
    }

    pub fn tree(&self) -> &TreeNode {
        &self.tree
    }
}

impl TagSource for FiffFile {
    fn read_tag(&self, pos: u64) -> Result<Tag> {
        let mut reader = self.reader.lock().map_err(|_| RawError::LockPoisoned)?;
        Tag::read_at(&mut *reader, pos)
    }
}

impl BlockLocator for FiffFile {
    fn find_block(&self, kind: i32) -> Vec<&TreeNode> {
        dir_tree_find(&self.tree, kind)
    }
}

fn read_directory<R: Read + Seek>(name: &str, reader: &mut R) -> Result<Vec<DirEntry>> {
    reader.seek(SeekFrom::Start(0))?;
    let header = TagHeader::read(reader)?;
    if header.kind != FIFF_FILE_ID {
        return Err(RawError::InvalidFile(format!(
            "{} does not start with a file id tag",
            name
        )));
    }

    let dir_pointer_pos = header
        .next_pos(0)
        .ok_or_else(|| RawError::InvalidFile(format!("{} ends after the file id tag", name)))?;
    let pointer = Tag::read_at(reader, dir_pointer_pos)?;
    if pointer.kind != FIFF_DIR_POINTER {
        return Err(RawError::InvalidFile(format!(
            "{} does not have a directory pointer",
            name
        )));
    }

    let dir_pos = pointer.as_i32()?;
    if dir_pos > 0 {
        match read_directory_at(reader, dir_pos as u64) {
            Ok(directory) => return Ok(directory),
            Err(e) => warn!(
                "{}: directory at {} unusable ({}), scanning tags sequentially",
                name, dir_pos, e
            ),
        }
    } else {
        debug!("{}: no directory pointer, scanning tags sequentially", name);
    }

    scan_directory(reader)
}

/// Read the packed entries of a `FIFF_DIR` tag.
fn read_directory_at<R: Read + Seek>(reader: &mut R, pos: u64) -> Result<Vec<DirEntry>> {
    let tag = Tag::read_at(reader, pos)?;
    if tag.kind != FIFF_DIR {
        return Err(RawError::CorruptedData(format!(
            "Expected directory tag at {}, found kind {}",
            pos, tag.kind
        )));
    }

    let nent = tag.data.len() / DIR_ENTRY_SIZE;
    let mut cursor = Cursor::new(&tag.data);
    let mut directory = Vec::with_capacity(nent);
    for _ in 0..nent {
        directory.push(DirEntry::read(&mut cursor)?);
    }
    Ok(directory)
}

/// Rebuild the directory by following the tag chain from the start of the file.
fn scan_directory<R: Read + Seek>(reader: &mut R) -> Result<Vec<DirEntry>> {
    let mut directory = Vec::new();
    let mut pos = 0u64;

    loop {
        reader.seek(SeekFrom::Start(pos))?;
        let header = match TagHeader::read(reader) {
            Ok(h) => h,
            Err(RawError::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        };

        directory.push(DirEntry {
            kind: header.kind,
            type_: header.type_,
            size: header.size,
            pos,
        });

        match header.next_pos(pos) {
            Some(next) if next > pos => pos = next,
            Some(next) => {
                return Err(RawError::CorruptedData(format!(
                    "Tag at {} points backwards to {}",
                    pos, next
                )))
            }
            None => break,
        }
    }

    Ok(directory)
}
