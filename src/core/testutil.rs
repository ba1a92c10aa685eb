// In-memory FIFF fixtures shared by the unit tests

use crate::core::constants::*;
use crate::core::error::{RawError, Result};
use crate::core::source::TagSource;
use crate::core::tag::{DirEntry, Tag};
use byteorder::{BigEndian, WriteBytesExt};
use std::collections::HashMap;

pub fn tag_bytes(kind: i32, type_: i32, data: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(TAG_HEADER_SIZE as usize + data.len());
    bytes.write_i32::<BigEndian>(kind).unwrap();
    bytes.write_i32::<BigEndian>(type_).unwrap();
    bytes.write_i32::<BigEndian>(data.len() as i32).unwrap();
    bytes.write_i32::<BigEndian>(FIFFV_NEXT_SEQ).unwrap();
    bytes.extend_from_slice(data);
    bytes
}

pub fn encode(type_: i32, values: &[f64]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for &v in values {
        match type_ {
            FIFFT_SHORT | FIFFT_DAU_PACK16 => bytes.write_i16::<BigEndian>(v as i16).unwrap(),
            FIFFT_FLOAT => bytes.write_f32::<BigEndian>(v as f32).unwrap(),
            FIFFT_INT => bytes.write_i32::<BigEndian>(v as i32).unwrap(),
            // Unsupported encodings are written as doubles
            _ => bytes.write_f64::<BigEndian>(v).unwrap(),
        }
    }
    bytes
}

/// Tags keyed by position, for exercising code against a bare `TagSource`.
#[derive(Default)]
pub struct MapSource {
    tags: HashMap<u64, Tag>,
}

impl MapSource {
    pub fn insert(&mut self, pos: u64, tag: Tag) {
        self.tags.insert(pos, tag);
    }

    pub fn insert_i32(&mut self, pos: u64, kind: i32, value: i32) {
        let mut data = Vec::new();
        data.write_i32::<BigEndian>(value).unwrap();
        self.insert(
            pos,
            Tag {
                kind,
                type_: FIFFT_INT,
                data,
            },
        );
    }
}

impl TagSource for MapSource {
    fn read_tag(&self, pos: u64) -> Result<Tag> {
        self.tags
            .get(&pos)
            .cloned()
            .ok_or_else(|| RawError::CorruptedData(format!("No tag at {}", pos)))
    }
}

/// Items of a raw data block, in file order.
#[derive(Debug, Clone)]
pub enum RawItem {
    FirstSample(i32),
    Skip(i32),
    /// Encoding and interleaved values (sample-major).
    Buffer(i32, Vec<f64>),
}

/// Writes a FIFF byte stream tag by tag.
pub struct FiffFixture {
    bytes: Vec<u8>,
    entries: Vec<DirEntry>,
    dir_pointer_data: usize,
}

impl FiffFixture {
    pub fn new() -> Self {
        let mut fixture = Self {
            bytes: Vec::new(),
            entries: Vec::new(),
            dir_pointer_data: 0,
        };
        fixture.tag(FIFF_FILE_ID, FIFFT_ID_STRUCT, &[0u8; 20]);
        fixture.dir_pointer_data = fixture.bytes.len() + TAG_HEADER_SIZE as usize;
        fixture.int(FIFF_DIR_POINTER, -1);
        fixture
    }

    pub fn tag(&mut self, kind: i32, type_: i32, data: &[u8]) -> &mut Self {
        self.entries.push(DirEntry {
            kind,
            type_,
            size: data.len() as i32,
            pos: self.bytes.len() as u64,
        });
        self.bytes.extend(tag_bytes(kind, type_, data));
        self
    }

    pub fn int(&mut self, kind: i32, value: i32) -> &mut Self {
        let mut data = Vec::new();
        data.write_i32::<BigEndian>(value).unwrap();
        self.tag(kind, FIFFT_INT, &data)
    }

    pub fn float(&mut self, kind: i32, value: f32) -> &mut Self {
        let mut data = Vec::new();
        data.write_f32::<BigEndian>(value).unwrap();
        self.tag(kind, FIFFT_FLOAT, &data)
    }

    pub fn start_block(&mut self, block: i32) -> &mut Self {
        self.int(FIFF_BLOCK_START, block)
    }

    pub fn end_block(&mut self, block: i32) -> &mut Self {
        self.int(FIFF_BLOCK_END, block)
    }

    pub fn channel(&mut self, index: i32, name: &str, range: f32, cal: f32) -> &mut Self {
        let mut data = Vec::with_capacity(CH_INFO_STRUCT_SIZE);
        data.write_i32::<BigEndian>(index + 1).unwrap(); // scanno
        data.write_i32::<BigEndian>(index + 1).unwrap(); // logno
        data.write_i32::<BigEndian>(2).unwrap(); // kind
        data.write_f32::<BigEndian>(range).unwrap();
        data.write_f32::<BigEndian>(cal).unwrap();
        data.write_i32::<BigEndian>(0).unwrap(); // coil type
        for _ in 0..12 {
            data.write_f32::<BigEndian>(0.0).unwrap();
        }
        data.write_i32::<BigEndian>(107).unwrap(); // unit
        data.write_i32::<BigEndian>(0).unwrap(); // unit multiplier
        let mut name_bytes = [0u8; 16];
        for (dst, src) in name_bytes.iter_mut().zip(name.bytes()) {
            *dst = src;
        }
        data.extend_from_slice(&name_bytes);
        self.tag(FIFF_CH_INFO, FIFFT_CH_INFO_STRUCT, &data)
    }

    pub fn meas_info(&mut self, sfreq: f32, channels: &[(f32, f32)]) -> &mut Self {
        self.start_block(FIFFB_MEAS_INFO);
        self.int(FIFF_NCHAN, channels.len() as i32);
        self.float(FIFF_SFREQ, sfreq);
        for (k, &(range, cal)) in channels.iter().enumerate() {
            self.channel(k as i32, &format!("CH{:03}", k + 1), range, cal);
        }
        self.end_block(FIFFB_MEAS_INFO)
    }

    pub fn raw_items(&mut self, block: i32, items: &[RawItem]) -> &mut Self {
        self.start_block(block);
        for item in items {
            match item {
                RawItem::FirstSample(v) => {
                    self.int(FIFF_FIRST_SAMPLE, *v);
                }
                RawItem::Skip(v) => {
                    self.int(FIFF_DATA_SKIP, *v);
                }
                RawItem::Buffer(type_, values) => {
                    self.tag(FIFF_DATA_BUFFER, *type_, &encode(*type_, values));
                }
            }
        }
        self.end_block(block)
    }

    /// Raw directory entries written so far.
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    /// Bytes without a directory; readers fall back to a sequential scan.
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    /// Bytes with a trailing `FIFF_DIR` tag and a patched directory pointer.
    pub fn finish_with_directory(mut self) -> Vec<u8> {
        let dir_pos = self.bytes.len() as i32;
        let mut data = Vec::with_capacity(self.entries.len() * DIR_ENTRY_SIZE);
        for entry in &self.entries {
            data.write_i32::<BigEndian>(entry.kind).unwrap();
            data.write_i32::<BigEndian>(entry.type_).unwrap();
            data.write_i32::<BigEndian>(entry.size).unwrap();
            data.write_i32::<BigEndian>(entry.pos as i32).unwrap();
        }
        self.bytes
            .extend(tag_bytes(FIFF_DIR, FIFFT_DIR_ENTRY_STRUCT, &data));
        let at = self.dir_pointer_data;
        self.bytes[at..at + 4].copy_from_slice(&dir_pos.to_be_bytes());
        self.bytes
    }
}

/// A complete measurement: info block followed by one raw block.
pub fn raw_fixture(
    block: i32,
    sfreq: f32,
    channels: &[(f32, f32)],
    items: &[RawItem],
) -> FiffFixture {
    let mut fixture = FiffFixture::new();
    fixture
        .start_block(FIFFB_MEAS)
        .meas_info(sfreq, channels)
        .raw_items(block, items)
        .end_block(FIFFB_MEAS);
    fixture
}

/// Interleaved buffer where channel `c` of absolute sample `s` holds `(c + 1) * 1000 + s`.
pub fn ramp_buffer(type_: i32, nchan: usize, first: i64, nsamp: usize) -> RawItem {
    let mut values = Vec::with_capacity(nchan * nsamp);
    for s in 0..nsamp {
        for c in 0..nchan {
            values.push(((c as i64 + 1) * 1000 + first + s as i64) as f64);
        }
    }
    RawItem::Buffer(type_, values)
}
