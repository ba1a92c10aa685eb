// FIFF tags and directory entries

use crate::core::constants::*;
use crate::core::error::{RawError, Result};
use byteorder::{BigEndian, ReadBytesExt};
use serde::Serialize;
use std::io::{Cursor, Read, Seek, SeekFrom};

/// One entry of a FIFF directory: where a tag lives and what it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub kind: i32,
    #[serde(rename = "type")]
    pub type_: i32,
    pub size: i32,
    pub pos: u64,
}

impl DirEntry {
    /// Read a packed 16-byte directory entry struct.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let kind = reader.read_i32::<BigEndian>()?;
        let type_ = reader.read_i32::<BigEndian>()?;
        let size = reader.read_i32::<BigEndian>()?;
        let pos = reader.read_i32::<BigEndian>()?;
        if pos < 0 {
            return Err(RawError::CorruptedData(format!(
                "Directory entry for tag kind {} has negative position {}",
                kind, pos
            )));
        }
        Ok(Self {
            kind,
            type_,
            size,
            pos: pos as u64,
        })
    }

    /// Payload size in bytes; negative sizes are reported as corruption.
    pub fn byte_size(&self) -> Result<usize> {
        usize::try_from(self.size).map_err(|_| {
            RawError::CorruptedData(format!(
                "Tag kind {} has negative size {}",
                self.kind, self.size
            ))
        })
    }
}

/// Header fields preceding every tag payload.
#[derive(Debug, Clone, Copy)]
pub struct TagHeader {
    pub kind: i32,
    pub type_: i32,
    pub size: i32,
    pub next: i32,
}

impl TagHeader {
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            kind: reader.read_i32::<BigEndian>()?,
            type_: reader.read_i32::<BigEndian>()?,
            size: reader.read_i32::<BigEndian>()?,
            next: reader.read_i32::<BigEndian>()?,
        })
    }

    /// Position of the tag following the one at `pos`, or `None` at the end of the chain.
    pub fn next_pos(&self, pos: u64) -> Option<u64> {
        match self.next {
            FIFFV_NEXT_SEQ => Some(pos + TAG_HEADER_SIZE + self.size.max(0) as u64),
            n if n > 0 => Some(n as u64),
            _ => None,
        }
    }
}

/// A tag read from disk, payload left undecoded.
#[derive(Debug, Clone)]
pub struct Tag {
    pub kind: i32,
    pub type_: i32,
    pub data: Vec<u8>,
}

impl Tag {
    pub fn read_at<R: Read + Seek>(reader: &mut R, pos: u64) -> Result<Self> {
        reader.seek(SeekFrom::Start(pos))?;
        let header = TagHeader::read(reader)?;
        let size = usize::try_from(header.size).map_err(|_| {
            RawError::CorruptedData(format!(
                "Tag kind {} at {} has negative size {}",
                header.kind, pos, header.size
            ))
        })?;

        let mut data = vec![0u8; size];
        reader.read_exact(&mut data)?;

        Ok(Self {
            kind: header.kind,
            type_: header.type_,
            data,
        })
    }

    pub fn as_i32(&self) -> Result<i32> {
        self.scalar_cursor(4)?
            .read_i32::<BigEndian>()
            .map_err(RawError::from)
    }

    pub fn as_f32(&self) -> Result<f32> {
        self.scalar_cursor(4)?
            .read_f32::<BigEndian>()
            .map_err(RawError::from)
    }

    fn scalar_cursor(&self, width: usize) -> Result<Cursor<&[u8]>> {
        if self.data.len() < width {
            return Err(RawError::CorruptedData(format!(
                "Tag kind {} holds {} bytes, expected at least {}",
                self.kind,
                self.data.len(),
                width
            )));
        }
        Ok(Cursor::new(&self.data[..width]))
    }

    /// Decode a data buffer payload into interleaved `f64` values.
    pub fn decode_samples(&self) -> Result<Vec<f64>> {
        let sample_type =
            SampleType::from_i32(self.type_).ok_or(RawError::UnsupportedDataType(self.type_))?;
        let count = self.data.len() / sample_type.width();
        let mut cursor = Cursor::new(&self.data);
        let mut values = Vec::with_capacity(count);

        match sample_type {
            SampleType::DauPack16 | SampleType::Short => {
                for _ in 0..count {
                    values.push(f64::from(cursor.read_i16::<BigEndian>()?));
                }
            }
            SampleType::Float => {
                for _ in 0..count {
                    values.push(f64::from(cursor.read_f32::<BigEndian>()?));
                }
            }
            SampleType::Int => {
                for _ in 0..count {
                    values.push(f64::from(cursor.read_i32::<BigEndian>()?));
                }
            }
        }

        Ok(values)
    }
}
