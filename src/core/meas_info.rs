// Channel metadata needed by the raw reader

use crate::core::constants::*;
use crate::core::error::{RawError, Result};
use crate::core::source::{BlockLocator, TagSource};
use crate::core::tag::{DirEntry, Tag};
use byteorder::{BigEndian, ReadBytesExt};
use serde::Serialize;
use std::io::{Cursor, Read};

/// Channel information parsed from a FIFF_CH_INFO struct.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelInfo {
    pub scanno: i32,
    pub logno: i32,
    pub kind: i32,
    pub range: f32,
    pub cal: f32,
    pub coil_type: i32,
    pub loc: [f32; 12],
    pub unit: i32,
    pub unit_mul: i32,
    pub ch_name: String,
}

impl ChannelInfo {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < CH_INFO_STRUCT_SIZE {
            return Err(RawError::CorruptedData(format!(
                "Channel info data too short: {} bytes (expected {})",
                data.len(),
                CH_INFO_STRUCT_SIZE
            )));
        }

        let mut cursor = Cursor::new(data);
        let scanno = cursor.read_i32::<BigEndian>()?;
        let logno = cursor.read_i32::<BigEndian>()?;
        let kind = cursor.read_i32::<BigEndian>()?;
        let range = cursor.read_f32::<BigEndian>()?;
        let cal = cursor.read_f32::<BigEndian>()?;
        let coil_type = cursor.read_i32::<BigEndian>()?;

        let mut loc = [0.0f32; 12];
        for v in loc.iter_mut() {
            *v = cursor.read_f32::<BigEndian>()?;
        }

        let unit = cursor.read_i32::<BigEndian>()?;
        let unit_mul = cursor.read_i32::<BigEndian>()?;

        let mut name_bytes = [0u8; 16];
        cursor.read_exact(&mut name_bytes)?;
        let ch_name = String::from_utf8_lossy(&name_bytes)
            .trim_end_matches('\0')
            .to_string();

        Ok(Self {
            scanno,
            logno,
            kind,
            range,
            cal,
            coil_type,
            loc,
            unit,
            unit_mul,
            ch_name,
        })
    }

    /// Factor taking stored units to physical units (range * cal).
    pub fn calibration(&self) -> f64 {
        f64::from(self.range) * f64::from(self.cal)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeasInfo {
    pub nchan: usize,
    pub sfreq: f64,
    pub channels: Vec<ChannelInfo>,
}

impl MeasInfo {
    /// Read channel count, sampling rate and channel structs from the measurement info block.
    pub fn read<F: TagSource + BlockLocator + ?Sized>(file: &F) -> Result<Self> {
        let blocks = file.find_block(FIFFB_MEAS_INFO);
        let node = blocks
            .first()
            .ok_or(RawError::MissingBlock(FIFFB_MEAS_INFO))?;

        let nchan = find_tag(file, &node.directory, FIFF_NCHAN)?.as_i32()?;
        let nchan = usize::try_from(nchan)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| RawError::CorruptedData(format!("Invalid channel count {}", nchan)))?;
        let sfreq = f64::from(find_tag(file, &node.directory, FIFF_SFREQ)?.as_f32()?);
        if sfreq.is_nan() || sfreq <= 0.0 {
            return Err(RawError::CorruptedData(format!(
                "Invalid sampling frequency {}",
                sfreq
            )));
        }

        let mut channels = Vec::with_capacity(nchan);
        for entry in node.directory.iter().filter(|e| e.kind == FIFF_CH_INFO) {
            let tag = file.read_tag(entry.pos)?;
            if tag.type_ != FIFFT_CH_INFO_STRUCT {
                return Err(RawError::CorruptedData(format!(
                    "FIFF_CH_INFO tag has unexpected type {} (expected {})",
                    tag.type_, FIFFT_CH_INFO_STRUCT
                )));
            }
            channels.push(ChannelInfo::from_bytes(&tag.data)?);
        }

        if channels.len() != nchan {
            return Err(RawError::CorruptedData(format!(
                "Expected {} channels but found {} FIFF_CH_INFO tags",
                nchan,
                channels.len()
            )));
        }

        Ok(Self {
            nchan,
            sfreq,
            channels,
        })
    }

    pub fn ch_names(&self) -> Vec<&str> {
        self.channels.iter().map(|ch| ch.ch_name.as_str()).collect()
    }

    /// Channel indices for the given names, in the order requested.
    pub fn pick_channels<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.channels
                    .iter()
                    .position(|ch| ch.ch_name == name)
                    .ok_or_else(|| RawError::UnknownChannel(name.to_string()))
            })
            .collect()
    }
}

fn find_tag<S: TagSource + ?Sized>(source: &S, directory: &[DirEntry], kind: i32) -> Result<Tag> {
    let entry = directory
        .iter()
        .find(|e| e.kind == kind)
        .ok_or(RawError::MissingTag(kind))?;
    source.read_tag(entry.pos)
}
