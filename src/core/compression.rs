// Gzip-compressed FIFF input

use crate::core::constants::GZIP_MAGIC;
use crate::core::error::{RawError, Result};
use flate2::read::GzDecoder;
use std::io::{Read, Seek, SeekFrom};

/// Check for the gzip magic at the start of the stream, leaving it rewound.
pub fn is_gzip<R: Read + Seek>(reader: &mut R) -> Result<bool> {
    let mut magic = [0u8; 2];
    reader.seek(SeekFrom::Start(0))?;
    let read = reader.read(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(read == magic.len() && magic == GZIP_MAGIC)
}

/// Inflate a whole gzip stream; tag access needs random seeks.
pub fn inflate<R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(reader);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| RawError::CorruptedData(format!("Gzip: {}", e)))?;
    Ok(decompressed)
}
