// Reader configuration

use crate::core::error::{RawError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Accept unprocessed MaxShield data when no processed raw block exists.
    pub allow_unprocessed: bool,
    /// Inflate gzip-compressed files into memory on open.
    pub inflate_gzip: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            allow_unprocessed: false,
            inflate_gzip: true,
        }
    }
}

impl ReaderConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| RawError::Config(format!("File read Error: {e} {}", path.display())))?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|e| RawError::Config(format!("JSON Parse Error: {e}")))
    }
}
