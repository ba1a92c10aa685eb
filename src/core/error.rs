// Error handling for the FIFF raw reader

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RawError>;

#[derive(Error, Debug)]
pub enum RawError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a FIFF file: {0}")]
    InvalidFile(String),

    #[error("No raw data in {0}")]
    NoRawData(String),

    #[error("Expected exactly one raw data block of kind {kind}, found {found}")]
    AmbiguousRawData { kind: i32, found: usize },

    #[error("Cannot handle data buffers of type {0}")]
    UnsupportedDataType(i32),

    #[error("Data buffer of {size} bytes does not hold whole samples of {nchan} x {width} bytes")]
    InvalidBufferSize { size: i32, nchan: usize, width: usize },

    #[error("Tag kind {0} not found")]
    MissingTag(i32),

    #[error("Block kind {0} not found")]
    MissingBlock(i32),

    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    #[error("No data in range {from} ... {to} (available {first_samp} ... {last_samp})")]
    EmptyRange {
        from: i64,
        to: i64,
        first_samp: i64,
        last_samp: i64,
    },

    #[error("Channel index {index} out of range for {nchan} channels")]
    InvalidSelection { index: usize, nchan: usize },

    #[error("Channel not found: {0}")]
    UnknownChannel(String),

    #[error("Matrix dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("File lock poisoned")]
    LockPoisoned,
}

impl RawError {
    /// Errors raised while opening a file whose layout this reader cannot use.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            RawError::InvalidFile(_)
                | RawError::NoRawData(_)
                | RawError::AmbiguousRawData { .. }
                | RawError::UnsupportedDataType(_)
                | RawError::InvalidBufferSize { .. }
                | RawError::MissingTag(_)
                | RawError::MissingBlock(_)
                | RawError::CorruptedData(_)
        )
    }

    /// The requested window has no overlap with the recording.
    pub fn is_range_error(&self) -> bool {
        matches!(self, RawError::EmptyRange { .. })
    }
}
