// Format constants for FIFF containers

// Tag header: kind(i32) type(i32) size(i32) next(i32), all big-endian
pub const TAG_HEADER_SIZE: u64 = 4 + 4 + 4 + 4; // 16 bytes

// Directory entry struct: kind(i32) type(i32) size(i32) pos(i32)
pub const DIR_ENTRY_SIZE: usize = 4 + 4 + 4 + 4; // 16 bytes

// Channel info struct, see meas_info::ChannelInfo
pub const CH_INFO_STRUCT_SIZE: usize = 96;

// Gzip stream magic
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// Values of the `next` header field
pub const FIFFV_NEXT_SEQ: i32 = 0;
pub const FIFFV_NEXT_NONE: i32 = -1;

// File structure tags
pub const FIFF_FILE_ID: i32 = 100;
pub const FIFF_DIR_POINTER: i32 = 101;
pub const FIFF_DIR: i32 = 102;
pub const FIFF_BLOCK_START: i32 = 104;
pub const FIFF_BLOCK_END: i32 = 105;

// Measurement info tags
pub const FIFF_NCHAN: i32 = 200;
pub const FIFF_SFREQ: i32 = 201;
pub const FIFF_CH_INFO: i32 = 203;
pub const FIFF_FIRST_SAMPLE: i32 = 208;

// Raw data tags
pub const FIFF_DATA_BUFFER: i32 = 300;
pub const FIFF_DATA_SKIP: i32 = 301;

// Block kinds
pub const FIFFB_ROOT: i32 = 999;
pub const FIFFB_MEAS: i32 = 100;
pub const FIFFB_MEAS_INFO: i32 = 101;
pub const FIFFB_RAW_DATA: i32 = 102;
pub const FIFFB_CONTINUOUS_DATA: i32 = 112;
pub const FIFFB_SMSH_RAW_DATA: i32 = 119;

// Data types
pub const FIFFT_SHORT: i32 = 2;
pub const FIFFT_INT: i32 = 3;
pub const FIFFT_FLOAT: i32 = 4;
pub const FIFFT_DAU_PACK16: i32 = 16;
pub const FIFFT_CH_INFO_STRUCT: i32 = 30;
pub const FIFFT_ID_STRUCT: i32 = 31;
pub const FIFFT_DIR_ENTRY_STRUCT: i32 = 32;

/// On-disk encodings a raw data buffer may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    DauPack16,
    Short,
    Float,
    Int,
}

impl SampleType {
    pub fn from_i32(val: i32) -> Option<Self> {
        match val {
            FIFFT_DAU_PACK16 => Some(SampleType::DauPack16),
            FIFFT_SHORT => Some(SampleType::Short),
            FIFFT_FLOAT => Some(SampleType::Float),
            FIFFT_INT => Some(SampleType::Int),
            _ => None,
        }
    }

    /// Bytes occupied by one value of one channel.
    pub fn width(self) -> usize {
        match self {
            SampleType::DauPack16 | SampleType::Short => 2,
            SampleType::Float | SampleType::Int => 4,
        }
    }
}

/// Raw data block kinds in lookup order.
pub fn raw_block_kinds(allow_unprocessed: bool) -> &'static [i32] {
    if allow_unprocessed {
        &[FIFFB_RAW_DATA, FIFFB_CONTINUOUS_DATA, FIFFB_SMSH_RAW_DATA]
    } else {
        &[FIFFB_RAW_DATA, FIFFB_CONTINUOUS_DATA]
    }
}
