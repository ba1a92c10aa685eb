pub mod compression;
pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod file;
pub mod meas_info;
pub mod raw;
pub mod segment;
pub mod source;
pub mod tag;
pub mod tree;

#[cfg(test)]
pub(crate) mod testutil;
