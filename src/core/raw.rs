// Raw data handle: buffer index, calibrations and optional transforms

use crate::core::config::ReaderConfig;
use crate::core::directory::{build_directory, locate_raw_block, BufferDescriptor, RawDirectory};
use crate::core::error::{RawError, Result};
use crate::core::file::FiffFile;
use crate::core::meas_info::MeasInfo;
use crate::core::segment::{read_raw_segment, Segment};
use crate::core::source::{BlockLocator, TagSource};
use ndarray::Array2;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// An open raw recording.
///
/// The buffer index and calibrations are fixed when the handle is built; only
/// the projection and compensation operators may be attached afterwards.
pub struct RawHandle<S = FiffFile> {
    source: S,
    name: String,
    info: MeasInfo,
    cals: Vec<f64>,
    directory: RawDirectory,
    projection: Option<Array2<f64>>,
    compensation: Option<Array2<f64>>,
}

/// Overview of a raw handle, for logging and tooling.
#[derive(Debug, Clone, Serialize)]
pub struct RawSummary {
    pub name: String,
    pub nchan: usize,
    pub sfreq: f64,
    pub first_samp: i64,
    pub last_samp: i64,
    pub first_time: f64,
    pub last_time: f64,
    pub buffers: usize,
    pub skips: usize,
    pub has_projection: bool,
    pub has_compensation: bool,
}

/// Open a raw data file and index its buffers.
pub fn setup_read_raw<P: AsRef<Path>>(path: P, allow_unprocessed: bool) -> Result<RawHandle> {
    setup_read_raw_with_config(
        path,
        &ReaderConfig {
            allow_unprocessed,
            ..ReaderConfig::default()
        },
    )
}

pub fn setup_read_raw_with_config<P: AsRef<Path>>(
    path: P,
    config: &ReaderConfig,
) -> Result<RawHandle> {
    let path = path.as_ref();
    info!("Opening raw data file {}...", path.display());

    let file = FiffFile::open_with(path, config.inflate_gzip)?;
    let name = file.name().to_string();
    RawHandle::from_source(name, file, config.allow_unprocessed)
}

impl<S: TagSource + BlockLocator> RawHandle<S> {
    /// Read the channel metadata from `source` itself, then build.
    pub fn from_source(
        name: impl Into<String>,
        source: S,
        allow_unprocessed: bool,
    ) -> Result<Self> {
        let info = MeasInfo::read(&source)?;
        Self::build(name, source, info, allow_unprocessed)
    }

    /// Index the raw data block of `source` using externally supplied channel metadata.
    pub fn build(
        name: impl Into<String>,
        source: S,
        info: MeasInfo,
        allow_unprocessed: bool,
    ) -> Result<Self> {
        let name = name.into();
        if info.channels.len() != info.nchan {
            return Err(RawError::CorruptedData(format!(
                "Channel metadata lists {} channels for nchan = {}",
                info.channels.len(),
                info.nchan
            )));
        }
        if info.sfreq.is_nan() || info.sfreq <= 0.0 {
            return Err(RawError::CorruptedData(format!(
                "Invalid sampling frequency {}",
                info.sfreq
            )));
        }

        let directory = {
            let node = locate_raw_block(&source, &name, allow_unprocessed)?;
            build_directory(&source, &node.directory, info.nchan)?
        };
        let cals = info.channels.iter().map(|ch| ch.calibration()).collect();

        info!(
            "Range : {} ... {} =  {:9.3} ... {:9.3} secs",
            directory.first_samp,
            directory.last_samp,
            directory.first_samp as f64 / info.sfreq,
            directory.last_samp as f64 / info.sfreq
        );
        info!("Ready.");

        Ok(Self {
            source,
            name,
            info,
            cals,
            directory,
            projection: None,
            compensation: None,
        })
    }
}

impl<S: TagSource> RawHandle<S> {
    /// Read samples `from..=to` (defaulting to the whole recording) of the selected channels.
    pub fn read_segment(
        &self,
        from: Option<i64>,
        to: Option<i64>,
        sel: Option<&[usize]>,
    ) -> Result<Segment> {
        read_raw_segment(self, from, to, sel)
    }
}

impl<S> RawHandle<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn info(&self) -> &MeasInfo {
        &self.info
    }

    pub fn nchan(&self) -> usize {
        self.info.nchan
    }

    pub fn sfreq(&self) -> f64 {
        self.info.sfreq
    }

    pub fn cals(&self) -> &[f64] {
        &self.cals
    }

    pub fn first_samp(&self) -> i64 {
        self.directory.first_samp
    }

    pub fn last_samp(&self) -> i64 {
        self.directory.last_samp
    }

    pub fn directory(&self) -> &[BufferDescriptor] {
        &self.directory.buffers
    }

    pub fn projection(&self) -> Option<&Array2<f64>> {
        self.projection.as_ref()
    }

    pub fn compensation(&self) -> Option<&Array2<f64>> {
        self.compensation.as_ref()
    }

    /// Attach or clear the projection operator (nchan x nchan).
    pub fn set_projection(&mut self, projection: Option<Array2<f64>>) -> Result<()> {
        self.check_square(projection.as_ref())?;
        self.projection = projection;
        Ok(())
    }

    /// Attach or clear the compensation operator (nchan x nchan).
    pub fn set_compensation(&mut self, compensation: Option<Array2<f64>>) -> Result<()> {
        self.check_square(compensation.as_ref())?;
        self.compensation = compensation;
        Ok(())
    }

    fn check_square(&self, m: Option<&Array2<f64>>) -> Result<()> {
        let expected = (self.nchan(), self.nchan());
        match m {
            Some(m) if m.dim() != expected => Err(RawError::DimensionMismatch {
                expected,
                got: m.dim(),
            }),
            _ => Ok(()),
        }
    }

    pub fn summary(&self) -> RawSummary {
        RawSummary {
            name: self.name.clone(),
            nchan: self.nchan(),
            sfreq: self.sfreq(),
            first_samp: self.first_samp(),
            last_samp: self.last_samp(),
            first_time: self.first_samp() as f64 / self.sfreq(),
            last_time: self.last_samp() as f64 / self.sfreq(),
            buffers: self.directory.buffers.len() - self.directory.skip_count(),
            skips: self.directory.skip_count(),
            has_projection: self.projection.is_some(),
            has_compensation: self.compensation.is_some(),
        }
    }

    /// Release the file.
    pub fn close(self) {
        info!("Closing raw data file {}", self.name);
    }
}
