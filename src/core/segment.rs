// Segment reader: sample windows out of the buffer index

use crate::core::directory::BufferDescriptor;
use crate::core::error::{RawError, Result};
use crate::core::raw::RawHandle;
use crate::core::source::TagSource;
use ndarray::{aview1, s, Array1, Array2, ArrayView2, ArrayViewMut2, Axis};
use serde::Serialize;
use tracing::{debug, info};

/// Calibrated samples (channels x samples) and their times in seconds.
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub data: Array2<f64>,
    pub times: Vec<f64>,
}

impl Segment {
    pub fn nchan(&self) -> usize {
        self.data.nrows()
    }

    pub fn nsamp(&self) -> usize {
        self.data.ncols()
    }
}

/// Read samples `from..=to` of the selected channels.
///
/// Missing bounds default to the first and last sample of the recording and
/// both are clamped to it. Skipped regions read as zeros.
pub fn read_raw_segment<S: TagSource>(
    raw: &RawHandle<S>,
    from: Option<i64>,
    to: Option<i64>,
    sel: Option<&[usize]>,
) -> Result<Segment> {
    let from = from.unwrap_or(raw.first_samp()).max(raw.first_samp());
    let to = to.unwrap_or(raw.last_samp()).min(raw.last_samp());
    if from > to {
        return Err(RawError::EmptyRange {
            from,
            to,
            first_samp: raw.first_samp(),
            last_samp: raw.last_samp(),
        });
    }

    let sfreq = raw.sfreq();
    info!(
        "Reading {} ... {}  =  {:9.3} ... {:9.3} secs...",
        from,
        to,
        from as f64 / sfreq,
        to as f64 / sfreq
    );

    let op = Operator::new(raw, sel)?;
    let nchan = raw.nchan();
    let ncols = (to - from + 1) as usize;
    let mut data = Array2::<f64>::zeros((op.rows(), ncols));
    let mut dest = 0usize;

    for buf in raw.directory() {
        if buf.last < from {
            continue;
        }

        let (pick, start, end) = Pick::select(buf, from, to);
        debug!("{:?} pick {}..{} of buffer {} ... {}", pick, start, end, buf.first, buf.last);

        // Skips read as zeros and the output starts zeroed
        if let Some(ent) = buf.ent {
            let values = raw.source().read_tag(ent.pos)?.decode_samples()?;
            if values.len() != nchan * buf.nsamp {
                return Err(RawError::CorruptedData(format!(
                    "Buffer at {} holds {} values, expected {} x {}",
                    ent.pos,
                    values.len(),
                    nchan,
                    buf.nsamp
                )));
            }
            // Stored sample-major, so the transpose is channels x samples
            let window = ArrayView2::from_shape((buf.nsamp, nchan), values.as_slice())
                .map_err(|e| RawError::CorruptedData(format!("Buffer at {}: {}", ent.pos, e)))?
                .reversed_axes();
            op.apply(
                window.slice(s![.., start..end]),
                data.slice_mut(s![.., dest..dest + (end - start)]),
            );
        }
        dest += end - start;

        if buf.last >= to {
            debug!("[done]");
            break;
        }
    }

    let times = (0..ncols)
        .map(|i| (from + i as i64) as f64 / sfreq)
        .collect();

    Ok(Segment { data, times })
}

/// Read the samples between two times in seconds.
///
/// The window is widened to whole samples: `floor(from * sfreq)` to `ceil(to * sfreq)`.
pub fn read_raw_segment_times<S: TagSource>(
    raw: &RawHandle<S>,
    from: f64,
    to: f64,
    sel: Option<&[usize]>,
) -> Result<Segment> {
    let sfreq = raw.sfreq();
    let from = (from * sfreq).floor() as i64;
    let to = (to * sfreq).ceil() as i64;
    read_raw_segment(raw, Some(from), Some(to), sel)
}

/// How a buffer overlaps the requested window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pick {
    /// The whole buffer lies inside the window.
    Whole,
    /// The window lies strictly inside the buffer.
    Interior,
    /// From `from` to the end of the buffer.
    Tail,
    /// From the start of the buffer up to `to`.
    Head,
}

impl Pick {
    /// Overlap case and the half-open column range within the buffer.
    fn select(buf: &BufferDescriptor, from: i64, to: i64) -> (Self, usize, usize) {
        if to >= buf.last && from <= buf.first {
            (Pick::Whole, 0, buf.nsamp)
        } else if from > buf.first {
            let start = (from - buf.first) as usize;
            if to < buf.last {
                (Pick::Interior, start, (to - buf.first + 1) as usize)
            } else {
                (Pick::Tail, start, buf.nsamp)
            }
        } else {
            (Pick::Head, 0, (to - buf.first + 1) as usize)
        }
    }
}

/// Linear map from stored channel values to output rows.
enum Operator {
    /// Selected rows scaled by their calibration.
    Calibration { picks: Vec<usize>, cals: Array1<f64> },
    /// Selected rows of projection * compensation * diag(cals).
    Combined(Array2<f64>),
}

impl Operator {
    fn new<S>(raw: &RawHandle<S>, sel: Option<&[usize]>) -> Result<Self> {
        let nchan = raw.nchan();
        let picks: Vec<usize> = match sel {
            Some(sel) => {
                if let Some(&index) = sel.iter().find(|&&k| k >= nchan) {
                    return Err(RawError::InvalidSelection { index, nchan });
                }
                sel.to_vec()
            }
            None => (0..nchan).collect(),
        };

        // Compensation applies first, then projection
        let transform = match (raw.projection(), raw.compensation()) {
            (None, None) => None,
            (Some(proj), None) => Some(proj.select(Axis(0), &picks)),
            (None, Some(comp)) => Some(comp.select(Axis(0), &picks)),
            (Some(proj), Some(comp)) => Some(proj.select(Axis(0), &picks).dot(comp)),
        };

        let cals = aview1(raw.cals());
        match transform {
            Some(m) => Ok(Operator::Combined(m * &cals)),
            None => {
                let cals = cals.select(Axis(0), &picks);
                Ok(Operator::Calibration { picks, cals })
            }
        }
    }

    fn rows(&self) -> usize {
        match self {
            Operator::Calibration { picks, .. } => picks.len(),
            Operator::Combined(m) => m.nrows(),
        }
    }

    /// Map a channels x samples window into the matching output columns.
    fn apply(&self, window: ArrayView2<f64>, mut out: ArrayViewMut2<f64>) {
        match self {
            Operator::Calibration { picks, cals } => {
                let scaled = window.select(Axis(0), picks) * &cals.view().insert_axis(Axis(1));
                out.assign(&scaled);
            }
            Operator::Combined(m) => out.assign(&m.dot(&window)),
        }
    }
}
