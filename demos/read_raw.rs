// Example usage of the FIFF raw reader

use anyhow::Context;
use fiff_raw::{read_raw_segment, setup_read_raw_with_config, ReaderConfig};
use tracing::{info, Level};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "data/test_raw.fif".to_string());
    let config = match args.next() {
        Some(conf) => ReaderConfig::load(&conf).with_context(|| format!("loading {conf}"))?,
        None => ReaderConfig::default(),
    };

    let raw = setup_read_raw_with_config(&path, &config)
        .with_context(|| format!("opening {path}"))?;

    let summary = serde_json::to_string_pretty(&raw.summary())?;
    info!("Summary:\n{}", summary);

    info!("Channels:");
    for (i, ch) in raw.info().channels.iter().enumerate().take(10) {
        info!("  [{}] {} cal={}", i, ch.ch_name, ch.calibration());
    }

    // First second of the first three channels
    let from = raw.first_samp();
    let to = (from + raw.sfreq() as i64 - 1).min(raw.last_samp());
    let sel: Vec<usize> = (0..raw.nchan().min(3)).collect();
    let segment = read_raw_segment(&raw, Some(from), Some(to), Some(&sel))?;

    info!(
        "Read {} x {} samples, {:.3} ... {:.3} secs",
        segment.nchan(),
        segment.nsamp(),
        segment.times.first().copied().unwrap_or_default(),
        segment.times.last().copied().unwrap_or_default()
    );
    for c in 0..segment.nchan() {
        let row = segment.data.row(c);
        let peak = row.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        info!("  channel {}: peak {:e}", sel[c], peak);
    }

    raw.close();
    Ok(())
}
