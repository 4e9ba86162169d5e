use crate::config::{ScrubConfig, ZeroBaseline};

// ---------------------------------------------------------------------------
// Spike removal over a trailing lookback window
// ---------------------------------------------------------------------------

/// Drop readings that spike above `spike_factor` times the mean of the
/// `window` readings immediately before them.
///
/// * Inputs shorter than `window` come back unchanged.
/// * The first `window` readings are always kept.
/// * The lookback is taken from the *input*, not from the kept output, so a
///   dropped spike still counts towards the baseline of its successors.
pub fn scrub_outliers(readings: &[f64], config: &ScrubConfig) -> Vec<f64> {
    let window = config.window;
    if window == 0 || readings.len() < window {
        return readings.to_vec();
    }

    let mut kept = Vec::with_capacity(readings.len());
    kept.extend_from_slice(&readings[..window]);

    for i in window..readings.len() {
        let mean = readings[i - window..i].iter().sum::<f64>() / window as f64;
        let value = readings[i];
        if mean == 0.0 && config.zero_baseline == ZeroBaseline::Keep {
            kept.push(value);
            continue;
        }
        if value > config.spike_factor * mean {
            continue;
        }
        kept.push(value);
    }
    kept
}
