use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IntegrityError, Result};

// ---------------------------------------------------------------------------
// Scrubber configuration
// ---------------------------------------------------------------------------

/// What to do with a reading whose lookback window averages exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroBaseline {
    /// Apply the rule literally: `factor * 0 == 0`, so any positive reading is a spike.
    #[default]
    Reject,
    /// Keep every reading that follows an all-zero window.
    Keep,
}

/// Tunables for the outlier scrubber.
///
/// ```toml
/// window = 3
/// spike_factor = 3.0
/// zero_baseline = "reject"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubConfig {
    /// Lookback length; the first `window` readings are kept as seed data.
    pub window: usize,
    /// A reading above `spike_factor * window_mean` is dropped.
    pub spike_factor: f64,
    pub zero_baseline: ZeroBaseline,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            window: 3,
            spike_factor: 3.0,
            zero_baseline: ZeroBaseline::Reject,
        }
    }
}

impl ScrubConfig {
    /// Read and validate a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            IntegrityError::Config(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: ScrubConfig =
            toml::from_str(text).map_err(|e| IntegrityError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(IntegrityError::Config("window must be at least 1".into()));
        }
        if !self.spike_factor.is_finite() || self.spike_factor < 0.0 {
            return Err(IntegrityError::Config(format!(
                "spike_factor must be a finite non-negative number, got {}",
                self.spike_factor
            )));
        }
        Ok(())
    }
}
