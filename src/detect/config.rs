use crate::error::{Result, StegError};
use crate::params::DEFAULT_CHANNEL;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contribution of each signal to the fused probability. The defaults sum
/// to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub lsb_ratio: f64,
    pub chi_square: f64,
    pub entropy: f64,
    pub run_length: f64,
    pub sample_pairs: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            lsb_ratio: 10.0,
            chi_square: 10.0,
            entropy: 10.0,
            run_length: 10.0,
            sample_pairs: 60.0,
        }
    }
}

impl SignalWeights {
    pub fn total(&self) -> f64 {
        self.lsb_plane() + self.sample_pairs
    }

    /// Combined weight of the four signals read off the LSB plane alone.
    pub fn lsb_plane(&self) -> f64 {
        self.lsb_ratio + self.chi_square + self.entropy + self.run_length
    }
}

/// Thresholds and weights for image steganalysis.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```json
/// { "channel": 0, "weights": { "chi_square": 40.0 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Channel to analyze. The library clamps it to the last channel of
    /// narrower grids; the `detect` command rejects it instead.
    pub channel: usize,
    /// LSB ratio counts as suspicious when `|ratio - 0.5|` is below this.
    pub lsb_ratio_tolerance: f64,
    /// Pair chi-square p-value above which the channel looks equalized.
    pub chi_square_threshold: f64,
    /// Normalized LSB entropy that maps to a score of 0.
    pub entropy_floor: f64,
    pub entropy_threshold: f64,
    /// Average run length of an untouched natural image (score 0).
    pub run_length_natural: f64,
    /// Drop below `run_length_natural` that saturates the score.
    pub run_length_span: f64,
    pub run_length_threshold: f64,
    /// Sample-pair rate that maps to a score of 0.
    pub sample_pair_floor: f64,
    /// Rise above `sample_pair_floor` that saturates the score.
    pub sample_pair_span: f64,
    pub sample_pair_threshold: f64,
    /// Scale the LSB-plane signals by the sample-pair score. A noisy cover's
    /// LSB plane already looks random, so on their own they only corroborate.
    pub gate_lsb_signals: bool,
    pub weights: SignalWeights,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL,
            lsb_ratio_tolerance: 0.02,
            chi_square_threshold: 0.5,
            entropy_floor: 0.75,
            entropy_threshold: 0.9,
            run_length_natural: 3.0,
            run_length_span: 1.5,
            run_length_threshold: 2.2,
            sample_pair_floor: 0.05,
            sample_pair_span: 0.45,
            sample_pair_threshold: 0.1,
            gate_lsb_signals: true,
            weights: SignalWeights::default(),
        }
    }
}

impl DetectorConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: DetectorConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        if [w.lsb_ratio, w.chi_square, w.entropy, w.run_length, w.sample_pairs]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(StegError::InvalidParameters(
                "signal weights must be finite and non-negative".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.entropy_floor) {
            return Err(StegError::InvalidParameters(format!(
                "entropy_floor must be in [0, 1), got {}",
                self.entropy_floor
            )));
        }
        if self.run_length_span <= 0.0 {
            return Err(StegError::InvalidParameters(format!(
                "run_length_span must be positive, got {}",
                self.run_length_span
            )));
        }
        if !(0.0..1.0).contains(&self.sample_pair_floor) || self.sample_pair_span <= 0.0 {
            return Err(StegError::InvalidParameters(format!(
                "sample_pair_floor must be in [0, 1) and sample_pair_span positive, got {} and {}",
                self.sample_pair_floor, self.sample_pair_span
            )));
        }
        if self.lsb_ratio_tolerance < 0.0 {
            return Err(StegError::InvalidParameters(format!(
                "lsb_ratio_tolerance must not be negative, got {}",
                self.lsb_ratio_tolerance
            )));
        }
        Ok(())
    }
}
