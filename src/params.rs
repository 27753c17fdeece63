use crate::error::{Result, StegError};
use crate::grid::{channel_name, SampleGrid};
use serde::{Deserialize, Serialize};

/// Channel used when the caller does not pick one (blue).
pub const DEFAULT_CHANNEL: usize = 2;

/// Smallest and largest supported bit density.
pub const MIN_BITS_PER_SAMPLE: u8 = 1;
pub const MAX_BITS_PER_SAMPLE: u8 = 3;

/// Bit-density presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    /// 1 bit per sample: least visible, least capacity
    #[default]
    High,
    /// 2 bits per sample
    Standard,
    /// 3 bits per sample: most capacity, most visible
    Fast,
}

impl Density {
    pub fn bits_per_sample(self) -> u8 {
        match self {
            Density::High => 1,
            Density::Standard => 2,
            Density::Fast => 3,
        }
    }
}

impl std::str::FromStr for Density {
    type Err = StegError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "high" | "1" => Ok(Self::High),
            "standard" | "2" => Ok(Self::Standard),
            "fast" | "3" => Ok(Self::Fast),
            _ => Err(StegError::InvalidParameters(format!("density: {}", s))),
        }
    }
}

/// How a payload is laid into a carrier. Must match between embed and extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingParams {
    pub bits_per_sample: u8,
    pub channel: usize,
}

impl Default for EncodingParams {
    fn default() -> Self {
        Self {
            bits_per_sample: MIN_BITS_PER_SAMPLE,
            channel: DEFAULT_CHANNEL,
        }
    }
}

impl EncodingParams {
    pub fn new(bits_per_sample: u8, channel: usize) -> Self {
        Self {
            bits_per_sample,
            channel,
        }
    }

    pub fn from_density(density: Density, channel: usize) -> Self {
        Self::new(density.bits_per_sample(), channel)
    }

    /// Check the parameters against a carrier's shape.
    pub fn validate(&self, grid: &SampleGrid) -> Result<()> {
        if !(MIN_BITS_PER_SAMPLE..=MAX_BITS_PER_SAMPLE).contains(&self.bits_per_sample) {
            return Err(StegError::InvalidParameters(format!(
                "bits_per_sample must be 1, 2 or 3, got {}",
                self.bits_per_sample
            )));
        }
        if self.channel >= grid.channels() {
            return Err(StegError::InvalidParameters(format!(
                "channel {} out of range for a {}-channel carrier",
                self.channel,
                grid.channels()
            )));
        }
        Ok(())
    }

    /// Mask keeping everything except the low `bits_per_sample` bits.
    pub fn keep_mask(&self) -> u8 {
        !self.value_mask()
    }

    /// Mask selecting the low `bits_per_sample` bits.
    pub fn value_mask(&self) -> u8 {
        ((1u16 << self.bits_per_sample) - 1) as u8
    }

    pub fn channel_name(&self) -> &'static str {
        channel_name(self.channel)
    }
}
