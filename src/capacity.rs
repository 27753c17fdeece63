use crate::bitstream::HEADER_BITS;
use crate::codec::{capacity, carrier_bits, framed_bits};
use crate::error::{Result, StegError};
use crate::grid::SampleGrid;
use crate::params::EncodingParams;
use serde::Serialize;

/// How much a carrier can hold at one density
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityInfo {
    pub width: usize,
    pub height: usize,
    pub total_pixels: usize,
    pub bits_per_sample: u8,
    pub total_bits: u64,
    pub header_bits: usize,
    pub usable_bits: u64,
    pub max_bytes: usize,
}

/// Describe the capacity of `grid` for the given parameters.
pub fn capacity_info(grid: &SampleGrid, params: &EncodingParams) -> Result<CapacityInfo> {
    params.validate(grid)?;
    let total_bits = carrier_bits(grid, params);
    Ok(CapacityInfo {
        width: grid.width(),
        height: grid.height(),
        total_pixels: grid.pixel_count(),
        bits_per_sample: params.bits_per_sample,
        total_bits,
        header_bits: HEADER_BITS,
        usable_bits: total_bits.saturating_sub(HEADER_BITS as u64),
        max_bytes: capacity(grid, params),
    })
}

/// Summary of how a payload maps onto a carrier, computed without embedding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedSummary {
    pub payload_bytes: usize,
    pub payload_bits: u64,
    pub header_bits: usize,
    pub total_bits: u64,
    pub pixels_modified: usize,
    pub capacity_bytes: usize,
    pub capacity_used_percent: f64,
    pub bits_per_sample: u8,
    pub channel: usize,
    pub channel_name: &'static str,
}

impl EmbedSummary {
    pub fn headroom_bytes(&self) -> usize {
        self.capacity_bytes.saturating_sub(self.payload_bytes)
    }

    pub fn fits(&self) -> bool {
        self.payload_bytes <= self.capacity_bytes
    }
}

/// Plan an embed of `payload_len` bytes. Does not fail when the payload is
/// too large; check [`EmbedSummary::fits`].
pub fn plan_embed(
    grid: &SampleGrid,
    payload_len: usize,
    params: &EncodingParams,
) -> Result<EmbedSummary> {
    params.validate(grid)?;
    let total_bits = framed_bits(payload_len);
    let available = carrier_bits(grid, params);
    let pixels = (total_bits as usize).div_ceil(params.bits_per_sample as usize);
    Ok(EmbedSummary {
        payload_bytes: payload_len,
        payload_bits: payload_len as u64 * 8,
        header_bits: HEADER_BITS,
        total_bits,
        pixels_modified: pixels.min(grid.pixel_count()),
        capacity_bytes: capacity(grid, params),
        capacity_used_percent: total_bits as f64 / available as f64 * 100.0,
        bits_per_sample: params.bits_per_sample,
        channel: params.channel,
        channel_name: params.channel_name(),
    })
}

/// Smallest density (1..=3) at which `payload_len` bytes fit, if any.
pub fn minimum_density(grid: &SampleGrid, payload_len: usize, channel: usize) -> Result<u8> {
    for bps in 1..=3u8 {
        let params = EncodingParams::new(bps, channel);
        params.validate(grid)?;
        if payload_len <= capacity(grid, &params) {
            return Ok(bps);
        }
    }
    let params = EncodingParams::new(3, channel);
    Err(StegError::CapacityExceeded {
        needed_bits: framed_bits(payload_len),
        available_bits: carrier_bits(grid, &params),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_info() {
        let grid = SampleGrid::filled(100, 50, 3, 0).unwrap();
        let info = capacity_info(&grid, &EncodingParams::new(2, 2)).unwrap();
        assert_eq!(info.total_pixels, 5000);
        assert_eq!(info.total_bits, 10_000);
        assert_eq!(info.usable_bits, 9_968);
        assert_eq!(info.max_bytes, 1_246);
    }

    #[test]
    fn test_plan_embed() {
        let grid = SampleGrid::filled(64, 64, 3, 0).unwrap();
        let plan = plan_embed(&grid, 8, &EncodingParams::new(3, 2)).unwrap();
        assert_eq!(plan.total_bits, 96);
        assert_eq!(plan.pixels_modified, 32);
        assert_eq!(plan.channel_name, "blue");
        assert!(plan.fits());
        assert_eq!(plan.headroom_bytes(), plan.capacity_bytes - 8);
    }

    #[test]
    fn test_plan_reports_overflow() {
        let grid = SampleGrid::filled(8, 8, 3, 0).unwrap();
        let plan = plan_embed(&grid, 100, &EncodingParams::default()).unwrap();
        assert!(!plan.fits());
        assert_eq!(plan.pixels_modified, 64);
        assert!(plan.capacity_used_percent > 100.0);
    }

    #[test]
    fn test_minimum_density() {
        let grid = SampleGrid::filled(32, 32, 3, 0).unwrap();
        // 1024 pixels: 124 / 252 / 380 bytes
        assert_eq!(minimum_density(&grid, 100, 2).unwrap(), 1);
        assert_eq!(minimum_density(&grid, 200, 2).unwrap(), 2);
        assert_eq!(minimum_density(&grid, 300, 2).unwrap(), 3);
        assert!(matches!(
            minimum_density(&grid, 400, 2),
            Err(StegError::CapacityExceeded { .. })
        ));
    }
}
