//! LSB pixel codec.
//!
//! A payload is framed as a 32-bit big-endian *bit* count followed by the
//! payload bits, then written `bits_per_sample` bits at a time into the low
//! bits of one channel, pixel by pixel in raster order. The stream position of
//! a bit is `pixel_index * bits_per_sample + offset`, so the header and payload
//! share sample groups when 32 is not a multiple of the density.
//!
//! There is no magic number or checksum: extracting with the wrong parameters
//! yields garbage bytes or a [`StegError::TruncatedCarrier`].

use crate::bitstream::{decode_uint32, BitCursor, BitSink, HEADER_BITS};
use crate::error::{Result, StegError};
use crate::grid::SampleGrid;
use crate::params::EncodingParams;
use tracing::debug;

/// Bits available in the carrier's selected channel at this density.
pub fn carrier_bits(grid: &SampleGrid, params: &EncodingParams) -> u64 {
    grid.pixel_count() as u64 * params.bits_per_sample as u64
}

/// Number of framed bits (header included) for a payload of `payload_len` bytes.
pub fn framed_bits(payload_len: usize) -> u64 {
    HEADER_BITS as u64 + payload_len as u64 * 8
}

/// Maximum payload size in bytes for this carrier and density.
pub fn capacity(grid: &SampleGrid, params: &EncodingParams) -> usize {
    (carrier_bits(grid, params).saturating_sub(HEADER_BITS as u64) / 8) as usize
}

/// Build the framed byte buffer: 4-byte big-endian bit count, then payload.
fn frame(payload: &[u8]) -> Result<Vec<u8>> {
    let bit_count = u32::try_from(payload.len() as u64 * 8).map_err(|_| {
        StegError::CapacityExceeded {
            needed_bits: framed_bits(payload.len()),
            available_bits: u32::MAX as u64,
        }
    })?;
    let mut framed = Vec::with_capacity(HEADER_BITS / 8 + payload.len());
    framed.extend_from_slice(&bit_count.to_be_bytes());
    framed.extend_from_slice(payload);
    Ok(framed)
}

/// Hide `payload` in a copy of `grid`.
///
/// Only the low `bits_per_sample` bits of `params.channel` in the first
/// `ceil(framed_bits / bits_per_sample)` pixels change.
pub fn embed(grid: &SampleGrid, payload: &[u8], params: &EncodingParams) -> Result<SampleGrid> {
    params.validate(grid)?;

    let needed_bits = framed_bits(payload.len());
    let available_bits = carrier_bits(grid, params);
    if needed_bits > available_bits {
        return Err(StegError::CapacityExceeded {
            needed_bits,
            available_bits,
        });
    }

    let framed = frame(payload)?;
    let cursor = BitCursor::new(&framed);
    let bps = params.bits_per_sample;
    let pixels = (needed_bits as usize).div_ceil(bps as usize);
    let keep = params.keep_mask();

    let mut output = grid.clone();
    let channel = params.channel;
    let channels = grid.channels();
    let samples = output.samples_mut();
    for pixel in 0..pixels {
        let idx = pixel * channels + channel;
        let group = cursor.group(pixel * bps as usize, bps);
        samples[idx] = (samples[idx] & keep) | group;
    }

    debug!(
        payload_bytes = payload.len(),
        framed_bits = needed_bits,
        pixels_modified = pixels,
        bits_per_sample = bps,
        channel,
        "embedded payload"
    );

    Ok(output)
}

/// Recover the payload hidden by [`embed`] with the same parameters.
pub fn extract(grid: &SampleGrid, params: &EncodingParams) -> Result<Vec<u8>> {
    params.validate(grid)?;

    let bps = params.bits_per_sample as usize;
    let total_bits = carrier_bits(grid, params);
    if total_bits < HEADER_BITS as u64 {
        return Err(StegError::TruncatedCarrier {
            declared_bits: HEADER_BITS as u64,
            available_bits: total_bits,
        });
    }

    let reader = LsbReader::new(grid, params);
    let header: Vec<bool> = (0..HEADER_BITS).map(|i| reader.bit(i)).collect();
    let declared_bits = decode_uint32(&header) as u64;
    let available_bits = total_bits - HEADER_BITS as u64;
    if declared_bits > available_bits {
        return Err(StegError::TruncatedCarrier {
            declared_bits,
            available_bits,
        });
    }

    let declared = declared_bits as usize;
    let mut sink = BitSink::with_capacity(declared);
    for i in 0..declared {
        sink.push(reader.bit(HEADER_BITS + i));
    }

    debug!(
        declared_bits,
        pixels_read = (HEADER_BITS + declared).div_ceil(bps),
        bits_per_sample = bps,
        channel = params.channel,
        "extracted payload"
    );

    sink.into_bytes()
}

/// Reads the embedded bit stream of a carrier by stream position.
struct LsbReader<'a> {
    samples: &'a [u8],
    channels: usize,
    channel: usize,
    bps: usize,
}

impl<'a> LsbReader<'a> {
    fn new(grid: &'a SampleGrid, params: &EncodingParams) -> Self {
        Self {
            samples: grid.samples(),
            channels: grid.channels(),
            channel: params.channel,
            bps: params.bits_per_sample as usize,
        }
    }

    /// Stream bit at `position`; the first bit of a sample group is its most
    /// significant low bit.
    fn bit(&self, position: usize) -> bool {
        let pixel = position / self.bps;
        let offset = position % self.bps;
        let sample = self.samples[pixel * self.channels + self.channel];
        (sample >> (self.bps - 1 - offset)) & 1 == 1
    }
}
