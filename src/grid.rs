use crate::error::{Result, StegError};

/// Highest value an 8-bit sample can hold.
pub const MAX_SAMPLE_VALUE: u8 = u8::MAX;

/// Rectangular grid of pixels with interleaved 8-bit channels.
///
/// Samples are stored row-major, pixel after pixel:
/// `samples[(y * width + x) * channels + c]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGrid {
    width: usize,
    height: usize,
    channels: usize,
    samples: Vec<u8>,
}

impl SampleGrid {
    /// Wrap an existing sample buffer, checking that it matches the shape.
    pub fn new(width: usize, height: usize, channels: usize, samples: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|p| p.checked_mul(channels))
            .ok_or_else(|| StegError::InvalidGrid("dimensions overflow".into()))?;
        if expected == 0 {
            return Err(StegError::InvalidGrid(format!(
                "{}x{}x{} has no samples",
                width, height, channels
            )));
        }
        if samples.len() != expected {
            return Err(StegError::InvalidGrid(format!(
                "{}x{}x{} needs {} samples, got {}",
                width,
                height,
                channels,
                expected,
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Grid where every sample equals `value`.
    pub fn filled(width: usize, height: usize, channels: usize, value: u8) -> Result<Self> {
        let len = width.saturating_mul(height).saturating_mul(channels);
        Self::new(width, height, channels, vec![value; len])
    }

    /// Build a grid from a per-pixel function returning one value per channel.
    pub fn from_fn<F>(width: usize, height: usize, channels: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize, usize) -> u8,
    {
        let mut samples = Vec::with_capacity(width.saturating_mul(height).saturating_mul(channels));
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    samples.push(f(x, y, c));
                }
            }
        }
        Self::new(width, height, channels, samples)
    }

    /// Synthetic RGB carrier: red ramps with x, green ramps with y, blue is
    /// constant mid-gray.
    pub fn gradient(width: usize, height: usize) -> Result<Self> {
        Self::from_fn(width, height, 3, |x, y, c| match c {
            0 => (x * 255 / width.max(1)) as u8,
            1 => (y * 255 / height.max(1)) as u8,
            _ => 128,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// Flat index of sample `channel` of the pixel at raster position `pixel`.
    #[inline]
    pub fn index(&self, pixel: usize, channel: usize) -> usize {
        pixel * self.channels + channel
    }

    pub fn sample(&self, x: usize, y: usize, channel: usize) -> u8 {
        self.samples[self.index(y * self.width + x, channel)]
    }

    /// Samples of one channel in raster order.
    pub fn channel_samples(&self, channel: usize) -> impl Iterator<Item = u8> + '_ {
        self.samples
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .copied()
    }

    /// "WxHxC" description used in error messages and reports.
    pub fn shape(&self) -> String {
        format!("{}x{}x{}", self.width, self.height, self.channels)
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }
}

/// Human name of a channel index for 3/4-channel grids.
pub fn channel_name(channel: usize) -> &'static str {
    match channel {
        0 => "red",
        1 => "green",
        2 => "blue",
        3 => "alpha",
        _ => "unknown",
    }
}
