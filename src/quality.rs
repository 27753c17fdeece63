//! Distortion metrics between a cover and its stego version.
//!
//! - **MSE**: mean squared sample difference
//! - **PSNR**: `10·log10(255² / MSE)`, infinite for identical grids
//! - **SSIM**: mean structural similarity over uniform 7×7 windows, per
//!   channel, averaged across channels

use crate::error::{Result, StegError};
use crate::grid::{SampleGrid, MAX_SAMPLE_VALUE};
use serde::{Serialize, Serializer};

/// SSIM window edge for grids large enough to hold it.
pub const SSIM_WINDOW: usize = 7;

const K1: f64 = 0.01;
const K2: f64 = 0.03;

/// Overall quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityTier {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Poor,
}

impl QualityTier {
    pub fn is_imperceptible(self) -> bool {
        matches!(self, QualityTier::Excellent | QualityTier::VeryGood)
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            QualityTier::Excellent => "Excellent",
            QualityTier::VeryGood => "Very Good",
            QualityTier::Good => "Good",
            QualityTier::Poor => "Poor",
        };
        write!(f, "{}", text)
    }
}

/// Raw sample-difference statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffStats {
    pub max_difference: u8,
    pub mean_difference: f64,
    pub samples_changed: usize,
    pub total_samples: usize,
    pub change_percentage: f64,
}

/// Plain-language reading of each metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDetails {
    pub mse_interpretation: &'static str,
    pub psnr_interpretation: &'static str,
    pub ssim_interpretation: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub mse: f64,
    /// `f64::INFINITY` when the grids are identical; serialized as "inf".
    #[serde(serialize_with = "serialize_psnr")]
    pub psnr: f64,
    pub ssim: f64,
    pub assessment: QualityTier,
    pub imperceptible: bool,
    pub recommendations: Vec<String>,
    pub details: MetricDetails,
    pub diff: DiffStats,
}

fn serialize_psnr<S: Serializer>(psnr: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if psnr.is_infinite() {
        serializer.serialize_str("inf")
    } else {
        serializer.serialize_f64(*psnr)
    }
}

/// Compare an original grid with a modified one.
pub fn compare(original: &SampleGrid, modified: &SampleGrid) -> Result<QualityReport> {
    check_dimensions(original, modified)?;

    let mse = mse(original, modified);
    let psnr = psnr_from_mse(mse);
    let ssim = ssim(original, modified);
    let assessment = assess(mse, psnr, ssim);

    Ok(QualityReport {
        mse,
        psnr,
        ssim,
        assessment,
        imperceptible: assessment.is_imperceptible(),
        recommendations: recommendations(mse, psnr, ssim),
        details: MetricDetails {
            mse_interpretation: interpret_mse(mse),
            psnr_interpretation: interpret_psnr(psnr),
            ssim_interpretation: interpret_ssim(ssim),
        },
        diff: diff_stats(original, modified),
    })
}

fn check_dimensions(original: &SampleGrid, modified: &SampleGrid) -> Result<()> {
    if original.width() != modified.width()
        || original.height() != modified.height()
        || original.channels() != modified.channels()
    {
        return Err(StegError::DimensionMismatch {
            expected: original.shape(),
            actual: modified.shape(),
        });
    }
    Ok(())
}

/// Mean squared error over every sample. Grids must share a shape.
pub fn mse(original: &SampleGrid, modified: &SampleGrid) -> f64 {
    let sum: u64 = original
        .samples()
        .iter()
        .zip(modified.samples())
        .map(|(&a, &b)| {
            let d = a as i64 - b as i64;
            (d * d) as u64
        })
        .sum();
    sum as f64 / original.samples().len() as f64
}

pub fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        return f64::INFINITY;
    }
    let max = MAX_SAMPLE_VALUE as f64;
    10.0 * (max * max / mse).log10()
}

/// Mean SSIM across channels. Grids must share a shape.
pub fn ssim(original: &SampleGrid, modified: &SampleGrid) -> f64 {
    let channels = original.channels();
    let total: f64 = (0..channels)
        .map(|c| {
            let x: Vec<u8> = original.channel_samples(c).collect();
            let y: Vec<u8> = modified.channel_samples(c).collect();
            channel_ssim(&x, &y, original.width(), original.height())
        })
        .sum();
    total / channels as f64
}

/// Largest odd window not exceeding [`SSIM_WINDOW`] or either grid edge.
fn window_size(width: usize, height: usize) -> usize {
    let w = SSIM_WINDOW.min(width).min(height);
    if w % 2 == 0 {
        w - 1
    } else {
        w
    }
}

/// Summed-area table with a zero first row/column.
struct Integral {
    stride: usize,
    table: Vec<u64>,
}

impl Integral {
    fn build(width: usize, height: usize, value: impl Fn(usize) -> u64) -> Self {
        let stride = width + 1;
        let mut table = vec![0u64; stride * (height + 1)];
        for y in 0..height {
            let mut row = 0u64;
            for x in 0..width {
                row += value(y * width + x);
                table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row;
            }
        }
        Self { stride, table }
    }

    /// Sum of the `size`×`size` window with top-left corner (x, y).
    fn window(&self, x: usize, y: usize, size: usize) -> f64 {
        let s = self.stride;
        let a = self.table[y * s + x];
        let b = self.table[y * s + x + size];
        let c = self.table[(y + size) * s + x];
        let d = self.table[(y + size) * s + x + size];
        (d + a - b - c) as f64
    }
}

fn channel_ssim(x: &[u8], y: &[u8], width: usize, height: usize) -> f64 {
    let win = window_size(width, height);
    let n = (win * win) as f64;
    // unbiased (N-1) covariance
    let cov_norm = if n > 1.0 { n / (n - 1.0) } else { 1.0 };
    let range = MAX_SAMPLE_VALUE as f64;
    let c1 = (K1 * range).powi(2);
    let c2 = (K2 * range).powi(2);

    let sx = Integral::build(width, height, |i| x[i] as u64);
    let sy = Integral::build(width, height, |i| y[i] as u64);
    let sxx = Integral::build(width, height, |i| (x[i] as u64).pow(2));
    let syy = Integral::build(width, height, |i| (y[i] as u64).pow(2));
    let sxy = Integral::build(width, height, |i| x[i] as u64 * y[i] as u64);

    let mut total = 0.0;
    let mut windows = 0usize;
    for wy in 0..=(height - win) {
        for wx in 0..=(width - win) {
            let ux = sx.window(wx, wy, win) / n;
            let uy = sy.window(wx, wy, win) / n;
            let vx = cov_norm * (sxx.window(wx, wy, win) / n - ux * ux);
            let vy = cov_norm * (syy.window(wx, wy, win) / n - uy * uy);
            let vxy = cov_norm * (sxy.window(wx, wy, win) / n - ux * uy);

            let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
            let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            total += numerator / denominator;
            windows += 1;
        }
    }
    total / windows as f64
}

/// Tier from the three metrics.
pub fn assess(mse: f64, psnr: f64, ssim: f64) -> QualityTier {
    if mse < 1.0 && psnr > 50.0 && ssim > 0.99 {
        QualityTier::Excellent
    } else if psnr > 40.0 && ssim > 0.95 {
        QualityTier::VeryGood
    } else if psnr > 30.0 && ssim > 0.90 {
        QualityTier::Good
    } else {
        QualityTier::Poor
    }
}

pub fn recommendations(mse: f64, psnr: f64, ssim: f64) -> Vec<String> {
    let mut out = Vec::new();
    if psnr < 40.0 {
        out.push("Reduce bits_per_sample (e.g. 1 instead of 2 or 3)".to_string());
    }
    if ssim < 0.95 {
        out.push("Structural quality is reduced; the embedding may be detectable".to_string());
    }
    if mse > 10.0 {
        out.push("High MSE indicates significant changes; use a different cover image".to_string());
    }
    if psnr > 50.0 && ssim > 0.99 {
        out.push("Excellent quality; changes are imperceptible".to_string());
    }
    if out.is_empty() {
        out.push("Quality is acceptable for steganography use".to_string());
    }
    out
}

fn interpret_mse(mse: f64) -> &'static str {
    match mse {
        m if m == 0.0 => "Perfect (images identical)",
        m if m < 1.0 => "Excellent (imperceptible differences)",
        m if m < 10.0 => "Good (very minor differences)",
        m if m < 100.0 => "Acceptable (minor differences)",
        _ => "Poor (visible differences)",
    }
}

fn interpret_psnr(psnr: f64) -> &'static str {
    match psnr {
        p if p.is_infinite() => "Perfect (images identical)",
        p if p > 50.0 => "Excellent (imperceptible)",
        p if p > 40.0 => "Very good (nearly imperceptible)",
        p if p > 30.0 => "Acceptable",
        _ => "Poor (visible distortion)",
    }
}

fn interpret_ssim(ssim: f64) -> &'static str {
    match ssim {
        s if s >= 0.999 => "Excellent (imperceptible)",
        s if s >= 0.99 => "Very good (nearly imperceptible)",
        s if s >= 0.95 => "Good",
        s if s >= 0.90 => "Acceptable",
        _ => "Poor",
    }
}

fn diff_stats(original: &SampleGrid, modified: &SampleGrid) -> DiffStats {
    let mut max_difference = 0u8;
    let mut sum = 0u64;
    let mut changed = 0usize;
    for (&a, &b) in original.samples().iter().zip(modified.samples()) {
        let d = a.abs_diff(b);
        if d > 0 {
            changed += 1;
            sum += d as u64;
            max_difference = max_difference.max(d);
        }
    }
    let total = original.samples().len();
    DiffStats {
        max_difference,
        mean_difference: sum as f64 / total as f64,
        samples_changed: changed,
        total_samples: total,
        change_percentage: changed as f64 / total as f64 * 100.0,
    }
}
