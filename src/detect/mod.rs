//! Blind steganalysis: score a carrier (or text) without the original.
//!
//! Four signals are computed on the LSB plane of one channel, and a fifth on
//! pairs of neighbouring samples:
//!
//! | signal        | suspicious when                        |
//! |---------------|----------------------------------------|
//! | LSB ratio     | ones ratio within tolerance of 0.5     |
//! | pair χ²       | value pairs (2k, 2k+1) equalized       |
//! | LSB entropy   | packed LSB plane close to random       |
//! | run length    | runs of equal LSBs unusually short     |
//! | sample pairs  | estimated embedding rate above a floor |
//!
//! The fused probability is
//!
//! ```text
//! w_pairs·s_pairs + gate·Σ w_i·s_i      gate = s_pairs (or 1 when ungated)
//! ```
//!
//! clamped to [0, 100]. Camera noise makes the LSB plane of an untouched
//! photograph look random, so the first four fire on covers too; gated by
//! the sample-pair score they only add weight once that score moves.

mod config;
pub mod signals;
mod text;

pub use config::{DetectorConfig, SignalWeights};
pub use text::{analyze_text, ZERO_WIDTH_CHARS};

use crate::grid::SampleGrid;
use serde::Serialize;
use signals::{
    average_run_length, channel_entropy, lsb_ones_ratio, lsb_plane_entropy, pair_chi_square,
    sample_pair_rate,
};
use std::collections::BTreeMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Clean,
    Uncertain,
    Suspicious,
    LikelyStego,
}

impl Verdict {
    /// Band a probability: [0,25) clean, [25,50) uncertain, [50,75)
    /// suspicious, [75,100] likely stego.
    pub fn from_probability(probability: f64) -> Self {
        match probability {
            p if p >= 75.0 => Verdict::LikelyStego,
            p if p >= 50.0 => Verdict::Suspicious,
            p if p >= 25.0 => Verdict::Uncertain,
            _ => Verdict::Clean,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Verdict::Clean => "clean",
            Verdict::Uncertain => "uncertain",
            Verdict::Suspicious => "suspicious",
            Verdict::LikelyStego => "likely_stego",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub probability: f64,
    pub verdict: Verdict,
    /// Signals that crossed their threshold, in evaluation order.
    pub indicators: Vec<String>,
    pub raw_signals: BTreeMap<String, f64>,
}

/// Analyze a grid with the default configuration.
pub fn analyze_image(grid: &SampleGrid) -> DetectionReport {
    analyze_image_with(grid, &DetectorConfig::default())
}

pub fn analyze_image_with(grid: &SampleGrid, config: &DetectorConfig) -> DetectionReport {
    let channel = config.channel.min(grid.channels() - 1);
    let values: Vec<u8> = grid.channel_samples(channel).collect();
    let weights = &config.weights;

    let mut indicators = Vec::new();
    let mut raw_signals = BTreeMap::new();
    let mut plane = 0.0;

    let ratio = lsb_ones_ratio(&values);
    let balanced = (ratio - 0.5).abs() < config.lsb_ratio_tolerance;
    if balanced {
        indicators.push(format!(
            "LSB ones ratio {:.4} is within {} of 0.5",
            ratio, config.lsb_ratio_tolerance
        ));
        plane += weights.lsb_ratio;
    }
    raw_signals.insert("lsb_ratio".to_string(), ratio);
    trace!(ratio, balanced, "lsb ratio");

    let chi = pair_chi_square(&values);
    if chi.p_value > config.chi_square_threshold {
        indicators.push(format!(
            "Pair chi-square p-value {:.3} shows equalized value pairs",
            chi.p_value
        ));
    }
    plane += weights.chi_square * chi.p_value;
    raw_signals.insert("chi_square".to_string(), chi.statistic);
    raw_signals.insert("chi_square_df".to_string(), chi.degrees_of_freedom as f64);
    raw_signals.insert("chi_square_p_value".to_string(), chi.p_value);
    trace!(
        statistic = chi.statistic,
        df = chi.degrees_of_freedom,
        p_value = chi.p_value,
        "pair chi-square"
    );

    let entropy = lsb_plane_entropy(&values);
    if entropy > config.entropy_threshold {
        indicators.push(format!("LSB plane entropy {:.3} is close to random", entropy));
    }
    let entropy_score =
        ((entropy - config.entropy_floor) / (1.0 - config.entropy_floor)).clamp(0.0, 1.0);
    plane += weights.entropy * entropy_score;
    raw_signals.insert("lsb_entropy".to_string(), entropy);
    trace!(entropy, score = entropy_score, "lsb entropy");

    let runs = average_run_length(&values);
    if runs < config.run_length_threshold {
        indicators.push(format!("Average LSB run length {:.2} is unusually short", runs));
    }
    let run_score = ((config.run_length_natural - runs) / config.run_length_span).clamp(0.0, 1.0);
    plane += weights.run_length * run_score;
    raw_signals.insert("avg_run_length".to_string(), runs);
    trace!(runs, score = run_score, "run length");

    let rate = sample_pair_rate(&values, grid.width());
    if rate > config.sample_pair_threshold {
        indicators.push(format!(
            "Sample pair analysis estimates {:.0}% of samples carry data",
            rate * 100.0
        ));
    }
    let pair_score =
        ((rate - config.sample_pair_floor) / config.sample_pair_span).clamp(0.0, 1.0);
    raw_signals.insert("sample_pair_rate".to_string(), rate);
    trace!(rate, score = pair_score, "sample pairs");

    raw_signals.insert("channel_entropy".to_string(), channel_entropy(&values));
    raw_signals.insert("channel".to_string(), channel as f64);

    let gate = if config.gate_lsb_signals { pair_score } else { 1.0 };
    let probability = (weights.sample_pairs * pair_score + gate * plane).clamp(0.0, 100.0);
    let verdict = Verdict::from_probability(probability);
    debug!(
        channel,
        probability,
        %verdict,
        indicators = indicators.len(),
        "image analyzed"
    );

    DetectionReport {
        probability,
        verdict,
        indicators,
        raw_signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn smooth(width: usize, height: usize) -> SampleGrid {
        SampleGrid::from_fn(width, height, 3, |x, y, c| match c {
            2 => (100 + 2 * ((x + y) / 8)) as u8,
            _ => ((x + y) % 256) as u8,
        })
        .unwrap()
    }

    /// Smooth color ramps with σ = 2 noise on every sample.
    fn noisy(seed: u64) -> SampleGrid {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut samples = Vec::with_capacity(96 * 96 * 3);
        for y in 0..96 {
            for x in 0..96 {
                for c in 0..3 {
                    let scene = 70.0 + 0.7 * x as f64 + 0.4 * y as f64 + 10.0 * c as f64;
                    let noise: f64 = (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0;
                    samples.push((scene + 2.0 * noise).round() as u8);
                }
            }
        }
        SampleGrid::new(96, 96, 3, samples).unwrap()
    }

    #[test]
    fn test_verdict_bands() {
        assert_eq!(Verdict::from_probability(0.0), Verdict::Clean);
        assert_eq!(Verdict::from_probability(24.99), Verdict::Clean);
        assert_eq!(Verdict::from_probability(25.0), Verdict::Uncertain);
        assert_eq!(Verdict::from_probability(50.0), Verdict::Suspicious);
        assert_eq!(Verdict::from_probability(75.0), Verdict::LikelyStego);
        assert_eq!(Verdict::from_probability(100.0), Verdict::LikelyStego);
    }

    #[test]
    fn test_verdict_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Verdict::LikelyStego).unwrap(),
            "\"likely_stego\""
        );
        assert_eq!(Verdict::LikelyStego.to_string(), "likely_stego");
    }

    #[test]
    fn test_smooth_even_channel_is_clean() {
        let report = analyze_image(&smooth(64, 64));
        assert_eq!(report.verdict, Verdict::Clean);
        assert!(report.probability < 1.0);
        assert!(report.indicators.is_empty());
        assert_eq!(report.raw_signals["lsb_ratio"], 0.0);
        assert_eq!(report.raw_signals["avg_run_length"], 4096.0);
        assert_eq!(report.raw_signals["sample_pair_rate"], 0.0);
    }

    #[test]
    fn test_noisy_cover_lsb_signals_only_corroborate() {
        let grid = noisy(11);
        let report = analyze_image(&grid);
        assert_eq!(report.verdict, Verdict::Clean, "{:?}", report);
        assert!(report.raw_signals["sample_pair_rate"] < 0.15);
        // the plane itself is indistinguishable from random
        assert!(report.raw_signals["lsb_entropy"] > 0.9);

        let ungated = DetectorConfig {
            gate_lsb_signals: false,
            ..DetectorConfig::default()
        };
        let report = analyze_image_with(&grid, &ungated);
        assert!(report.probability >= 25.0, "{:?}", report);
    }

    #[test]
    fn test_alternating_lsbs_flag_run_length() {
        let grid = SampleGrid::from_fn(32, 32, 1, |x, y, _| (100 + ((x + y * 32) % 2)) as u8)
            .unwrap();
        let report = analyze_image(&grid);
        assert_eq!(report.raw_signals["channel"], 0.0);
        assert_eq!(report.raw_signals["avg_run_length"], 1.0);
        assert!(report
            .indicators
            .iter()
            .any(|i| i.contains("run length")));
        assert_eq!(report.raw_signals["sample_pair_rate"], 1.0);
        assert!(report.probability >= 25.0);
    }

    #[test]
    fn test_custom_weights_change_probability() {
        let grid = SampleGrid::from_fn(32, 32, 1, |x, y, _| (100 + ((x + y * 32) % 2)) as u8)
            .unwrap();
        let mut config = DetectorConfig::default();
        config.weights = SignalWeights {
            lsb_ratio: 0.0,
            chi_square: 0.0,
            entropy: 0.0,
            run_length: 100.0,
            sample_pairs: 0.0,
        };
        let report = analyze_image_with(&grid, &config);
        assert_eq!(report.probability, 100.0);
        assert_eq!(report.verdict, Verdict::LikelyStego);
    }
}
