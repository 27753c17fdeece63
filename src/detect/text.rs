use super::{DetectionReport, Verdict};
use std::collections::BTreeMap;
use tracing::trace;

/// Invisible code points commonly used to hide bits in text.
pub const ZERO_WIDTH_CHARS: [(char, &str); 4] = [
    ('\u{200B}', "zero_width_space"),
    ('\u{200C}', "zero_width_non_joiner"),
    ('\u{200D}', "zero_width_joiner"),
    ('\u{FEFF}', "zero_width_no_break_space"),
];

/// Look for zero-width characters in `text`.
///
/// These code points almost never appear in ordinary prose, so any
/// occurrence is reported as likely steganography.
pub fn analyze_text(text: &str) -> DetectionReport {
    let mut raw_signals = BTreeMap::new();
    let mut total = 0usize;
    for (ch, name) in ZERO_WIDTH_CHARS {
        let count = text.chars().filter(|&c| c == ch).count();
        total += count;
        raw_signals.insert(name.to_string(), count as f64);
    }
    raw_signals.insert("zero_width_chars".to_string(), total as f64);
    raw_signals.insert("text_length".to_string(), text.chars().count() as f64);
    trace!(zero_width_chars = total, "text analyzed");

    if total == 0 {
        return DetectionReport {
            probability: 0.0,
            verdict: Verdict::Clean,
            indicators: Vec::new(),
            raw_signals,
        };
    }

    let probability = total.saturating_mul(10).clamp(75, 95) as f64;
    DetectionReport {
        probability,
        verdict: Verdict::LikelyStego,
        indicators: vec![format!("Found {} zero-width characters", total)],
        raw_signals,
    }
}
