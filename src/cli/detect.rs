use crate::detect::{analyze_image_with, analyze_text, DetectionReport, DetectorConfig};
use crate::error::{Result, StegError};
use crate::io::load_grid;
use std::path::{Path, PathBuf};

/// Options for the detect command
#[derive(Debug, Clone, Default)]
pub struct DetectOptions {
    /// Treat the input as UTF-8 text instead of an image
    pub text: bool,
    /// JSON detector configuration
    pub config: Option<PathBuf>,
    /// Overrides the configured channel
    pub channel: Option<usize>,
}

pub fn detect_file(path: &Path, options: &DetectOptions) -> Result<DetectionReport> {
    if options.text {
        let bytes = std::fs::read(path)?;
        return Ok(analyze_text(&String::from_utf8_lossy(&bytes)));
    }

    let mut config = match &options.config {
        Some(config_path) => DetectorConfig::from_json_file(config_path)?,
        None => DetectorConfig::default(),
    };
    if let Some(channel) = options.channel {
        config.channel = channel;
    }
    let grid = load_grid(path)?;
    if config.channel >= grid.channels() {
        return Err(StegError::InvalidParameters(format!(
            "channel {} out of range for a {}-channel image",
            config.channel,
            grid.channels()
        )));
    }
    Ok(analyze_image_with(&grid, &config))
}

pub fn show_detection(path: &Path, options: &DetectOptions, json: bool) -> Result<String> {
    let report = detect_file(path, options)?;
    if json {
        return Ok(serde_json::to_string_pretty(&report)? + "\n");
    }
    Ok(format_report(path, &report))
}

fn format_report(path: &Path, report: &DetectionReport) -> String {
    let mut output = String::new();
    output.push_str("Steganalysis Report\n");
    output.push_str("===================\n\n");
    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!(
        "Probability: {:.1}%\nVerdict: {}\n\n",
        report.probability, report.verdict
    ));

    if report.indicators.is_empty() {
        output.push_str("No indicators triggered.\n");
    } else {
        output.push_str("Indicators:\n");
        for indicator in &report.indicators {
            output.push_str(&format!("  - {}\n", indicator));
        }
    }

    output.push_str("\nSignals:\n");
    for (name, value) in &report.raw_signals {
        output.push_str(&format!("  {:<20} {:.4}\n", name, value));
    }
    output
}
