use anyhow::{bail, Result};
use pixelveil::detect::signals::{
    average_run_length, bit_plane_ratio, channel_entropy, lsb_ones_ratio, lsb_plane_entropy,
    pair_chi_square, sample_pair_rate,
};
use pixelveil::detect::{analyze_image_with, DetectorConfig, Verdict};
use pixelveil::grid::channel_name;
use pixelveil::io::load_grid;
use pixelveil::SampleGrid;
use std::path::{Path, PathBuf};

#[derive(Default)]
pub struct StatsOptions {
    /// Channel for the fused verdict (default from the config)
    pub channel: Option<usize>,
    pub config: Option<PathBuf>,
}

/// Per-channel LSB statistics of an image, rendered as a dashboard table.
pub fn run(path: &Path, options: &StatsOptions) -> Result<String> {
    let grid = load_grid(path)?;
    let mut config = match &options.config {
        Some(config_path) => DetectorConfig::from_json_file(config_path)?,
        None => DetectorConfig::default(),
    };
    if let Some(channel) = options.channel {
        config.channel = channel;
    }
    if config.channel >= grid.channels() {
        bail!(
            "Channel {} out of range (image has {} channels)",
            config.channel,
            grid.channels()
        );
    }

    let mut output = String::new();
    output.push_str("Steganalyst LSB Analysis\n");
    output.push_str("========================\n\n");
    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!(
        "Image: {}x{}, {} channels ({} pixels)\n\n",
        grid.width(),
        grid.height(),
        grid.channels(),
        grid.pixel_count()
    ));

    let dashboard = build_dashboard(&grid, &config);
    output.push_str(&dashboard.render());
    Ok(output)
}

fn build_dashboard(grid: &SampleGrid, config: &DetectorConfig) -> Dashboard {
    let mut dashboard = Dashboard::new("LSB Steganalysis");

    for channel in 0..grid.channels() {
        let values: Vec<u8> = grid.channel_samples(channel).collect();
        let ratio = lsb_ones_ratio(&values);
        let chi = pair_chi_square(&values);
        let entropy = lsb_plane_entropy(&values);
        let runs = average_run_length(&values);
        let rate = sample_pair_rate(&values, grid.width());

        let section = Section::new(&format!("Channel {} ({})", channel, channel_name(channel)))
            .metric(
                "LSB Ones Ratio",
                format!("{:.4}", ratio),
                "Close to 0.5 once LSBs are overwritten",
                severity_lsb_ratio(ratio, config.lsb_ratio_tolerance),
            )
            .metric(
                "Pair Chi-Square",
                format!(
                    "{:.2} (df={}, p={})",
                    chi.statistic,
                    chi.degrees_of_freedom,
                    format_p_value(chi.p_value)
                ),
                interpret_pair_p_value(chi.p_value),
                severity_pair_p_value(chi.p_value, config.chi_square_threshold),
            )
            .metric(
                "LSB Plane Entropy",
                format!("{:.4}", entropy),
                "1.0 means the LSB plane looks random",
                severity_entropy(entropy, config.entropy_threshold),
            )
            .metric(
                "Avg LSB Run",
                format!("{:.3}", runs),
                "≈2 for random bits, longer in natural images",
                severity_runs(runs, config.run_length_threshold),
            )
            .metric(
                "Sample Pairs",
                format!("{:.1}%", rate * 100.0),
                "Estimated share of samples carrying data",
                severity_sample_pairs(rate, config.sample_pair_floor, config.sample_pair_threshold),
            )
            .metric(
                "Value Entropy",
                format!("{:.3} bits", channel_entropy(&values)),
                "Shannon entropy of the sample values",
                Severity::Pass,
            );
        dashboard.add_section(section);
    }

    let mut planes = Section::new("Bit Planes");
    for channel in 0..grid.channels() {
        let values: Vec<u8> = grid.channel_samples(channel).collect();
        let ratios: Vec<String> = (0..3u8)
            .map(|plane| format!("b{}:{:.3}", plane, bit_plane_ratio(&values, plane)))
            .collect();
        planes = planes.metric(
            channel_name(channel),
            ratios.join(" "),
            "Ones ratio of the three lowest bit planes",
            Severity::Pass,
        );
    }
    dashboard.add_section(planes);

    let report = analyze_image_with(grid, config);
    let channel = config.channel;
    let mut verdict = Section::new("Fused Verdict").metric(
        "Probability",
        format!("{:.1}%", report.probability),
        format!("{} channel, verdict {}", channel_name(channel), report.verdict),
        severity_verdict(report.verdict),
    );
    for indicator in &report.indicators {
        verdict = verdict.metric("Indicator", String::new(), indicator.clone(), Severity::Warn);
    }
    dashboard.add_section(verdict);

    dashboard
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Severity {
    Pass,
    Warn,
    Fail,
}

impl Severity {
    fn indicator(&self) -> &'static str {
        match self {
            Severity::Pass => "✔",
            Severity::Warn => "⚠",
            Severity::Fail => "✖",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Severity::Pass => FG_GREEN,
            Severity::Warn => FG_YELLOW,
            Severity::Fail => FG_RED,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Severity::Pass => "PASS",
            Severity::Warn => "WARN",
            Severity::Fail => "FAIL",
        };
        write!(f, "{}", text)
    }
}

fn severity_lsb_ratio(ratio: f64, tolerance: f64) -> Severity {
    let bias = (ratio - 0.5).abs();
    if bias < tolerance {
        Severity::Fail
    } else if bias < tolerance * 2.5 {
        Severity::Warn
    } else {
        Severity::Pass
    }
}

fn severity_pair_p_value(p: f64, threshold: f64) -> Severity {
    if p > 0.95 {
        Severity::Fail
    } else if p > threshold {
        Severity::Warn
    } else {
        Severity::Pass
    }
}

fn severity_entropy(entropy: f64, threshold: f64) -> Severity {
    if entropy > threshold {
        Severity::Fail
    } else if entropy > threshold - 0.1 {
        Severity::Warn
    } else {
        Severity::Pass
    }
}

fn severity_runs(runs: f64, threshold: f64) -> Severity {
    if runs < threshold {
        Severity::Fail
    } else if runs < threshold + 0.4 {
        Severity::Warn
    } else {
        Severity::Pass
    }
}

fn severity_sample_pairs(rate: f64, floor: f64, threshold: f64) -> Severity {
    if rate > threshold {
        Severity::Fail
    } else if rate > floor {
        Severity::Warn
    } else {
        Severity::Pass
    }
}

fn severity_verdict(verdict: Verdict) -> Severity {
    match verdict {
        Verdict::Clean => Severity::Pass,
        Verdict::Uncertain => Severity::Warn,
        Verdict::Suspicious | Verdict::LikelyStego => Severity::Fail,
    }
}

fn interpret_pair_p_value(p: f64) -> &'static str {
    if p > 0.95 {
        "Value pairs equalized (LSB replacement)"
    } else if p > 0.5 {
        "Pairs partly equalized"
    } else {
        "Pairs keep their natural imbalance"
    }
}

fn format_p_value(p: f64) -> String {
    if p < 0.001 {
        "< 0.001".to_string()
    } else if p > 0.999 {
        "> 0.999".to_string()
    } else {
        format!("{:.3}", p)
    }
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";

fn paint(text: &str, codes: &[&str]) -> String {
    format!("{}{}{}", codes.concat(), text, RESET)
}

struct Metric {
    label: String,
    value: String,
    note: String,
    severity: Severity,
}

struct Section {
    name: String,
    metrics: Vec<Metric>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            metrics: Vec::new(),
        }
    }

    fn metric(
        mut self,
        label: &str,
        value: String,
        note: impl Into<String>,
        severity: Severity,
    ) -> Self {
        self.metrics.push(Metric {
            label: label.to_string(),
            value,
            note: note.into(),
            severity,
        });
        self
    }

    fn severity(&self) -> Severity {
        self.metrics
            .iter()
            .map(|m| m.severity)
            .max()
            .unwrap_or(Severity::Pass)
    }
}

struct Dashboard {
    title: String,
    sections: Vec<Section>,
}

impl Dashboard {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    fn status(&self) -> Severity {
        self.sections
            .iter()
            .map(Section::severity)
            .max()
            .unwrap_or(Severity::Pass)
    }

    fn render(&self) -> String {
        const HEADERS: [&str; 4] = ["Metric", "Value", "Notes", "Status"];
        let mut widths = HEADERS.map(|h| h.chars().count());
        for metric in self.sections.iter().flat_map(|s| &s.metrics) {
            widths[0] = widths[0].max(metric.label.chars().count());
            widths[1] = widths[1].max(metric.value.chars().count());
            widths[2] = widths[2].max(metric.note.chars().count());
        }
        widths[3] = widths[3].max(6);

        let status = self.status();
        let mut output = format!(
            "{} {}\n\n",
            paint(
                &format!("{} {}", status.indicator(), self.title),
                &[status.color_code(), BOLD]
            ),
            paint(
                match status {
                    Severity::Pass => "(no embedding signals)",
                    Severity::Warn => "(weak embedding signals)",
                    Severity::Fail => "(strong embedding signals)",
                },
                &[status.color_code()]
            )
        );

        let rule = rule(&widths);
        output.push_str(&rule);
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            pad(HEADERS[0], widths[0]),
            pad(HEADERS[1], widths[1]),
            pad(HEADERS[2], widths[2]),
            pad(HEADERS[3], widths[3])
        ));
        output.push_str(&rule);
        for section in &self.sections {
            output.push_str(&format!("| {} |\n", pad(&section.name, rule.chars().count() - 5)));
            output.push_str(&rule);
            for metric in &section.metrics {
                let status = format!("{} {}", metric.severity.indicator(), metric.severity);
                output.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    pad(&metric.label, widths[0]),
                    pad(&metric.value, widths[1]),
                    pad(&metric.note, widths[2]),
                    paint(&pad(&status, widths[3]), &[metric.severity.color_code()])
                ));
            }
            output.push_str(&rule);
        }
        output
    }
}

fn rule(widths: &[usize; 4]) -> String {
    let mut line = String::from("+");
    for &w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelveil::io::save_grid;
    use tempfile::tempdir;

    #[test]
    fn test_dashboard_lists_every_channel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover.png");
        save_grid(&SampleGrid::gradient(32, 32).unwrap(), &path).unwrap();

        let output = run(&path, &StatsOptions::default()).unwrap();
        assert!(output.contains("Steganalyst LSB Analysis"));
        assert!(output.contains("Channel 0 (red)"));
        assert!(output.contains("Channel 2 (blue)"));
        assert!(output.contains("Bit Planes"));
        assert!(output.contains("Fused Verdict"));
        assert!(output.contains("Sample Pairs"));
    }

    #[test]
    fn test_channel_out_of_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover.png");
        save_grid(&SampleGrid::gradient(8, 8).unwrap(), &path).unwrap();
        let options = StatsOptions {
            channel: Some(5),
            ..Default::default()
        };
        assert!(run(&path, &options).is_err());

        let config = dir.path().join("detector.json");
        std::fs::write(&config, r#"{ "channel": 4 }"#).unwrap();
        let options = StatsOptions {
            config: Some(config),
            ..Default::default()
        };
        assert!(run(&path, &options).is_err());
    }

    #[test]
    fn test_severity_thresholds() {
        assert!(severity_lsb_ratio(0.5, 0.02) == Severity::Fail);
        assert!(severity_lsb_ratio(0.1, 0.02) == Severity::Pass);
        assert!(severity_runs(1.9, 2.2) == Severity::Fail);
        assert!(severity_runs(8.0, 2.2) == Severity::Pass);
        assert!(severity_sample_pairs(0.0, 0.05, 0.1) == Severity::Pass);
        assert!(severity_sample_pairs(0.07, 0.05, 0.1) == Severity::Warn);
        assert!(severity_sample_pairs(0.8, 0.05, 0.1) == Severity::Fail);
        assert!(severity_verdict(Verdict::Uncertain) == Severity::Warn);
    }

    #[test]
    fn test_pad_counts_characters() {
        assert_eq!(pad("≈2", 4), "≈2  ");
    }
}
