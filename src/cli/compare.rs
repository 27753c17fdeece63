use crate::error::Result;
use crate::io::load_grid;
use crate::quality::{compare, QualityReport};
use std::path::Path;

pub fn compare_files(original: &Path, modified: &Path) -> Result<QualityReport> {
    let a = load_grid(original)?;
    let b = load_grid(modified)?;
    compare(&a, &b)
}

pub fn show_comparison(original: &Path, modified: &Path, json: bool) -> Result<String> {
    let report = compare_files(original, modified)?;
    if json {
        return Ok(serde_json::to_string_pretty(&report)? + "\n");
    }

    let psnr = if report.psnr.is_infinite() {
        "inf".to_string()
    } else {
        format!("{:.2} dB", report.psnr)
    };

    let mut output = String::new();
    output.push_str("Image Quality Comparison\n");
    output.push_str("========================\n\n");
    output.push_str(&format!("Original: {}\n", original.display()));
    output.push_str(&format!("Modified: {}\n\n", modified.display()));

    output.push_str("Metrics:\n");
    output.push_str(&format!(
        "  MSE:  {:.4}  {}\n",
        report.mse, report.details.mse_interpretation
    ));
    output.push_str(&format!(
        "  PSNR: {}  {}\n",
        psnr, report.details.psnr_interpretation
    ));
    output.push_str(&format!(
        "  SSIM: {:.4}  {}\n\n",
        report.ssim, report.details.ssim_interpretation
    ));

    output.push_str("Differences:\n");
    output.push_str(&format!(
        "  Samples changed: {} of {} ({:.2}%)\n",
        report.diff.samples_changed, report.diff.total_samples, report.diff.change_percentage
    ));
    output.push_str(&format!("  Max difference: {}\n\n", report.diff.max_difference));

    output.push_str(&format!(
        "Assessment: {}{}\n",
        report.assessment,
        if report.imperceptible {
            " (imperceptible)"
        } else {
            ""
        }
    ));
    for rec in &report.recommendations {
        output.push_str(&format!("  - {}\n", rec));
    }
    Ok(output)
}
