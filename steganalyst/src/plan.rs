use anyhow::Result;
use pixelveil::capacity::{minimum_density, plan_embed};
use pixelveil::io::load_grid;
use pixelveil::params::{EncodingParams, MAX_BITS_PER_SAMPLE, MIN_BITS_PER_SAMPLE};
use std::path::Path;

/// Show how a payload file would fit into a carrier at every density.
pub fn plan_file(carrier: &Path, payload: &Path, channel: usize) -> Result<String> {
    let grid = load_grid(carrier)?;
    let payload_len = std::fs::metadata(payload)?.len() as usize;

    let mut output = String::new();
    output.push_str("Steganalyst Embed Planner\n");
    output.push_str("=========================\n\n");
    output.push_str(&format!("Carrier: {} ({})\n", carrier.display(), grid.shape()));
    output.push_str(&format!(
        "Payload: {} ({})\n\n",
        payload.display(),
        format_size(payload_len as u64)
    ));

    for bps in MIN_BITS_PER_SAMPLE..=MAX_BITS_PER_SAMPLE {
        let plan = plan_embed(&grid, payload_len, &EncodingParams::new(bps, channel))?;
        output.push_str(&format!(
            "{} bit(s)/sample in {}: {} bits over {} pixels, capacity {}, {}\n",
            bps,
            plan.channel_name,
            plan.total_bits,
            plan.pixels_modified,
            format_size(plan.capacity_bytes as u64),
            if plan.fits() {
                format!(
                    "{:.1}% used, {} headroom",
                    plan.capacity_used_percent,
                    format_size(plan.headroom_bytes() as u64)
                )
            } else {
                "does not fit".to_string()
            }
        ));
    }

    match minimum_density(&grid, payload_len, channel) {
        Ok(bps) => output.push_str(&format!("\nRecommended: {} bit(s) per sample\n", bps)),
        Err(_) => output.push_str("\nPayload does not fit at any density; use a larger carrier\n"),
    }
    Ok(output)
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
