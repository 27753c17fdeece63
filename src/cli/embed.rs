use crate::capacity::{plan_embed, EmbedSummary};
use crate::codec::embed;
use crate::crypto::seal;
use crate::error::Result;
use crate::io::{load_grid, output_format, save_grid};
use crate::params::EncodingParams;
use std::path::Path;

/// Hide `payload` in the carrier at `cover_path` and write the stego image to
/// `output_path`. With a password the payload is encrypted first and the
/// summary counts the encrypted bytes.
pub fn embed_file(
    cover_path: &Path,
    payload: &[u8],
    output_path: &Path,
    params: &EncodingParams,
    password: Option<&str>,
) -> Result<EmbedSummary> {
    // fail on a lossy output path before doing any work
    output_format(output_path)?;

    let cover = load_grid(cover_path)?;
    let payload = seal(payload, password, &mut rand::thread_rng())?;
    let summary = plan_embed(&cover, payload.len(), params)?;
    let stego = embed(&cover, &payload, params)?;
    save_grid(&stego, output_path)?;
    Ok(summary)
}

/// Human-readable report of an embed.
pub fn format_embed_summary(summary: &EmbedSummary, output_path: &Path) -> String {
    let mut output = String::new();
    output.push_str(&format!("Embedded into {}\n", output_path.display()));
    output.push_str(&format!(
        "  Payload: {} bytes ({} bits + {} header bits)\n",
        summary.payload_bytes, summary.payload_bits, summary.header_bits
    ));
    output.push_str(&format!(
        "  Density: {} bit(s) per sample in the {} channel\n",
        summary.bits_per_sample, summary.channel_name
    ));
    output.push_str(&format!("  Pixels modified: {}\n", summary.pixels_modified));
    output.push_str(&format!(
        "  Capacity used: {:.1}% ({} bytes headroom)\n",
        summary.capacity_used_percent,
        summary.headroom_bytes()
    ));
    output
}
