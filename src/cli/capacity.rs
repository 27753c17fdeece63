use crate::capacity::{capacity_info, CapacityInfo};
use crate::error::Result;
use crate::io::load_grid;
use crate::params::{EncodingParams, MAX_BITS_PER_SAMPLE, MIN_BITS_PER_SAMPLE};
use std::path::Path;

/// Capacity of a carrier at every density for one channel.
pub fn capacity_table(path: &Path, channel: usize) -> Result<Vec<CapacityInfo>> {
    let grid = load_grid(path)?;
    (MIN_BITS_PER_SAMPLE..=MAX_BITS_PER_SAMPLE)
        .map(|bps| capacity_info(&grid, &EncodingParams::new(bps, channel)))
        .collect()
}

pub fn show_capacity(path: &Path, channel: usize, json: bool) -> Result<String> {
    let table = capacity_table(path, channel)?;
    if json {
        return Ok(serde_json::to_string_pretty(&table)? + "\n");
    }

    let mut output = String::new();
    output.push_str("Carrier Capacity\n");
    output.push_str("================\n\n");
    output.push_str(&format!("File: {}\n", path.display()));
    if let Some(first) = table.first() {
        output.push_str(&format!(
            "Dimensions: {}x{} ({} pixels)\n",
            first.width, first.height, first.total_pixels
        ));
    }
    output.push_str(&format!("Channel: {}\n\n", channel));

    for info in &table {
        output.push_str(&format!(
            "  {} bit(s)/sample: {:>10} bytes ({} usable bits)\n",
            info.bits_per_sample,
            info.max_bytes,
            info.usable_bits
        ));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SampleGrid;
    use crate::io::save_grid;
    use tempfile::tempdir;

    #[test]
    fn test_show_capacity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover.png");
        save_grid(&SampleGrid::gradient(100, 100).unwrap(), &path).unwrap();

        let table = capacity_table(&path, 2).unwrap();
        let bytes: Vec<usize> = table.iter().map(|i| i.max_bytes).collect();
        assert_eq!(bytes, vec![1246, 2496, 3746]);

        let text = show_capacity(&path, 2, false).unwrap();
        assert!(text.contains("Carrier Capacity"));
        assert!(text.contains("100x100"));

        let json: serde_json::Value =
            serde_json::from_str(&show_capacity(&path, 2, true).unwrap()).unwrap();
        assert_eq!(json[2]["max_bytes"], 3746);
    }
}
