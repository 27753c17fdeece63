use crate::error::{Result, StegError};
use crate::grid::SampleGrid;
use crate::io::save_grid;
use std::path::Path;

/// Parse "WIDTHxHEIGHT", e.g. "640x480".
pub fn parse_dimensions(s: &str) -> Result<(usize, usize)> {
    let invalid = || StegError::InvalidGrid(format!("expected WIDTHxHEIGHT, got {:?}", s));
    let lower = s.to_lowercase();
    let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
    let width: usize = w.trim().parse().map_err(|_| invalid())?;
    let height: usize = h.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

/// Write a synthetic gradient carrier. Returns its capacity in pixels.
pub fn generate_carrier(dimensions: &str, output_path: &Path) -> Result<usize> {
    let (width, height) = parse_dimensions(dimensions)?;
    let grid = SampleGrid::gradient(width, height)?;
    save_grid(&grid, output_path)?;
    Ok(grid.pixel_count())
}
