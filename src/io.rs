//! Image file adapter between the `image` crate and [`SampleGrid`].
//!
//! Carriers are read as RGB8, or RGBA8 when the file has an alpha channel.
//! Output is restricted to lossless formats: a lossy encoder would destroy the
//! low bits the codec writes.

use crate::error::{Result, StegError};
use crate::grid::SampleGrid;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use std::path::Path;
use tracing::{debug, warn};

/// Formats a stego image may be written in.
pub const LOSSLESS_FORMATS: [ImageFormat; 3] =
    [ImageFormat::Png, ImageFormat::Bmp, ImageFormat::Tiff];

/// Decode an image file into a sample grid.
pub fn load_grid(path: &Path) -> Result<SampleGrid> {
    let format = ImageFormat::from_path(path).ok();
    if format == Some(ImageFormat::Jpeg) {
        warn!(
            path = %path.display(),
            "loading a JPEG carrier; any payload it held was lost to lossy compression"
        );
    }
    let image = image::open(path).map_err(|e| StegError::Image(e.to_string()))?;
    let grid = grid_from_image(&image)?;
    debug!(path = %path.display(), shape = %grid.shape(), "image loaded");
    Ok(grid)
}

/// Decode an in-memory image.
pub fn load_grid_from_memory(bytes: &[u8]) -> Result<SampleGrid> {
    let image = image::load_from_memory(bytes).map_err(|e| StegError::Image(e.to_string()))?;
    grid_from_image(&image)
}

pub fn grid_from_image(image: &DynamicImage) -> Result<SampleGrid> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    if image.color().has_alpha() {
        SampleGrid::new(width, height, 4, image.to_rgba8().into_raw())
    } else {
        SampleGrid::new(width, height, 3, image.to_rgb8().into_raw())
    }
}

pub fn grid_to_image(grid: &SampleGrid) -> Result<DynamicImage> {
    let width = dimension(grid.width())?;
    let height = dimension(grid.height())?;
    let samples = grid.samples().to_vec();
    let image = match grid.channels() {
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(width, height, samples).map(DynamicImage::ImageRgba8),
        n => {
            return Err(StegError::InvalidGrid(format!(
                "cannot encode a {}-channel grid as an image",
                n
            )))
        }
    };
    image.ok_or_else(|| {
        StegError::InvalidGrid(format!("sample buffer does not match {}", grid.shape()))
    })
}

fn dimension(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| StegError::InvalidGrid(format!("dimension {} too large", value)))
}

/// Lossless output format for `path`, chosen by extension.
pub fn output_format(path: &Path) -> Result<ImageFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ImageFormat::from_extension(&extension) {
        Some(format) if LOSSLESS_FORMATS.contains(&format) => Ok(format),
        _ => Err(StegError::UnsupportedFormat(if extension.is_empty() {
            "(no extension)".to_string()
        } else {
            extension
        })),
    }
}

/// Encode `grid` to `path`. Only PNG, BMP and TIFF are accepted.
pub fn save_grid(grid: &SampleGrid, path: &Path) -> Result<()> {
    let format = output_format(path)?;
    let image = grid_to_image(grid)?;
    image
        .save_with_format(path, format)
        .map_err(|e| StegError::Image(e.to_string()))?;
    debug!(path = %path.display(), ?format, "image saved");
    Ok(())
}

/// Encode `grid` as PNG bytes.
pub fn encode_png(grid: &SampleGrid) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    grid_to_image(grid)?
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| StegError::Image(e.to_string()))?;
    Ok(bytes)
}
