//! Pixelveil - LSB image steganography
//!
//! Hides a byte payload in the low bits of one color channel of a lossless
//! image, measures how much the carrier changed, estimates whether an image
//! carries hidden data, and splits a payload across several carriers.
//!
//! ## Frame layout
//!
//! ```text
//! [bit count: u32 big-endian][payload bits] → low bits of channel C, pixel by pixel
//! ```
//!
//! - **codec**: embed / extract / capacity at 1, 2 or 3 bits per sample
//! - **quality**: MSE, PSNR and SSIM between a cover and its stego version
//! - **detect**: blind LSB steganalysis and zero-width text detection
//! - **split**: N-of-N XOR shares, one per carrier
//! - **crypto**: optional password encryption of the payload bytes
//!
//! ## Example
//!
//! ```
//! use pixelveil::{embed, extract, EncodingParams, SampleGrid};
//!
//! let cover = SampleGrid::gradient(64, 64).unwrap();
//! let params = EncodingParams::new(2, 2);
//! let stego = embed(&cover, b"meet at noon", &params).unwrap();
//! assert_eq!(extract(&stego, &params).unwrap(), b"meet at noon");
//! ```

pub mod bitstream;
pub mod capacity;
pub mod cli;
pub mod codec;
pub mod crypto;
pub mod detect;
pub mod error;
pub mod grid;
pub mod io;
pub mod params;
pub mod quality;
pub mod split;

pub use capacity::{capacity_info, plan_embed, CapacityInfo, EmbedSummary};
pub use codec::{capacity, embed, extract};
pub use detect::{
    analyze_image, analyze_image_with, analyze_text, DetectionReport, DetectorConfig, Verdict,
};
pub use error::{Result, StegError};
pub use grid::SampleGrid;
pub use params::{Density, EncodingParams};
pub use quality::{compare, QualityReport, QualityTier};
pub use split::{combine, split, SecretShare};
