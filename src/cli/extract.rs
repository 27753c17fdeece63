use crate::codec::extract;
use crate::crypto::open;
use crate::error::Result;
use crate::io::load_grid;
use crate::params::EncodingParams;
use std::path::Path;

/// Recover the payload of a stego image, decrypting it when a password is
/// given.
pub fn extract_payload(
    stego_path: &Path,
    params: &EncodingParams,
    password: Option<&str>,
) -> Result<Vec<u8>> {
    let grid = load_grid(stego_path)?;
    open(extract(&grid, params)?, password)
}

/// Recover the payload and write it to `output_path`.
/// Returns the number of bytes written.
pub fn extract_to_file(
    stego_path: &Path,
    output_path: &Path,
    params: &EncodingParams,
    password: Option<&str>,
) -> Result<usize> {
    let payload = extract_payload(stego_path, params, password)?;
    std::fs::write(output_path, &payload)?;
    Ok(payload.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::embed::embed_file;
    use crate::error::StegError;
    use crate::grid::SampleGrid;
    use crate::io::save_grid;
    use tempfile::tempdir;

    #[test]
    fn test_extract_roundtrip() {
        let dir = tempdir().unwrap();
        let cover_path = dir.path().join("cover.png");
        let stego_path = dir.path().join("stego.png");
        let output_path = dir.path().join("recovered.bin");
        save_grid(&SampleGrid::gradient(40, 40).unwrap(), &cover_path).unwrap();

        let params = EncodingParams::new(3, 0);
        let original = b"Hello, World! This is a test.";
        embed_file(&cover_path, original, &stego_path, &params, None).unwrap();

        let written = extract_to_file(&stego_path, &output_path, &params, None).unwrap();
        assert_eq!(written, original.len());
        assert_eq!(std::fs::read(&output_path).unwrap(), original.to_vec());
    }

    #[test]
    fn test_extract_wrong_params() {
        let dir = tempdir().unwrap();
        let cover_path = dir.path().join("cover.png");
        // every LSB set: the header claims far more bits than exist
        save_grid(&SampleGrid::filled(16, 16, 3, 0xFF).unwrap(), &cover_path).unwrap();
        assert!(matches!(
            extract_payload(&cover_path, &EncodingParams::default(), None),
            Err(StegError::TruncatedCarrier { .. })
        ));
    }

    #[test]
    fn test_extract_with_password() {
        let dir = tempdir().unwrap();
        let cover_path = dir.path().join("cover.png");
        let stego_path = dir.path().join("stego.png");
        let output_path = dir.path().join("recovered.bin");
        save_grid(&SampleGrid::gradient(48, 48).unwrap(), &cover_path).unwrap();

        let params = EncodingParams::new(2, 1);
        embed_file(&cover_path, b"sealed note", &stego_path, &params, Some("s3cret")).unwrap();

        assert_eq!(
            extract_payload(&stego_path, &params, Some("s3cret")).unwrap(),
            b"sealed note".to_vec()
        );
        assert!(matches!(
            extract_to_file(&stego_path, &output_path, &params, Some("guess")),
            Err(StegError::WrongPassword)
        ));
        assert!(!output_path.exists());
    }
}
