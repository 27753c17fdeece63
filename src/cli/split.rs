use crate::crypto::{open, seal};
use crate::error::{Result, StegError};
use crate::grid::SampleGrid;
use crate::io::{load_grid, save_grid};
use crate::params::EncodingParams;
use crate::split::{check_part_count, embed_shares, recover};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Written next to the share images by [`split_file`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitManifest {
    pub parts: usize,
    pub payload_bytes: usize,
    pub params: EncodingParams,
    /// The payload was encrypted before splitting
    #[serde(default)]
    pub encrypted: bool,
    pub shares: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub index: usize,
    /// File name relative to the manifest
    pub file: String,
    /// SHA-256 of the stego samples, hex encoded
    pub sha256: String,
}

/// Options for the split command
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    pub params: EncodingParams,
    /// Reuse a single carrier this many times
    pub parts: Option<usize>,
    /// Encrypt the payload before splitting it
    pub password: Option<String>,
}

/// SHA-256 of a grid's samples.
pub fn fingerprint(grid: &SampleGrid) -> String {
    hex::encode(Sha256::digest(grid.samples()))
}

/// Split `payload` across the carriers, writing `share_<i>.png` images and a
/// manifest into `output_dir`.
pub fn split_file(
    payload: &[u8],
    carriers: &[PathBuf],
    output_dir: &Path,
    options: &SplitOptions,
) -> Result<SplitManifest> {
    let grids = load_carriers(carriers, options.parts)?;
    let mut rng = rand::thread_rng();
    let sealed = seal(payload, options.password.as_deref(), &mut rng)?;
    let stego = embed_shares(&sealed, &grids, &options.params, &mut rng)?;

    std::fs::create_dir_all(output_dir)?;
    let mut shares = Vec::with_capacity(stego.len());
    for (index, grid) in stego.iter().enumerate() {
        let file = format!("share_{}.png", index);
        save_grid(grid, &output_dir.join(&file))?;
        shares.push(ManifestEntry {
            index,
            file,
            sha256: fingerprint(grid),
        });
    }

    let manifest = SplitManifest {
        parts: stego.len(),
        payload_bytes: payload.len(),
        params: options.params,
        encrypted: options.password.is_some(),
        shares,
    };
    std::fs::write(
        output_dir.join(MANIFEST_FILE),
        serde_json::to_string_pretty(&manifest)?,
    )?;
    info!(parts = manifest.parts, dir = %output_dir.display(), "shares written");
    Ok(manifest)
}

fn load_carriers(carriers: &[PathBuf], parts: Option<usize>) -> Result<Vec<SampleGrid>> {
    match (carriers, parts) {
        ([single], Some(n)) => {
            check_part_count(n)?;
            let grid = load_grid(single)?;
            Ok(vec![grid; n])
        }
        (_, Some(n)) if n != carriers.len() => Err(StegError::InvalidParameters(format!(
            "{} parts requested for {} carriers; give one carrier or one per part",
            n,
            carriers.len()
        ))),
        _ => carriers.iter().map(|path| load_grid(path)).collect(),
    }
}

/// Recover a payload from the shares listed in a manifest. Shares whose
/// fingerprint changed are still used, but logged.
pub fn combine_from_manifest(manifest_path: &Path, password: Option<&str>) -> Result<Vec<u8>> {
    let manifest: SplitManifest =
        serde_json::from_str(&std::fs::read_to_string(manifest_path)?)?;
    if manifest.encrypted && password.is_none() {
        return Err(StegError::InvalidParameters(
            "the shares are encrypted; a password is required".into(),
        ));
    }
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let mut grids = Vec::with_capacity(manifest.shares.len());
    for entry in &manifest.shares {
        let grid = load_grid(&base.join(&entry.file))?;
        if fingerprint(&grid) != entry.sha256 {
            warn!(
                file = %entry.file,
                index = entry.index,
                "share image differs from the one recorded in the manifest"
            );
        }
        grids.push(grid);
    }
    open(recover(&grids, &manifest.params)?, password)
}

/// Recover a payload from share images given directly.
pub fn combine_images(
    paths: &[PathBuf],
    params: &EncodingParams,
    password: Option<&str>,
) -> Result<Vec<u8>> {
    let grids = paths
        .iter()
        .map(|path| load_grid(path))
        .collect::<Result<Vec<_>>>()?;
    open(recover(&grids, params)?, password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_carrier(dir: &Path, name: &str, size: usize) -> PathBuf {
        let path = dir.join(name);
        save_grid(&SampleGrid::gradient(size, size).unwrap(), &path).unwrap();
        path
    }

    #[test]
    fn test_split_and_combine_via_manifest() {
        let dir = tempdir().unwrap();
        let carriers: Vec<PathBuf> = (0..3)
            .map(|i| write_carrier(dir.path(), &format!("cover{}.png", i), 32))
            .collect();
        let out = dir.path().join("shares");

        let manifest =
            split_file(b"split me please", &carriers, &out, &SplitOptions::default()).unwrap();
        assert_eq!(manifest.parts, 3);
        assert!(out.join(MANIFEST_FILE).exists());
        assert!(out.join("share_2.png").exists());

        let payload = combine_from_manifest(&out.join(MANIFEST_FILE), None).unwrap();
        assert_eq!(payload, b"split me please".to_vec());
    }

    #[test]
    fn test_single_carrier_reused() {
        let dir = tempdir().unwrap();
        let carrier = write_carrier(dir.path(), "cover.png", 24);
        let out = dir.path().join("shares");
        let options = SplitOptions {
            parts: Some(4),
            ..Default::default()
        };
        let manifest = split_file(b"four ways", &[carrier], &out, &options).unwrap();
        assert_eq!(manifest.shares.len(), 4);

        let paths: Vec<PathBuf> = manifest.shares.iter().map(|s| out.join(&s.file)).collect();
        assert_eq!(
            combine_images(&paths, &options.params, None).unwrap(),
            b"four ways".to_vec()
        );
        assert!(matches!(
            combine_images(&paths[..3], &options.params, None),
            Err(StegError::IncompleteShareSet { .. })
        ));
    }

    #[test]
    fn test_encrypted_split_needs_password() {
        let dir = tempdir().unwrap();
        let carriers: Vec<PathBuf> = (0..2)
            .map(|i| write_carrier(dir.path(), &format!("c{}.png", i), 32))
            .collect();
        let out = dir.path().join("shares");
        let options = SplitOptions {
            password: Some("open sesame".into()),
            ..Default::default()
        };
        let manifest = split_file(b"two halves", &carriers, &out, &options).unwrap();
        assert!(manifest.encrypted);
        assert_eq!(manifest.payload_bytes, 10);

        let manifest_path = out.join(MANIFEST_FILE);
        assert_eq!(
            combine_from_manifest(&manifest_path, Some("open sesame")).unwrap(),
            b"two halves".to_vec()
        );
        assert!(matches!(
            combine_from_manifest(&manifest_path, None),
            Err(StegError::InvalidParameters(_))
        ));
        assert!(matches!(
            combine_from_manifest(&manifest_path, Some("close sesame")),
            Err(StegError::WrongPassword)
        ));

        let paths: Vec<PathBuf> = manifest.shares.iter().map(|s| out.join(&s.file)).collect();
        assert!(matches!(
            combine_images(&paths, &options.params, Some("wrong")),
            Err(StegError::WrongPassword)
        ));
    }

    #[test]
    fn test_parts_mismatch() {
        let dir = tempdir().unwrap();
        let a = write_carrier(dir.path(), "a.png", 16);
        let b = write_carrier(dir.path(), "b.png", 16);
        let options = SplitOptions {
            parts: Some(3),
            ..Default::default()
        };
        assert!(matches!(
            split_file(b"x", &[a, b], &dir.path().join("out"), &options),
            Err(StegError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_reused_carrier_part_count_checked_before_cloning() {
        let dir = tempdir().unwrap();
        let carrier = write_carrier(dir.path(), "cover.png", 16);
        let out = dir.path().join("out");
        for parts in [1, 11, 1_000_000] {
            let options = SplitOptions {
                parts: Some(parts),
                ..Default::default()
            };
            match split_file(b"x", &[carrier.clone()], &out, &options) {
                Err(StegError::InvalidPartCount(n)) => assert_eq!(n, parts),
                other => panic!("expected InvalidPartCount, got {:?}", other),
            }
        }
        assert!(!out.exists());
    }

    #[test]
    fn test_tampered_share_still_combines_when_bits_survive() {
        let dir = tempdir().unwrap();
        let carriers: Vec<PathBuf> = (0..2)
            .map(|i| write_carrier(dir.path(), &format!("c{}.png", i), 32))
            .collect();
        let out = dir.path().join("shares");
        let manifest = split_file(b"fingerprints", &carriers, &out, &SplitOptions::default())
            .unwrap();

        // flip a high bit of the last pixel's red sample; payload bits are untouched
        let share_path = out.join(&manifest.shares[0].file);
        let grid = load_grid(&share_path).unwrap();
        let mut samples = grid.clone().into_samples();
        let last = samples.len() - 3;
        samples[last] ^= 0x80;
        let tampered = SampleGrid::new(grid.width(), grid.height(), 3, samples).unwrap();
        save_grid(&tampered, &share_path).unwrap();
        assert_ne!(fingerprint(&tampered), manifest.shares[0].sha256);

        let payload = combine_from_manifest(&out.join(MANIFEST_FILE), None).unwrap();
        assert_eq!(payload, b"fingerprints".to_vec());
    }
}
