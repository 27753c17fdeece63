//! N-of-N XOR secret splitting across several carriers.
//!
//! `n - 1` fragments are drawn from a caller-supplied CSPRNG and the last is
//! the payload XOR all of them. Every share is needed to recover the payload;
//! any proper subset is indistinguishable from random bytes.
//!
//! When embedded, each fragment is prefixed with its index and the share
//! count (one byte each) so that missing or repeated carriers are reported
//! instead of silently producing garbage.

use crate::codec::{capacity, carrier_bits, embed, extract, framed_bits};
use crate::error::{Result, StegError};
use crate::grid::SampleGrid;
use crate::params::EncodingParams;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MIN_PARTS: usize = 2;
pub const MAX_PARTS: usize = 10;

/// Bytes of framing in front of an embedded fragment.
pub const SHARE_PREFIX_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretShare {
    pub index: usize,
    pub total: usize,
    pub fragment: Vec<u8>,
}

impl SecretShare {
    /// `[index][total][fragment...]`
    ///
    /// Hand-built shares are checked against the same bounds `from_bytes`
    /// enforces, so the one-byte prefix never truncates.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        check_part_count(self.total)?;
        let (Ok(index), Ok(total)) = (u8::try_from(self.index), u8::try_from(self.total)) else {
            return Err(StegError::InvalidPartCount(self.total));
        };
        if self.index >= self.total {
            return Err(StegError::InvalidParameters(format!(
                "share index {} out of range for {} shares",
                self.index, self.total
            )));
        }
        let mut out = Vec::with_capacity(SHARE_PREFIX_LEN + self.fragment.len());
        out.push(index);
        out.push(total);
        out.extend_from_slice(&self.fragment);
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < SHARE_PREFIX_LEN {
            return Err(StegError::InvalidParameters(format!(
                "share frame needs at least {} bytes, got {}",
                SHARE_PREFIX_LEN,
                bytes.len()
            )));
        }
        let index = bytes[0] as usize;
        let total = bytes[1] as usize;
        check_part_count(total)?;
        if index >= total {
            return Err(StegError::InvalidParameters(format!(
                "share index {} out of range for {} shares",
                index, total
            )));
        }
        Ok(Self {
            index,
            total,
            fragment: bytes[SHARE_PREFIX_LEN..].to_vec(),
        })
    }
}

/// Reject share counts outside `MIN_PARTS..=MAX_PARTS`.
pub fn check_part_count(n: usize) -> Result<()> {
    if !(MIN_PARTS..=MAX_PARTS).contains(&n) {
        return Err(StegError::InvalidPartCount(n));
    }
    Ok(())
}

/// Split `payload` into `n` XOR shares.
pub fn split<R: RngCore + CryptoRng>(
    payload: &[u8],
    n: usize,
    rng: &mut R,
) -> Result<Vec<SecretShare>> {
    check_part_count(n)?;

    let mut last = payload.to_vec();
    let mut shares = Vec::with_capacity(n);
    for index in 0..n - 1 {
        let mut fragment = vec![0u8; payload.len()];
        rng.fill_bytes(&mut fragment);
        for (acc, byte) in last.iter_mut().zip(&fragment) {
            *acc ^= byte;
        }
        shares.push(SecretShare {
            index,
            total: n,
            fragment,
        });
    }
    shares.push(SecretShare {
        index: n - 1,
        total: n,
        fragment: last,
    });

    debug!(parts = n, payload_bytes = payload.len(), "payload split");
    Ok(shares)
}

/// XOR a complete share set back into the payload. Order does not matter.
pub fn combine(shares: &[SecretShare]) -> Result<Vec<u8>> {
    let Some(first) = shares.first() else {
        return Err(StegError::IncompleteShareSet {
            expected: 0,
            present: 0,
            missing: Vec::new(),
        });
    };
    let total = first.total;
    check_part_count(total)?;

    let mut seen = vec![false; total];
    for share in shares {
        if share.total != total || share.index >= total {
            return Err(StegError::IncompleteShareSet {
                expected: total,
                present: shares.len(),
                missing: Vec::new(),
            });
        }
        if seen[share.index] {
            return Err(StegError::DuplicateShare(share.index));
        }
        seen[share.index] = true;
    }
    let missing: Vec<usize> = (0..total).filter(|&i| !seen[i]).collect();
    if !missing.is_empty() {
        return Err(StegError::IncompleteShareSet {
            expected: total,
            present: shares.len(),
            missing,
        });
    }

    let len = first.fragment.len();
    let mut payload = vec![0u8; len];
    for share in shares {
        if share.fragment.len() != len {
            return Err(StegError::LengthMismatch {
                index: share.index,
                expected: len,
                actual: share.fragment.len(),
            });
        }
        for (acc, byte) in payload.iter_mut().zip(&share.fragment) {
            *acc ^= byte;
        }
    }

    debug!(parts = total, payload_bytes = len, "shares combined");
    Ok(payload)
}

/// Split `payload` into one share per carrier and embed each share.
///
/// Fails before touching any carrier when one of them is too small.
pub fn embed_shares<R: RngCore + CryptoRng>(
    payload: &[u8],
    carriers: &[SampleGrid],
    params: &EncodingParams,
    rng: &mut R,
) -> Result<Vec<SampleGrid>> {
    check_part_count(carriers.len())?;
    let framed_len = SHARE_PREFIX_LEN + payload.len();
    for carrier in carriers {
        params.validate(carrier)?;
        let available = capacity(carrier, params);
        if framed_len > available {
            return Err(StegError::CapacityExceeded {
                needed_bits: framed_bits(framed_len),
                available_bits: carrier_bits(carrier, params),
            });
        }
    }

    let shares = split(payload, carriers.len(), rng)?;
    shares
        .iter()
        .zip(carriers)
        .map(|(share, carrier)| embed(carrier, &share.to_bytes()?, params))
        .collect()
}

pub fn extract_share(grid: &SampleGrid, params: &EncodingParams) -> Result<SecretShare> {
    SecretShare::from_bytes(&extract(grid, params)?)
}

pub fn extract_shares(grids: &[SampleGrid], params: &EncodingParams) -> Result<Vec<SecretShare>> {
    grids.iter().map(|grid| extract_share(grid, params)).collect()
}

/// Extract every share and combine them.
pub fn recover(grids: &[SampleGrid], params: &EncodingParams) -> Result<Vec<u8>> {
    combine(&extract_shares(grids, params)?)
}
