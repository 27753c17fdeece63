//! Optional password protection for payloads.
//!
//! Encryption wraps the payload bytes before they reach the codec, so the
//! frame format does not change: the codec simply carries a longer payload.
//!
//! ```text
//! [salt: 16][nonce: 12][ChaCha20-Poly1305 ciphertext + 16-byte tag]
//! ```
//!
//! The key is derived with HKDF-SHA256 from the password and the per-payload
//! salt. A wrong password and a damaged payload both fail tag verification
//! and are reported as [`StegError::WrongPassword`].

use crate::error::{Result, StegError};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use hkdf::Hkdf;
use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use tracing::debug;

const KDF_INFO: &[u8] = b"pixelveil payload key v1";

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Bytes an encrypted payload adds to the plaintext.
pub const OVERHEAD: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

fn derive_key(password: &str, salt: &[u8]) -> Result<ChaCha20Poly1305> {
    if password.is_empty() {
        return Err(StegError::InvalidParameters(
            "password must not be empty".into(),
        ));
    }
    let hk = Hkdf::<Sha256>::new(Some(salt), password.as_bytes());
    let mut key = [0u8; 32];
    hk.expand(KDF_INFO, &mut key)
        .map_err(|e| StegError::Encryption(e.to_string()))?;
    ChaCha20Poly1305::new_from_slice(&key).map_err(|e| StegError::Encryption(e.to_string()))
}

/// Encrypt `plaintext` under `password` with a fresh salt and nonce from
/// `rng`.
pub fn encrypt_payload<R: RngCore + CryptoRng>(
    plaintext: &[u8],
    password: &str,
    rng: &mut R,
) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce);

    let cipher = derive_key(password, &salt)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| StegError::Encryption(e.to_string()))?;

    let mut sealed = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&salt);
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    debug!(plaintext_bytes = plaintext.len(), sealed_bytes = sealed.len(), "payload encrypted");
    Ok(sealed)
}

/// Reverse [`encrypt_payload`].
pub fn decrypt_payload(sealed: &[u8], password: &str) -> Result<Vec<u8>> {
    if sealed.len() < OVERHEAD {
        return Err(StegError::EncryptedPayloadTooShort {
            minimum: OVERHEAD,
            actual: sealed.len(),
        });
    }
    let (salt, rest) = sealed.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let cipher = derive_key(password, salt)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| StegError::WrongPassword)?;
    debug!(plaintext_bytes = plaintext.len(), "payload decrypted");
    Ok(plaintext)
}

/// Encrypt when a password is given, otherwise pass the payload through.
pub fn seal<R: RngCore + CryptoRng>(
    payload: &[u8],
    password: Option<&str>,
    rng: &mut R,
) -> Result<Vec<u8>> {
    match password {
        Some(password) => encrypt_payload(payload, password, rng),
        None => Ok(payload.to_vec()),
    }
}

/// Decrypt when a password is given, otherwise pass the payload through.
pub fn open(payload: Vec<u8>, password: Option<&str>) -> Result<Vec<u8>> {
    match password {
        Some(password) => decrypt_payload(&payload, password),
        None => Ok(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let mut rng = StdRng::seed_from_u64(1);
        let sealed = encrypt_payload(b"meet at noon", "hunter2", &mut rng).unwrap();
        assert_eq!(sealed.len(), 12 + OVERHEAD);
        assert_eq!(decrypt_payload(&sealed, "hunter2").unwrap(), b"meet at noon".to_vec());
    }

    #[test]
    fn test_wrong_password() {
        let mut rng = StdRng::seed_from_u64(2);
        let sealed = encrypt_payload(b"secret", "correct", &mut rng).unwrap();
        assert!(matches!(
            decrypt_payload(&sealed, "incorrect"),
            Err(StegError::WrongPassword)
        ));
    }

    #[test]
    fn test_tampered_ciphertext() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sealed = encrypt_payload(b"secret", "pw", &mut rng).unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 1;
        assert!(matches!(decrypt_payload(&sealed, "pw"), Err(StegError::WrongPassword)));
    }

    #[test]
    fn test_empty_plaintext_and_short_input() {
        let mut rng = StdRng::seed_from_u64(4);
        let sealed = encrypt_payload(b"", "pw", &mut rng).unwrap();
        assert_eq!(sealed.len(), OVERHEAD);
        assert!(decrypt_payload(&sealed, "pw").unwrap().is_empty());

        assert!(matches!(
            decrypt_payload(&[0u8; 10], "pw"),
            Err(StegError::EncryptedPayloadTooShort {
                minimum: OVERHEAD,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_fresh_salt_per_payload() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = encrypt_payload(b"same", "pw", &mut rng).unwrap();
        let b = encrypt_payload(b"same", "pw", &mut rng).unwrap();
        assert_ne!(a, b);
        assert_ne!(a[..SALT_LEN], b[..SALT_LEN]);
    }

    #[test]
    fn test_empty_password_rejected() {
        let mut rng = StdRng::seed_from_u64(6);
        assert!(matches!(
            encrypt_payload(b"x", "", &mut rng),
            Err(StegError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_seal_and_open_pass_through_without_password() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(seal(b"plain", None, &mut rng).unwrap(), b"plain".to_vec());
        assert_eq!(open(b"plain".to_vec(), None).unwrap(), b"plain".to_vec());
        let sealed = seal(b"plain", Some("pw"), &mut rng).unwrap();
        assert_eq!(open(sealed, Some("pw")).unwrap(), b"plain".to_vec());
    }
}
