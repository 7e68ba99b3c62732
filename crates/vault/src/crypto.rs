//! Authenticated encryption for credentials at rest.
//!
//! AES-256-GCM with a fresh random 96-bit nonce per encryption and the
//! 128-bit authentication tag stored alongside the ciphertext. The
//! encryption key is process-wide configuration — loaded from raw bytes or
//! derived from a passphrase with Argon2id — and is never derived from user
//! input at request time.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// AES-256-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;
/// AES-256-GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

/// Errors from the encryption layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// Key material was not exactly 32 bytes.
    #[error("encryption key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// Passphrase-based key derivation failed.
    #[error("key derivation failed")]
    KeyDerivation,

    /// Encryption failed (should not happen with a valid key).
    #[error("encryption failed")]
    EncryptionFailed,

    /// Decryption failed: wrong key or tampered nonce/tag/ciphertext.
    #[error("decryption failed")]
    DecryptionFailed,

    /// The envelope version is newer than this build understands.
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u8),
}

/// Process-wide 256-bit encryption key. Zeroed on drop, redacted in `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    /// Wrap raw 32-byte key material.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Decode a base64-encoded 32-byte key (the usual config format).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] if the decoded material is
    /// not exactly 32 bytes or is not valid base64.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let decoded = Zeroizing::new(
            B64.decode(encoded)
                .map_err(|_| CryptoError::InvalidKeyLength(0))?,
        );
        let bytes: [u8; 32] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength(decoded.len()))?;
        Ok(Self(bytes))
    }

    /// Derive a key from a passphrase with Argon2id.
    ///
    /// Deterministic for a given passphrase and salt, so a host restarted
    /// with the same configuration derives the same key.
    pub fn derive_from_passphrase(passphrase: &str, salt: &[u8; 16]) -> Result<Self, CryptoError> {
        let mut out = [0u8; 32];
        argon2::Argon2::default()
            .hash_password_into(passphrase.as_bytes(), salt, &mut out)
            .map_err(|_| CryptoError::KeyDerivation)?;
        Ok(Self(out))
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey[REDACTED]")
    }
}

/// The at-rest envelope: versioned ciphertext with nonce and tag.
///
/// Serialized with base64 fields so the envelope can live in any text-based
/// store (JSON column, document store, config fixture).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    /// Envelope format version.
    pub version: u8,
    /// 96-bit GCM nonce, unique per encryption.
    #[serde(with = "b64_bytes")]
    pub nonce: Vec<u8>,
    /// 128-bit authentication tag.
    #[serde(with = "b64_bytes")]
    pub tag: Vec<u8>,
    /// The ciphertext proper.
    #[serde(with = "b64_bytes")]
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// The envelope version this build writes.
    pub const CURRENT_VERSION: u8 = 1;
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
///
/// # Errors
///
/// Returns [`CryptoError::EncryptionFailed`] if the cipher rejects the input.
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> Result<EncryptedData, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(&key.0).map_err(|_| CryptoError::EncryptionFailed)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // The aead API appends the tag to the ciphertext; we store it separately.
    let mut sealed = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;
    let tag = sealed.split_off(sealed.len() - TAG_LEN);

    Ok(EncryptedData {
        version: EncryptedData::CURRENT_VERSION,
        nonce: nonce.to_vec(),
        tag,
        ciphertext: sealed,
    })
}

/// Decrypt an envelope under `key`.
///
/// The returned buffer is [`Zeroizing`] so the plaintext is wiped as soon as
/// the caller is done with it.
///
/// # Errors
///
/// Returns [`CryptoError::DecryptionFailed`] on a wrong key or any tampering
/// with nonce, tag or ciphertext, and [`CryptoError::UnsupportedVersion`]
/// for envelopes written by a newer build.
pub fn decrypt(key: &EncryptionKey, data: &EncryptedData) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if data.version != EncryptedData::CURRENT_VERSION {
        return Err(CryptoError::UnsupportedVersion(data.version));
    }
    if data.nonce.len() != NONCE_LEN || data.tag.len() != TAG_LEN {
        return Err(CryptoError::DecryptionFailed);
    }

    let cipher = Aes256Gcm::new_from_slice(&key.0).map_err(|_| CryptoError::DecryptionFailed)?;
    let nonce = Nonce::from_slice(&data.nonce);

    let mut sealed = Vec::with_capacity(data.ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(&data.ciphertext);
    sealed.extend_from_slice(&data.tag);

    let plaintext = cipher
        .decrypt(nonce, sealed.as_slice())
        .map_err(|_| CryptoError::DecryptionFailed)?;
    Ok(Zeroizing::new(plaintext))
}

/// Base64 serde adapter for byte fields.
mod b64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as B64;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&B64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        B64.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}
