//! # Strato Vault
//!
//! Credential vault for the Strato provider runtime.
//!
//! Tenant credentials are stored encrypted at rest (AES-256-GCM) and
//! decrypted transiently, in memory, only for the duration of one dispatch
//! call. There is no plaintext cache: every dispatch re-decrypts, and the
//! plaintext buffer is zeroized as soon as the payload is deserialized.
//!
//! ## Key Components
//!
//! - [`EncryptionKey`], [`EncryptedData`], [`encrypt`], [`decrypt`] — the
//!   authenticated-encryption layer
//! - [`Credential`] — the persisted record (ciphertext only)
//! - [`CredentialRepository`] — persistence seam, with
//!   [`MemoryCredentialRepository`] for tests and embedding
//! - [`CredentialVault`] — the dispatch-facing API: store, and
//!   fetch-check-decrypt-validate in one bounded call

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod crypto;
mod record;
mod repository;
mod vault;

pub use crypto::{CryptoError, EncryptedData, EncryptionKey, decrypt, encrypt};
pub use record::Credential;
pub use repository::{CredentialRepository, MemoryCredentialRepository, RepositoryError};
pub use vault::{CredentialVault, VaultError};
