//! Encryption schemes.
//!
//! Each scheme implements the [`Crypter`] trait and is looked up by name
//! through the [`crate::registry::Registry`].
//!
//! ## Schemes
//!
//! - **plain**: passthrough, no encryption. Useful for development configs.
//! - **local**: AES-CBC with a per-user key generated on first use.
//! - **password**: AES-CBC with an scrypt-derived key and a per-secret salt.
//! - **kms**: envelope encryption through AWS KMS (real client behind the
//!   `aws` feature; any [`KmsClient`] transport can be plugged in).
//!
//! ## Adding a scheme
//!
//! 1. Implement [`Crypter`] in a new file
//! 2. Re-export it from this module
//! 3. Register it on the application's `Registry`

pub mod aes;
mod kms;
mod local;
mod password;
mod plain;

#[cfg(feature = "aws")]
pub use kms::AwsClientFactory;
pub use kms::{KmsClient, KmsClientFactory, KmsCrypter, UnsupportedKmsFactory};
pub use local::LocalCrypter;
pub use password::{NoPasswordSource, PasswordCrypter, PasswordSource, StaticPassword};
pub use plain::PlainCrypter;

use crate::error::Result;
use crate::types::{Ciphertext, DecryptParams, EncryptParams};

/// A named encryption scheme.
///
/// `encrypt` returns the ciphertext together with the decrypt parameters
/// that must be persisted alongside it; `decrypt` reverses the operation
/// given those parameters. Implementations must be safe to share across
/// threads; any internal caches carry their own locking.
pub trait Crypter: Send + Sync {
    /// Scheme name as it appears in the secret text form.
    fn name(&self) -> &'static str;

    /// Encrypt `plaintext` using caller-supplied, scheme-specific params.
    ///
    /// Returns the ciphertext and the parameters a later process needs to
    /// decrypt it (everything except the long-term key material).
    fn encrypt(
        &self,
        plaintext: &str,
        params: &EncryptParams,
    ) -> Result<(Ciphertext, DecryptParams)>;

    /// Recover the plaintext from `ciphertext` and persisted params.
    fn decrypt(&self, ciphertext: &str, params: &DecryptParams) -> Result<String>;
}

impl std::fmt::Debug for dyn Crypter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crypter").field("name", &self.name()).finish()
    }
}
