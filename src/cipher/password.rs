//! Password scheme: AES-CBC with an scrypt-derived key.
//!
//! The password itself never travels with the secret; it is obtained
//! through a [`PasswordSource`] supplied by the embedding application
//! (interactive prompt, environment variable, CI secret, ...). Only the
//! random salt is persisted in the decrypt parameters.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::trace;
use zeroize::Zeroizing;

use super::{aes, Crypter};
use crate::error::{CipherError, InputError, Result};
use crate::params;
use crate::types::{Ciphertext, DecryptParams, EncryptParams};

// scrypt cost parameters: N = 2^15, r = 8, p = 1, 24-byte key.
const SCRYPT_LOG_N: u8 = 15;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const DERIVED_KEY_LEN: usize = 24;
const SALT_LEN: usize = 16;

/// Supplies the password for the `password` scheme.
///
/// This is the seam for the interactive prompt collaborator; the core never
/// reads terminals or stdin itself.
pub trait PasswordSource: Send + Sync {
    fn password(&self) -> Result<Zeroizing<String>>;
}

/// A fixed password known up front (environment variable, test fixture).
pub struct StaticPassword(Zeroizing<String>);

impl StaticPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }
}

impl PasswordSource for StaticPassword {
    fn password(&self) -> Result<Zeroizing<String>> {
        Ok(self.0.clone())
    }
}

/// Placeholder source that fails with [`InputError::NoSource`]. Replace it
/// via [`crate::registry::RegistryBuilder::password_source`].
pub struct NoPasswordSource;

impl PasswordSource for NoPasswordSource {
    fn password(&self) -> Result<Zeroizing<String>> {
        Err(InputError::NoSource.into())
    }
}

/// The `password` scheme.
pub struct PasswordCrypter {
    source: Arc<dyn PasswordSource>,
}

impl PasswordCrypter {
    pub fn new(source: Arc<dyn PasswordSource>) -> Self {
        Self { source }
    }

    fn derive_key(&self, salt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let password = self.source.password()?;
        let kdf_params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, DERIVED_KEY_LEN)
            .map_err(|e| CipherError::Kdf(e.to_string()))?;

        let mut key = Zeroizing::new(vec![0u8; DERIVED_KEY_LEN]);
        scrypt::scrypt(password.as_bytes(), salt, &kdf_params, key.as_mut_slice())
            .map_err(|e| CipherError::Kdf(e.to_string()))?;
        trace!(salt_len = salt.len(), "derived password key");
        Ok(key)
    }
}

impl Crypter for PasswordCrypter {
    fn name(&self) -> &'static str {
        "password"
    }

    fn encrypt(
        &self,
        plaintext: &str,
        _params: &EncryptParams,
    ) -> Result<(Ciphertext, DecryptParams)> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let key = self.derive_key(&salt)?;
        let ciphertext = aes::encrypt(&key, plaintext)?;

        let mut decrypt_params = DecryptParams::new();
        decrypt_params.insert("salt".to_string(), BASE64.encode(salt));
        Ok((ciphertext, decrypt_params))
    }

    fn decrypt(&self, ciphertext: &str, params: &DecryptParams) -> Result<String> {
        let salt = BASE64
            .decode(params::require(params, "salt")?)
            .map_err(CipherError::Decode)?;
        let key = self.derive_key(&salt)?;
        aes::decrypt(&key, ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ParamError};

    fn crypter(password: &str) -> PasswordCrypter {
        PasswordCrypter::new(Arc::new(StaticPassword::new(password)))
    }

    #[test]
    fn test_roundtrip() {
        let crypter = crypter("mypass");
        let (ciphertext, params) = crypter.encrypt("myplaintext", &EncryptParams::new()).unwrap();
        assert!(params.contains_key("salt"));
        assert_eq!(crypter.decrypt(&ciphertext, &params).unwrap(), "myplaintext");
    }

    #[test]
    fn test_fresh_salt_each_call() {
        let crypter = crypter("mypass");
        let (_, first) = crypter.encrypt("x", &EncryptParams::new()).unwrap();
        let (_, second) = crypter.encrypt("x", &EncryptParams::new()).unwrap();
        assert_ne!(first["salt"], second["salt"]);
    }

    #[test]
    fn test_missing_salt() {
        let crypter = crypter("mypass");
        let err = crypter.decrypt("whatever", &DecryptParams::new()).unwrap_err();
        assert!(matches!(err, Error::Params(ParamError::Missing("salt"))));
    }

    #[test]
    fn test_no_source_configured() {
        let crypter = PasswordCrypter::new(Arc::new(NoPasswordSource));
        let err = crypter.encrypt("x", &EncryptParams::new()).unwrap_err();
        assert!(matches!(err, Error::Input(InputError::NoSource)));
    }
}
