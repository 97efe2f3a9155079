//! Local scheme: AES-CBC with a per-user symmetric key.
//!
//! Meant for local and offline development. The key lives outside the
//! repository (see [`crate::keystore`]) so it cannot be committed by
//! accident, and no parameters need to be persisted with the ciphertext.

use std::sync::Arc;

use super::{aes, Crypter};
use crate::error::Result;
use crate::keystore::LocalKeyStore;
use crate::types::{Ciphertext, DecryptParams, EncryptParams};

/// The `local` scheme.
pub struct LocalCrypter {
    keys: Arc<LocalKeyStore>,
}

impl LocalCrypter {
    pub fn new(keys: Arc<LocalKeyStore>) -> Self {
        Self { keys }
    }
}

impl Crypter for LocalCrypter {
    fn name(&self) -> &'static str {
        "local"
    }

    fn encrypt(
        &self,
        plaintext: &str,
        _params: &EncryptParams,
    ) -> Result<(Ciphertext, DecryptParams)> {
        let key = self.keys.key()?;
        let ciphertext = aes::encrypt(&key, plaintext)?;
        Ok((ciphertext, DecryptParams::new()))
    }

    fn decrypt(&self, ciphertext: &str, _params: &DecryptParams) -> Result<String> {
        let key = self.keys.key()?;
        aes::decrypt(&key, ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn crypter(dir: &TempDir) -> LocalCrypter {
        LocalCrypter::new(Arc::new(LocalKeyStore::with_data_dir(dir.path())))
    }

    #[test]
    fn test_roundtrip() {
        let dir = TempDir::new().unwrap();
        let crypter = crypter(&dir);

        let (first, params) = crypter.encrypt("mypass", &EncryptParams::new()).unwrap();
        let (second, _) = crypter.encrypt("mypass2", &EncryptParams::new()).unwrap();
        assert!(params.is_empty());

        assert_eq!(crypter.decrypt(&first, &params).unwrap(), "mypass");
        assert_eq!(crypter.decrypt(&second, &params).unwrap(), "mypass2");
    }

    #[test]
    fn test_distinct_ciphertexts() {
        let dir = TempDir::new().unwrap();
        let crypter = crypter(&dir);

        let (first, _) = crypter.encrypt("same", &EncryptParams::new()).unwrap();
        let (second, _) = crypter.encrypt("same", &EncryptParams::new()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_decrypt_garbage_fails() {
        let dir = TempDir::new().unwrap();
        let crypter = crypter(&dir);
        let params = DecryptParams::new();

        assert!(crypter.decrypt("not base64 at all!", &params).is_err());
        assert!(crypter.decrypt("", &params).is_err());
        assert!(crypter.decrypt("Zm9v", &params).is_err());
    }
}
