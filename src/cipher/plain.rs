//! Passthrough scheme: ciphertext equals plaintext.

use super::Crypter;
use crate::error::Result;
use crate::types::{Ciphertext, DecryptParams, EncryptParams};

/// The `plain` scheme. Stores the value as-is; the token only marks it as
/// a secret so it can be swapped for a real scheme later without touching
/// the consuming code.
pub struct PlainCrypter;

impl Crypter for PlainCrypter {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn encrypt(
        &self,
        plaintext: &str,
        _params: &EncryptParams,
    ) -> Result<(Ciphertext, DecryptParams)> {
        Ok((plaintext.to_string(), DecryptParams::new()))
    }

    fn decrypt(&self, ciphertext: &str, _params: &DecryptParams) -> Result<String> {
        Ok(ciphertext.to_string())
    }
}
