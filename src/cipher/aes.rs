//! PKCS7-padded AES-CBC helper shared by the local and password schemes.
//!
//! Output is self-contained: a random IV is prefixed to the CBC ciphertext
//! and the whole buffer is base64-encoded, so decryption needs only the key.

use aes::cipher::block_padding::{NoPadding, Pkcs7};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::{Aes128, Aes192, Aes256};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::trace;

use crate::error::{CipherError, Result};

/// AES block size in bytes; also the IV length.
pub const BLOCK_SIZE: usize = 16;

/// Encrypt `plaintext` with AES-CBC under a 16-, 24-, or 32-byte key.
///
/// Returns base64 of `IV || ciphertext`. Fails with
/// [`CipherError::InvalidKeyLength`] for any other key size.
pub fn encrypt(key: &[u8], plaintext: &str) -> Result<String> {
    let mut iv = [0u8; BLOCK_SIZE];
    OsRng.fill_bytes(&mut iv);

    let body = cbc_encrypt(key, &iv, plaintext.as_bytes())?;
    let mut data = Vec::with_capacity(BLOCK_SIZE + body.len());
    data.extend_from_slice(&iv);
    data.extend_from_slice(&body);

    trace!(
        plaintext_len = plaintext.len(),
        ciphertext_len = data.len(),
        "AES-CBC encrypt"
    );
    Ok(BASE64.encode(data))
}

/// Decrypt a base64 `IV || ciphertext` buffer produced by [`encrypt`].
///
/// Fails with [`CipherError::Decode`] on bad base64,
/// [`CipherError::Truncated`] if the buffer cannot contain an IV, and
/// [`CipherError::Misaligned`] if the body is not block-aligned.
pub fn decrypt(key: &[u8], b64_ciphertext: &str) -> Result<String> {
    let data = BASE64.decode(b64_ciphertext).map_err(CipherError::Decode)?;
    if data.len() < BLOCK_SIZE {
        return Err(CipherError::Truncated(data.len()).into());
    }
    let (iv, body) = data.split_at(BLOCK_SIZE);
    if body.len() % BLOCK_SIZE != 0 {
        return Err(CipherError::Misaligned.into());
    }

    let mut plaintext = cbc_decrypt(key, iv, body)?;
    strip_pkcs7(&mut plaintext);
    trace!(plaintext_len = plaintext.len(), "AES-CBC decrypt");
    String::from_utf8(plaintext).map_err(|_| CipherError::NotUtf8.into())
}

fn cbc_encrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let invalid = || CipherError::InvalidKeyLength(key.len());
    let ciphertext = match key.len() {
        16 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| invalid())?
            .encrypt_padded_vec_mut::<Pkcs7>(data),
        24 => cbc::Encryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| invalid())?
            .encrypt_padded_vec_mut::<Pkcs7>(data),
        32 => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| invalid())?
            .encrypt_padded_vec_mut::<Pkcs7>(data),
        _ => return Err(invalid().into()),
    };
    Ok(ciphertext)
}

fn cbc_decrypt(key: &[u8], iv: &[u8], body: &[u8]) -> Result<Vec<u8>> {
    let invalid = || CipherError::InvalidKeyLength(key.len());
    let plaintext = match key.len() {
        16 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| invalid())?
            .decrypt_padded_vec_mut::<NoPadding>(body)
            .map_err(|_| CipherError::Misaligned)?,
        24 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| invalid())?
            .decrypt_padded_vec_mut::<NoPadding>(body)
            .map_err(|_| CipherError::Misaligned)?,
        32 => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| invalid())?
            .decrypt_padded_vec_mut::<NoPadding>(body)
            .map_err(|_| CipherError::Misaligned)?,
        _ => return Err(invalid().into()),
    };
    Ok(plaintext)
}

/// Conventional PKCS7 strip: the final byte is trusted as the pad count and
/// the padding bytes themselves are not checked, for wire compatibility
/// with existing tokens. A wrong key therefore usually yields garbage
/// output rather than an error. An oversized count clears the buffer
/// instead of panicking.
fn strip_pkcs7(plaintext: &mut Vec<u8>) {
    if let Some(&count) = plaintext.last() {
        let keep = plaintext.len().saturating_sub(count as usize);
        plaintext.truncate(keep);
    }
}
