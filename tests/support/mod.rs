//! Shared fixtures for integration tests.

// Each test binary compiles its own copy; not every binary uses every item.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cachet::error::RemoteError;
use cachet::{
    Crypter, DecryptParams, EncryptParams, KmsClient, KmsClientFactory, Registry, Result,
    StaticPassword,
};
use tempfile::TempDir;

pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Registry wired with deterministic collaborators and a throwaway key
/// directory. Keep the `TempDir` alive for as long as the registry is used.
pub fn test_registry() -> (Registry, TempDir) {
    let dir = TempDir::new().unwrap();
    let registry = Registry::builder()
        .data_dir(dir.path())
        .password_source(Arc::new(StaticPassword::new(TEST_PASSWORD)))
        .kms_factory(Arc::new(MockKmsFactory::default()))
        .build();
    (registry, dir)
}

/// Reversible stand-in for the remote KMS service.
pub struct MockKms;

const BLOB_PREFIX: &[u8] = b"mock-kms:";

impl KmsClient for MockKms {
    fn encrypt(&self, _key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut blob = BLOB_PREFIX.to_vec();
        blob.extend_from_slice(plaintext);
        Ok(blob)
    }

    fn decrypt(&self, ciphertext_blob: &[u8]) -> Result<Vec<u8>> {
        ciphertext_blob
            .strip_prefix(BLOB_PREFIX)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| RemoteError::Decrypt("not a mock-kms blob".to_string()).into())
    }
}

#[derive(Default)]
pub struct MockKmsFactory {
    pub created: AtomicUsize,
}

impl KmsClientFactory for MockKmsFactory {
    fn create(&self, _region: &str, _profile: Option<&str>) -> Result<Arc<dyn KmsClient>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockKms))
    }
}

/// Crypter that records how often it is invoked.
#[derive(Default)]
pub struct MockCrypter {
    pub encrypt_calls: AtomicUsize,
    pub decrypt_calls: AtomicUsize,
}

const MOCK_PREFIX: &str = "mock-ct/";

impl Crypter for MockCrypter {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn encrypt(
        &self,
        plaintext: &str,
        _params: &EncryptParams,
    ) -> Result<(String, DecryptParams)> {
        self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
        Ok((format!("{MOCK_PREFIX}{plaintext}"), DecryptParams::new()))
    }

    fn decrypt(&self, ciphertext: &str, _params: &DecryptParams) -> Result<String> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ciphertext
            .strip_prefix(MOCK_PREFIX)
            .unwrap_or(ciphertext)
            .to_string())
    }
}
