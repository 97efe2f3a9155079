//! KMS scheme: envelope encryption through AWS Key Management Service.
//!
//! The remote transport sits behind the [`KmsClient`] trait so the scheme
//! itself stays synchronous and testable; the real AWS SDK client is
//! compiled in with `--features aws`. Clients are cached per
//! (region, profile) pair for the process lifetime.
//!
//! KMS embeds the key identity in the ciphertext blob, so decryption only
//! needs the region (and optionally a credential profile); those are the
//! parameters persisted with the secret.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::Crypter;
use crate::error::{CipherError, ParamError, RemoteError, Result};
use crate::params;
use crate::types::{Ciphertext, DecryptParams, EncryptParams};

/// Remote KMS transport: one client bound to a region and credential
/// profile. Calls block until the service responds or fails; no retry is
/// attempted at this layer.
pub trait KmsClient: Send + Sync {
    /// Encrypt `plaintext` under the master key `key_id`, returning the
    /// provider's ciphertext blob.
    fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt a ciphertext blob. The blob itself names the master key.
    fn decrypt(&self, ciphertext_blob: &[u8]) -> Result<Vec<u8>>;
}

/// Constructs [`KmsClient`]s on first use of a (region, profile) pair.
pub trait KmsClientFactory: Send + Sync {
    fn create(&self, region: &str, profile: Option<&str>) -> Result<Arc<dyn KmsClient>>;
}

/// Factory compiled in when AWS support is absent; every request fails
/// with guidance to rebuild with the `aws` feature.
pub struct UnsupportedKmsFactory;

impl KmsClientFactory for UnsupportedKmsFactory {
    fn create(&self, _region: &str, _profile: Option<&str>) -> Result<Arc<dyn KmsClient>> {
        Err(RemoteError::Unavailable("aws").into())
    }
}

type ClientKey = (String, Option<String>);

/// Process-lifetime cache of KMS clients.
///
/// Keyed by (region, profile) so clients are never reused across credential
/// profiles. Double-checked under a read/write lock: concurrent first use
/// constructs exactly one client per key.
struct KmsClientCache {
    factory: Arc<dyn KmsClientFactory>,
    clients: RwLock<HashMap<ClientKey, Arc<dyn KmsClient>>>,
}

impl KmsClientCache {
    fn new(factory: Arc<dyn KmsClientFactory>) -> Self {
        Self {
            factory,
            clients: RwLock::new(HashMap::new()),
        }
    }

    fn client(&self, region: &str, profile: Option<&str>) -> Result<Arc<dyn KmsClient>> {
        let key = (region.to_string(), profile.map(str::to_string));
        {
            let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(client) = clients.get(&key) {
                return Ok(client.clone());
            }
        }

        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have populated the entry while the write lock
        // was pending.
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        debug!(region, profile = profile.unwrap_or_default(), "creating KMS client");
        let client = self.factory.create(region, profile)?;
        clients.insert(key, client.clone());
        Ok(client)
    }
}

/// Typed view of the parameters persisted with kms ciphertext.
#[derive(Debug, Serialize, Deserialize)]
struct KmsDecryptParams {
    region: Option<String>,
    profile: Option<String>,
}

/// The `kms` scheme.
pub struct KmsCrypter {
    clients: KmsClientCache,
}

impl KmsCrypter {
    pub fn new(factory: Arc<dyn KmsClientFactory>) -> Self {
        Self {
            clients: KmsClientCache::new(factory),
        }
    }
}

impl Crypter for KmsCrypter {
    fn name(&self) -> &'static str {
        "kms"
    }

    fn encrypt(
        &self,
        plaintext: &str,
        params: &EncryptParams,
    ) -> Result<(Ciphertext, DecryptParams)> {
        let region = params::require(params, "region")?;
        let key_id = params::require(params, "keyID")?;
        let profile = params.get("profile").map(String::as_str);

        trace!(region, key_id, plaintext_len = plaintext.len(), "KMS encrypt");
        let client = self.clients.client(region, profile)?;
        let blob = client.encrypt(key_id, plaintext.as_bytes())?;

        let decrypt_params = params::to_params(&KmsDecryptParams {
            region: Some(region.to_string()),
            profile: profile.map(str::to_string),
        })?;
        Ok((BASE64.encode(blob), decrypt_params))
    }

    fn decrypt(&self, ciphertext: &str, params: &DecryptParams) -> Result<String> {
        let parsed: KmsDecryptParams = params::from_params(params)?;
        let region = parsed.region.ok_or(ParamError::Missing("region"))?;

        let blob = BASE64.decode(ciphertext).map_err(CipherError::Decode)?;
        trace!(region = %region, ciphertext_len = ciphertext.len(), "KMS decrypt");
        let client = self.clients.client(&region, parsed.profile.as_deref())?;
        let plaintext = client.decrypt(&blob)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::NotUtf8.into())
    }
}

/// Builds AWS SDK clients, resolving credentials from the named profile
/// (or the default provider chain).
#[cfg(feature = "aws")]
pub struct AwsClientFactory;

#[cfg(feature = "aws")]
impl KmsClientFactory for AwsClientFactory {
    fn create(&self, region: &str, profile: Option<&str>) -> Result<Arc<dyn KmsClient>> {
        Ok(Arc::new(AwsKmsClient::connect(region, profile)?))
    }
}

/// AWS SDK transport. The SDK is async; each client owns a small
/// current-thread runtime so the [`KmsClient`] surface stays blocking.
#[cfg(feature = "aws")]
struct AwsKmsClient {
    runtime: tokio::runtime::Runtime,
    client: aws_sdk_kms::Client,
}

#[cfg(feature = "aws")]
impl AwsKmsClient {
    fn connect(region: &str, profile: Option<&str>) -> Result<Self> {
        use crate::constants::DEFAULT_PROFILE;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RemoteError::Connect(format!("failed to create runtime: {e}")))?;

        let profile = profile.unwrap_or(DEFAULT_PROFILE);
        let config = runtime.block_on(
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(region.to_string()))
                .profile_name(profile)
                .load(),
        );
        let client = aws_sdk_kms::Client::new(&config);
        Ok(Self { runtime, client })
    }
}

#[cfg(feature = "aws")]
impl KmsClient for AwsKmsClient {
    fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.runtime.block_on(async {
            let output = self
                .client
                .encrypt()
                .key_id(key_id)
                .plaintext(aws_sdk_kms::primitives::Blob::new(plaintext))
                .send()
                .await
                .map_err(|e| RemoteError::Encrypt(e.to_string()))?;

            let blob = output
                .ciphertext_blob()
                .ok_or_else(|| RemoteError::Encrypt("no ciphertext returned".to_string()))?;
            Ok(blob.as_ref().to_vec())
        })
    }

    fn decrypt(&self, ciphertext_blob: &[u8]) -> Result<Vec<u8>> {
        self.runtime.block_on(async {
            let output = self
                .client
                .decrypt()
                .ciphertext_blob(aws_sdk_kms::primitives::Blob::new(ciphertext_blob))
                .send()
                .await
                .map_err(|e| RemoteError::Decrypt(e.to_string()))?;

            let blob = output
                .plaintext()
                .ok_or_else(|| RemoteError::Decrypt("no plaintext returned".to_string()))?;
            Ok(blob.as_ref().to_vec())
        })
    }
}
