//! Local key generation and storage.
//!
//! The `local` scheme encrypts with a per-user symmetric key generated on
//! first use and persisted, base64-encoded, under the user data directory
//! with restricted permissions (0600 on Unix). A process-lifetime cache
//! avoids re-reading the file on every operation.

use std::fs;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;
use zeroize::Zeroizing;

use crate::constants::{KEY_DIR, KEY_FILE};
use crate::error::{KeyStoreError, Result};

/// Length in bytes of a generated local key.
pub const KEY_LEN: usize = 16;

/// Load-or-generate store for the local symmetric key.
pub struct LocalKeyStore {
    data_dir: Option<PathBuf>,
    cache: RwLock<Option<Zeroizing<Vec<u8>>>>,
}

impl LocalKeyStore {
    /// Store rooted at the platform user data directory.
    pub fn new() -> Self {
        Self {
            data_dir: None,
            cache: RwLock::new(None),
        }
    }

    /// Store rooted at an explicit data directory (tests, containers).
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
            cache: RwLock::new(None),
        }
    }

    /// Path of the persisted key file.
    pub fn key_file(&self) -> Result<PathBuf> {
        Ok(self.key_dir()?.join(KEY_FILE))
    }

    fn key_dir(&self) -> Result<PathBuf> {
        let base = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir().ok_or(KeyStoreError::NoDataDir)?,
        };
        Ok(base.join(KEY_DIR))
    }

    /// Return the local key, loading or generating it on first use.
    ///
    /// Read-mostly: the fast path takes the read lock only. On a miss the
    /// write lock is taken and the cache re-checked, so concurrent first
    /// use performs the load-or-generate sequence exactly once.
    pub fn key(&self) -> Result<Zeroizing<Vec<u8>>> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(key) = cache.as_ref() {
                return Ok(key.clone());
            }
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(key) = cache.as_ref() {
            return Ok(key.clone());
        }

        let key = self.load_or_generate()?;
        *cache = Some(key.clone());
        Ok(key)
    }

    fn load_or_generate(&self) -> Result<Zeroizing<Vec<u8>>> {
        let dir = self.key_dir()?;
        let path = dir.join(KEY_FILE);

        if path.exists() {
            let encoded = fs::read_to_string(&path).map_err(|source| KeyStoreError::Read {
                path: path.clone(),
                source,
            })?;
            let key = BASE64
                .decode(encoded.trim())
                .map_err(|_| KeyStoreError::InvalidKey { path: path.clone() })?;
            debug!(path = %path.display(), "loaded local key");
            return Ok(Zeroizing::new(key));
        }

        let mut key = Zeroizing::new(vec![0u8; KEY_LEN]);
        OsRng.fill_bytes(key.as_mut_slice());

        fs::create_dir_all(&dir).map_err(|source| KeyStoreError::Write {
            path: dir.clone(),
            source,
        })?;
        fs::write(&path, BASE64.encode(key.as_slice())).map_err(|source| KeyStoreError::Write {
            path: path.clone(),
            source,
        })?;

        // Owner-only: the key must not be readable by other users.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).map_err(|source| {
                KeyStoreError::Write {
                    path: path.clone(),
                    source,
                }
            })?;
        }

        debug!(path = %path.display(), "generated local key");
        Ok(key)
    }
}

impl Default for LocalKeyStore {
    fn default() -> Self {
        Self::new()
    }
}
