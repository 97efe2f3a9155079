//! The secret envelope and its canonical text form.
//!
//! A secret is persisted as `<scheme>:<url-encoded params>:<ciphertext>`.
//! The split is capped at three segments, so the ciphertext may itself
//! contain `:` characters. Two envelope disciplines are provided:
//!
//! - [`StrictSecret`] re-invokes its crypter on every `decrypt()`; extra
//!   decrypt parameters may be appended between calls.
//! - [`Secret`] memoizes: the crypter runs at most once per instance, which
//!   matters when decryption is a billable remote call.
//!
//! The empty string is the zero secret: it parses successfully and
//! decrypts to `""` without touching any crypter, so optional config
//! fields can stay blank.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::cipher::Crypter;
use crate::error::{Result, SecretError};
use crate::params;
use crate::registry::Registry;
use crate::types::{Ciphertext, DecryptParams};

/// Non-memoizing envelope: every [`decrypt`](StrictSecret::decrypt)
/// re-invokes the crypter.
#[derive(Clone)]
pub struct StrictSecret {
    crypter: Option<Arc<dyn Crypter>>,
    decrypt_params: DecryptParams,
    ciphertext: Ciphertext,
}

impl StrictSecret {
    /// The zero secret: no scheme, decrypts to the empty string.
    pub fn empty() -> Self {
        Self {
            crypter: None,
            decrypt_params: DecryptParams::new(),
            ciphertext: Ciphertext::new(),
        }
    }

    pub(crate) fn from_parts(
        crypter: Arc<dyn Crypter>,
        decrypt_params: DecryptParams,
        ciphertext: Ciphertext,
    ) -> Self {
        Self {
            crypter: Some(crypter),
            decrypt_params,
            ciphertext,
        }
    }

    /// Parse the canonical text form, resolving the scheme against
    /// `registry`.
    pub fn parse(text: &str, registry: &Registry) -> Result<Self> {
        if text.is_empty() {
            return Ok(Self::empty());
        }

        let mut segments = text.splitn(3, ':');
        let (Some(scheme), Some(raw_params), Some(ciphertext)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(SecretError::Malformed(text.to_string()).into());
        };

        let crypter = registry.resolve(scheme)?;
        let decrypt_params = params::parse(raw_params)?;
        Ok(Self {
            crypter: Some(crypter),
            decrypt_params,
            ciphertext: ciphertext.to_string(),
        })
    }

    /// Scheme name, or `None` for the zero secret.
    pub fn scheme(&self) -> Option<&str> {
        self.crypter.as_ref().map(|c| c.name())
    }

    pub fn ciphertext(&self) -> &str {
        &self.ciphertext
    }

    pub fn decrypt_params(&self) -> &DecryptParams {
        &self.decrypt_params
    }

    /// Recover the plaintext by invoking the crypter.
    pub fn decrypt(&self) -> Result<String> {
        match &self.crypter {
            Some(crypter) => crypter.decrypt(&self.ciphertext, &self.decrypt_params),
            None => Ok(String::new()),
        }
    }

    /// Merge extra decrypt parameters, overwriting existing keys.
    ///
    /// Used when an operator-supplied value (a credential profile, say)
    /// must be combined with what was embedded at encryption time.
    pub fn append_parameters(&mut self, extra: DecryptParams) {
        self.decrypt_params.extend(extra);
    }

    /// Render the canonical `scheme:params:ciphertext` form; the zero
    /// secret renders as the empty string.
    pub fn marshal_text(&self) -> String {
        match &self.crypter {
            Some(crypter) => format!(
                "{}:{}:{}",
                crypter.name(),
                params::encode(&self.decrypt_params),
                self.ciphertext
            ),
            None => String::new(),
        }
    }
}

/// Displays the ciphertext only, never a recovered plaintext. Note that
/// for the `plain` scheme the ciphertext equals the plaintext by
/// definition.
impl fmt::Display for StrictSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ciphertext)
    }
}

impl fmt::Debug for StrictSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrictSecret")
            .field("scheme", &self.scheme())
            .field("decrypt_params", &self.decrypt_params)
            .field("ciphertext", &self.ciphertext)
            .finish()
    }
}

/// Memoizing envelope: the crypter runs at most once per instance.
///
/// Safe under concurrent `decrypt()` calls: the cache lock is held across
/// the underlying decrypt, so exactly one invocation executes and every
/// caller observes its result. A failed decrypt is not cached; the next
/// call retries.
pub struct Secret {
    inner: StrictSecret,
    plaintext: Mutex<Option<String>>,
}

impl Secret {
    pub fn empty() -> Self {
        Self::from_strict(StrictSecret::empty())
    }

    pub fn from_strict(inner: StrictSecret) -> Self {
        Self {
            inner,
            plaintext: Mutex::new(None),
        }
    }

    /// Parse the canonical text form, resolving the scheme against
    /// `registry`.
    pub fn parse(text: &str, registry: &Registry) -> Result<Self> {
        Ok(Self::from_strict(StrictSecret::parse(text, registry)?))
    }

    /// Scheme name, or `None` for the zero secret.
    pub fn scheme(&self) -> Option<&str> {
        self.inner.scheme()
    }

    /// Recover the plaintext, invoking the crypter at most once; repeated
    /// calls return the cached value.
    pub fn decrypt(&self) -> Result<String> {
        let mut cached = self
            .plaintext
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(plaintext) = cached.as_ref() {
            return Ok(plaintext.clone());
        }

        let plaintext = self.inner.decrypt()?;
        *cached = Some(plaintext.clone());
        Ok(plaintext)
    }

    /// Render the canonical text form (never the plaintext).
    pub fn marshal_text(&self) -> String {
        self.inner.marshal_text()
    }
}

impl From<StrictSecret> for Secret {
    fn from(inner: StrictSecret) -> Self {
        Self::from_strict(inner)
    }
}

/// Always redacted: a memoized plaintext must not leak through generic
/// formatting paths.
impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}
