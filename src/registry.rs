//! Scheme name → [`Crypter`] lookup.
//!
//! A [`Registry`] is built once by the application context and shared
//! read-only afterwards; there is no module-level global. The builder is
//! where external collaborators (password prompt, KMS transport, data
//! directory) are injected.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::cipher::{
    Crypter, KmsClientFactory, KmsCrypter, LocalCrypter, NoPasswordSource, PasswordCrypter,
    PasswordSource, PlainCrypter,
};
use crate::error::{Result, SecretError};
use crate::keystore::LocalKeyStore;
use crate::secret::{Secret, StrictSecret};
use crate::types::EncryptParams;

/// Immutable-after-init mapping from scheme name to crypter instance.
pub struct Registry {
    crypters: HashMap<String, Arc<dyn Crypter>>,
}

impl Registry {
    /// An empty registry. Mostly useful in tests; production code wants
    /// [`Registry::with_defaults`] or [`Registry::builder`].
    pub fn new() -> Self {
        Self {
            crypters: HashMap::new(),
        }
    }

    /// The standard four schemes with default collaborators.
    ///
    /// The password scheme fails with `InputError::NoSource` until a real
    /// source is wired via the builder; the kms scheme uses the AWS SDK
    /// when compiled with `--features aws`.
    pub fn with_defaults() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Add or replace a crypter, indexed by its `name()`.
    ///
    /// Intended for wiring mock schemes in tests; call before the registry
    /// is shared across threads.
    pub fn register(&mut self, crypter: Arc<dyn Crypter>) {
        self.crypters.insert(crypter.name().to_string(), crypter);
    }

    /// Resolve a scheme name to its crypter.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Crypter>> {
        self.crypters
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::UnknownScheme(name.to_string()).into())
    }

    /// Registered scheme names, sorted.
    pub fn schemes(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.crypters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Parse a canonical secret string into a memoizing [`Secret`].
    pub fn load_secret(&self, text: &str) -> Result<Secret> {
        Secret::parse(text, self)
    }

    /// Parse a canonical secret string into a [`StrictSecret`].
    pub fn load_strict_secret(&self, text: &str) -> Result<StrictSecret> {
        StrictSecret::parse(text, self)
    }

    /// Encrypt `plaintext` under the named scheme and wrap the result in a
    /// marshalable envelope.
    pub fn encrypt_secret(
        &self,
        scheme: &str,
        plaintext: &str,
        params: &EncryptParams,
    ) -> Result<StrictSecret> {
        let crypter = self.resolve(scheme)?;
        let (ciphertext, decrypt_params) = crypter.encrypt(plaintext, params)?;
        Ok(StrictSecret::from_parts(crypter, decrypt_params, ciphertext))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Configures the collaborators behind the default schemes.
#[derive(Default)]
pub struct RegistryBuilder {
    data_dir: Option<PathBuf>,
    password_source: Option<Arc<dyn PasswordSource>>,
    kms_factory: Option<Arc<dyn KmsClientFactory>>,
}

impl RegistryBuilder {
    /// Override the user data directory holding the local key.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Source of the password for the `password` scheme.
    pub fn password_source(mut self, source: Arc<dyn PasswordSource>) -> Self {
        self.password_source = Some(source);
        self
    }

    /// Transport factory for the `kms` scheme.
    pub fn kms_factory(mut self, factory: Arc<dyn KmsClientFactory>) -> Self {
        self.kms_factory = Some(factory);
        self
    }

    pub fn build(self) -> Registry {
        let keystore = Arc::new(match self.data_dir {
            Some(dir) => LocalKeyStore::with_data_dir(dir),
            None => LocalKeyStore::new(),
        });
        let password_source = self
            .password_source
            .unwrap_or_else(|| Arc::new(NoPasswordSource));
        let kms_factory = self.kms_factory.unwrap_or_else(default_kms_factory);

        let mut registry = Registry::new();
        registry.register(Arc::new(PlainCrypter));
        registry.register(Arc::new(LocalCrypter::new(keystore)));
        registry.register(Arc::new(PasswordCrypter::new(password_source)));
        registry.register(Arc::new(KmsCrypter::new(kms_factory)));

        debug!(schemes = ?registry.schemes(), "crypter registry initialized");
        registry
    }
}

fn default_kms_factory() -> Arc<dyn KmsClientFactory> {
    #[cfg(feature = "aws")]
    return Arc::new(crate::cipher::AwsClientFactory);

    #[cfg(not(feature = "aws"))]
    Arc::new(crate::cipher::UnsupportedKmsFactory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{Ciphertext, DecryptParams};

    struct UpperCrypter;

    impl Crypter for UpperCrypter {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn encrypt(
            &self,
            plaintext: &str,
            _params: &EncryptParams,
        ) -> Result<(Ciphertext, DecryptParams)> {
            Ok((plaintext.to_uppercase(), DecryptParams::new()))
        }

        fn decrypt(&self, ciphertext: &str, _params: &DecryptParams) -> Result<String> {
            Ok(ciphertext.to_lowercase())
        }
    }

    #[test]
    fn test_default_schemes() {
        let registry = Registry::with_defaults();
        assert_eq!(registry.schemes(), ["kms", "local", "password", "plain"]);
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = Registry::with_defaults();
        let err = registry.resolve("bogus-scheme").unwrap_err();
        assert!(matches!(
            err,
            Error::Secret(SecretError::UnknownScheme(name)) if name == "bogus-scheme"
        ));
    }

    #[test]
    fn test_register_additional_scheme() {
        let mut registry = Registry::with_defaults();
        registry.register(Arc::new(UpperCrypter));

        let secret = registry
            .encrypt_secret("upper", "hello", &EncryptParams::new())
            .unwrap();
        assert_eq!(secret.marshal_text(), "upper::HELLO");
        assert_eq!(secret.decrypt().unwrap(), "hello");
    }
}
