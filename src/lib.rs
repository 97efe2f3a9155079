//! Cachet - self-describing encrypted secrets for configuration files.
//!
//! Configuration values are stored as opaque tokens of the form
//! `<scheme>:<url-encoded params>:<ciphertext>` instead of plaintext, so
//! secrets can live in version-controlled config files (TOML, YAML, JSON;
//! the token is plain ASCII) and be decrypted on demand by the consuming
//! process.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cipher/           # Encryption schemes
//! │   ├── mod           # Crypter trait
//! │   ├── aes           # Shared PKCS7 AES-CBC helper
//! │   ├── plain         # Passthrough
//! │   ├── local         # Per-user local key
//! │   ├── password      # scrypt-derived key
//! │   └── kms           # AWS KMS transport (feature `aws`)
//! ├── keystore          # Local key load-or-generate + cache
//! ├── params            # URL-query parameter codec
//! ├── registry          # Scheme name -> Crypter lookup
//! ├── secret            # Secret / StrictSecret envelopes
//! └── error             # Error types
//! ```
//!
//! # Usage
//!
//! Encrypt once and embed the token in a config file:
//!
//! ```
//! use cachet::{EncryptParams, Registry};
//!
//! # fn main() -> cachet::Result<()> {
//! let registry = Registry::with_defaults();
//!
//! let secret = registry.encrypt_secret("plain", "hello", &EncryptParams::new())?;
//! let token = secret.marshal_text();
//!
//! // Later, usually in another process:
//! let loaded = registry.load_secret(&token)?;
//! assert_eq!(loaded.decrypt()?, "hello");
//! # Ok(())
//! # }
//! ```
//!
//! A `kms` token carries its own decryption parameters, so a config value
//! like `kms:region=us-east-1:CiC...` needs nothing but AWS credentials at
//! load time. Collaborators (password prompt, KMS transport, key
//! directory) are injected through [`Registry::builder`].

pub mod cipher;
pub mod constants;
pub mod error;
pub mod keystore;
pub mod params;
pub mod registry;
pub mod secret;
pub mod types;

#[cfg(feature = "aws")]
pub use cipher::AwsClientFactory;
pub use cipher::{
    Crypter, KmsClient, KmsClientFactory, KmsCrypter, LocalCrypter, NoPasswordSource,
    PasswordCrypter, PasswordSource, PlainCrypter, StaticPassword, UnsupportedKmsFactory,
};
pub use error::{Error, Result};
pub use keystore::LocalKeyStore;
pub use registry::{Registry, RegistryBuilder};
pub use secret::{Secret, StrictSecret};
pub use types::{Ciphertext, DecryptParams, EncryptParams, Params};
