//! Error types.
//!
//! One public [`Error`] enum with a sub-enum per concern, so callers can
//! match on the failure class without string inspection.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for all cachet operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Params(#[from] ParamError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Input(#[from] InputError),
}

/// Failures while parsing the `scheme:params:ciphertext` text form.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("malformed secret '{0}': expected <scheme>:<params>:<ciphertext>")]
    Malformed(String),

    #[error("unknown scheme '{0}'")]
    UnknownScheme(String),
}

/// Failures in the parameter codec.
#[derive(Error, Debug)]
pub enum ParamError {
    #[error("malformed parameters '{0}'")]
    Malformed(String),

    #[error("missing required parameter: {0}")]
    Missing(&'static str),

    #[error("parameter conversion failed: {0}")]
    Convert(String),
}

/// Failures in the AES helper and key derivation.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("invalid AES key length {0} (expected 16, 24, or 32 bytes)")]
    InvalidKeyLength(usize),

    #[error("ciphertext is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("ciphertext too short ({0} bytes): cannot contain an IV")]
    Truncated(usize),

    #[error("ciphertext length is not a multiple of the AES block size")]
    Misaligned,

    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("decrypted plaintext is not valid UTF-8")]
    NotUtf8,
}

/// Failures reading or writing the persisted local key.
#[derive(Error, Debug)]
pub enum KeyStoreError {
    #[error("no user data directory available")]
    NoDataDir,

    #[error("failed to read key file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write key file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("key file {path:?} is not valid base64")]
    InvalidKey { path: PathBuf },
}

/// Failures talking to a remote key-management service.
///
/// Nothing here is retried; retry and timeout policy belong to the
/// transport behind [`crate::cipher::KmsClient`].
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("KMS client construction failed: {0}")]
    Connect(String),

    #[error("KMS encrypt failed: {0}")]
    Encrypt(String),

    #[error("KMS decrypt failed: {0}")]
    Decrypt(String),

    #[error("{0} support not compiled; rebuild with --features {0}")]
    Unavailable(&'static str),
}

/// Failures reported by an external password source.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("no password source configured")]
    NoSource,

    #[error("failed to read password: {0}")]
    Read(String),
}

pub type Result<T> = std::result::Result<T, Error>;
