//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

use std::collections::BTreeMap;

/// An opaque, scheme-defined encrypted payload.
///
/// For the AES-based schemes this is base64 of `IV || AES-CBC(plaintext)`;
/// for `plain` it equals the plaintext; for `kms` it is base64 of the
/// provider's ciphertext blob.
pub type Ciphertext = String;

/// Flat string-keyed parameter map as carried in the secret wire format.
///
/// Ordered so that encoding is deterministic.
pub type Params = BTreeMap<String, String>;

/// Caller-supplied, scheme-specific encryption parameters. Not persisted.
pub type EncryptParams = Params;

/// Crypter-produced parameters persisted alongside the ciphertext.
///
/// Holds everything a later process needs to decrypt except the long-term
/// key material itself (local key file, password, or cloud credentials).
pub type DecryptParams = Params;
