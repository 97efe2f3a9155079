//! Constants used throughout cachet.
//!
//! Centralizes magic strings and configuration values.

/// Directory under the user data dir that holds the local key.
pub const KEY_DIR: &str = "secretcrypt";

/// File name of the persisted local key (base64-encoded raw bytes).
pub const KEY_FILE: &str = "key";

/// AWS credential profile used when a secret names none.
pub const DEFAULT_PROFILE: &str = "default";
