//! URL-query parameter codec.
//!
//! The wire format keeps decrypt parameters as a flat string map encoded as
//! `key=value` pairs joined by `&`, both sides percent-encoded. Each scheme
//! can additionally declare a typed parameter struct and convert at the
//! boundary with [`to_params`]/[`from_params`], so string-literal keys do
//! not leak into scheme logic.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ParamError, Result};
use crate::types::Params;

/// Encode a parameter map as a URL-query string.
///
/// Keys are emitted in sorted order, so encoding is deterministic and a
/// parse → encode round trip reproduces the input exactly.
pub fn encode(params: &Params) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a URL-query string into a parameter map.
///
/// The empty string parses to an empty map. Fails with
/// [`ParamError::Malformed`] on invalid percent escapes or invalid UTF-8.
pub fn parse(s: &str) -> Result<Params> {
    let mut params = Params::new();
    for pair in s.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode_component(key, s)?, decode_component(value, s)?);
    }
    Ok(params)
}

fn decode_component(raw: &str, full: &str) -> Result<String> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 3 > bytes.len()
                || !bytes[i + 1].is_ascii_hexdigit()
                || !bytes[i + 2].is_ascii_hexdigit()
            {
                return Err(ParamError::Malformed(full.to_string()).into());
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    // '+' means space in query strings; literal plus arrives as %2B.
    let unplused = raw.replace('+', " ");
    let decoded = urlencoding::decode(&unplused)
        .map_err(|_| ParamError::Malformed(full.to_string()))?;
    Ok(decoded.into_owned())
}

/// Convert a typed parameter struct into the flat wire map.
///
/// Field names are lower-cased; `None` fields are skipped.
pub fn to_params<T: Serialize>(value: &T) -> Result<Params> {
    let json = serde_json::to_value(value).map_err(|e| ParamError::Convert(e.to_string()))?;
    let serde_json::Value::Object(fields) = json else {
        return Err(ParamError::Convert("expected a struct with named fields".to_string()).into());
    };

    let mut params = Params::new();
    for (key, value) in fields {
        let text = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        params.insert(key.to_lowercase(), text);
    }
    Ok(params)
}

/// Populate a typed parameter struct from the flat wire map.
///
/// Keys are matched case-insensitively (lower-cased before lookup).
pub fn from_params<T: DeserializeOwned>(params: &Params) -> Result<T> {
    let mut object = serde_json::Map::new();
    for (key, value) in params {
        object.insert(key.to_lowercase(), serde_json::Value::String(value.clone()));
    }
    serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| ParamError::Convert(e.to_string()).into())
}

/// Look up a required parameter by exact key.
pub fn require<'a>(params: &'a Params, name: &'static str) -> Result<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ParamError::Missing(name).into())
}
