//! Deterministic document fingerprints.
//!
//! Object keys are visited in sorted order so the digest does not depend on
//! how a map happens to be ordered in memory; array order is significant.

use crate::errors::{kind_name, DocumentError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Number, Value};
use xxhash_rust::xxh64::Xxh64;

/// 64-bit XXH64 digest (seed 0) of `value`.
///
/// `null` anywhere in the document is rejected with
/// [`DocumentError::UnsupportedHashType`].
pub fn hash(value: &Value) -> Result<u64> {
    let mut hasher = Xxh64::new(0);
    match value {
        Value::Object(map) => feed_object(&mut hasher, map)?,
        other => feed(&mut hasher, "", other)?,
    }
    Ok(hasher.digest())
}

/// [`hash`] as standard base64 of the big-endian digest bytes.
pub fn hash_str(value: &Value) -> Result<String> {
    hash(value).map(|digest| STANDARD.encode(digest.to_be_bytes()))
}

fn feed_object(hasher: &mut Xxh64, map: &Map<String, Value>) -> Result<()> {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    for (key, value) in entries {
        hasher.update(key.as_bytes());
        feed(hasher, key, value)?;
    }
    Ok(())
}

/// `key` is the nearest object key above `value`, used in error reports.
fn feed(hasher: &mut Xxh64, key: &str, value: &Value) -> Result<()> {
    match value {
        Value::String(s) => hasher.update(s.as_bytes()),
        Value::Bool(true) => hasher.update(b"true"),
        Value::Bool(false) => hasher.update(b"false"),
        Value::Number(n) => hasher.update(number_text(n).as_bytes()),
        Value::Object(map) => feed_object(hasher, map)?,
        Value::Array(items) => {
            for item in items {
                feed(hasher, key, item)?;
            }
        }
        Value::Null => {
            return Err(DocumentError::UnsupportedHashType {
                key: key.to_string(),
                kind: kind_name(value),
            })
        }
    }
    Ok(())
}

/// Every number is read as `f64` and rendered with six fractional digits,
/// so `1` and `1.0` hash alike.
fn number_text(n: &Number) -> String {
    format!("{:.6}", n.as_f64().unwrap_or_default())
}
