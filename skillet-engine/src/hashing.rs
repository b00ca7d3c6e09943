//! Content hashing and canonical JSON serialization.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

/// Hash a byte string, hex-encoded.
pub(crate) fn hash_bytes(input: &[u8]) -> String {
    blake3::hash(input).to_hex().to_string()
}

/// Hash a file's full contents.
///
/// Content-based on purpose: mtimes lie under checkout timestamp resets,
/// content never does.
pub(crate) fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut file = std::fs::File::open(path)?;
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Canonical JSON: object keys sorted, no insignificant whitespace.
/// Structurally equal values always serialize to identical bytes.
pub(crate) fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => serde_json::to_string(s).expect("string serialization"),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let mut tree = BTreeMap::new();
            for (k, v) in map {
                tree.insert(k, to_canonical_json(v));
            }
            let items: Vec<String> = tree
                .into_iter()
                .map(|(k, v)| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(&k).expect("key serialization"),
                        v
                    )
                })
                .collect();
            format!("{{{}}}", items.join(","))
        }
    }
}
