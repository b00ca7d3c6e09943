//! Input fingerprinting for the up-to-date check.

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value, json};
use skillet_config::GenerationConfig;

use crate::manifest::RunManifest;
use crate::{Error, Result, hashing};

/// 256-bit digest over the fingerprint-relevant configuration and the
/// full content of every referenced schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint for a config resolved against `work_dir`.
    ///
    /// Schema files are read in full and hashed in path-sorted order, so
    /// declaration shuffles of unrelated entries cannot flip the digest
    /// while any content or path change does. Credential references
    /// contribute only the environment variable *name*.
    pub fn compute(config: &GenerationConfig, work_dir: &Path) -> Result<Self> {
        let mut inputs: Vec<(String, String)> = Vec::new();
        for source in &config.schema_sources {
            if let Some(path) = &source.path {
                let absolute = work_dir.join(path);
                let hash = hashing::hash_file(&absolute).map_err(|e| Error::Input {
                    path: absolute.clone(),
                    source: e,
                })?;
                inputs.push((slash_path(path), hash));
            }
        }
        inputs.sort();

        let preimage = hashing::to_canonical_json(&fingerprint_view(config, &inputs));
        Ok(Self(hashing::hash_bytes(preimage.as_bytes())))
    }

    /// Full hex digest.
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Shortened digest for log lines and reports.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }

    /// The exact bytes that get hashed; exposed for tests.
    #[cfg(test)]
    pub(crate) fn preimage(config: &GenerationConfig, inputs: &[(String, String)]) -> String {
        hashing::to_canonical_json(&fingerprint_view(config, inputs))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fingerprint-relevant view of the config.
///
/// Everything that influences what the engine emits goes in; the
/// canonical JSON encoding makes map ordering irrelevant. `sources`
/// stays in declaration order because the engine consumes sources in
/// order; `inputs` carries the path-sorted file hashes.
fn fingerprint_view(config: &GenerationConfig, inputs: &[(String, String)]) -> Value {
    let mut flags = Map::new();
    for (key, value) in &config.flags {
        flags.insert(key.clone(), Value::String(value.as_canonical()));
    }

    let sources: Vec<Value> = config
        .schema_sources
        .iter()
        .map(|source| {
            json!({
                "path": source.path.as_deref().map(slash_path),
                "url": source.url.clone(),
                "user": source.user.clone(),
                "password_env": source.password_env.clone(),
            })
        })
        .collect();

    let input_hashes: Vec<Value> = inputs
        .iter()
        .map(|(path, hash)| json!({"path": path, "hash": hash}))
        .collect();

    json!({
        "language": config.language().as_str(),
        "output_dir": slash_path(config.output_dir()),
        "encoding": config.effective_encoding(),
        "engine": {
            "command": config.engine.command.clone(),
            "args": config.engine.args.clone(),
        },
        "jdbc": {
            "url": config.jdbc.url.clone(),
            "user": config.jdbc.user.clone(),
            "password_env": config.jdbc.password_env.clone(),
        },
        "flags": Value::Object(flags),
        "sources": sources,
        "inputs": input_hashes,
    })
}

/// True iff the fingerprint matches the persisted manifest and every
/// recorded output file is still present with its recorded content hash.
/// A manually edited or deleted output file forces regeneration.
pub fn is_up_to_date(current: &Fingerprint, manifest: &RunManifest, output_dir: &Path) -> bool {
    if manifest.fingerprint != current.as_hex() {
        return false;
    }
    manifest.files.iter().all(|entry| {
        let path = output_dir.join(entry.relative_path());
        match hashing::hash_file(&path) {
            Ok(hash) => hash == entry.hash,
            Err(_) => false,
        }
    })
}

/// Platform path rendered with `/` separators.
fn slash_path(path: &Path) -> String {
    let segments: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use skillet_config::parse_str;

    use super::*;

    const BASE: &str = r#"
        [generator]
        language = "java"
        output_dir = "gen"

        [flags]
        records = true
        pojos = "immutable"
    "#;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let config = parse_str(BASE).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let a = Fingerprint::compute(&config, dir.path()).unwrap();
        let b = Fingerprint::compute(&config, dir.path()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_hex().len(), 64);
    }

    #[test]
    fn test_flag_change_changes_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let base = parse_str(BASE).unwrap();
        let flipped = parse_str(&BASE.replace("records = true", "records = false")).unwrap();

        let a = Fingerprint::compute(&base, dir.path()).unwrap();
        let b = Fingerprint::compute(&flipped, dir.path()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_flag_order_is_irrelevant() {
        let dir = tempfile::tempdir().unwrap();
        let reordered = r#"
            [generator]
            language = "java"
            output_dir = "gen"

            [flags]
            pojos = "immutable"
            records = true
        "#;

        let a = Fingerprint::compute(&parse_str(BASE).unwrap(), dir.path()).unwrap();
        let b = Fingerprint::compute(&parse_str(reordered).unwrap(), dir.path()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_schema_file_content_changes_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("db")).unwrap();
        std::fs::write(dir.path().join("db/schema.sql"), "create table a (id int);").unwrap();

        let config = parse_str(
            r#"
            [generator]
            language = "java"
            output_dir = "gen"

            [[schema]]
            path = "db/schema.sql"
            "#,
        )
        .unwrap();

        let before = Fingerprint::compute(&config, dir.path()).unwrap();

        std::fs::write(dir.path().join("db/schema.sql"), "create table b (id int);").unwrap();
        let after = Fingerprint::compute(&config, dir.path()).unwrap();
        assert_ne!(before, after);

        // Content-identical rewrite: same fingerprint despite a fresh mtime.
        std::fs::write(dir.path().join("db/schema.sql"), "create table b (id int);").unwrap();
        assert_eq!(Fingerprint::compute(&config, dir.path()).unwrap(), after);
    }

    #[test]
    fn test_missing_schema_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = parse_str(
            r#"
            [generator]
            language = "java"
            output_dir = "gen"

            [[schema]]
            path = "db/absent.sql"
            "#,
        )
        .unwrap();

        let err = Fingerprint::compute(&config, dir.path()).unwrap_err();
        assert!(matches!(err, Error::Input { .. }));
    }

    #[test]
    fn test_password_env_name_affects_fingerprint_value_does_not() {
        let dir = tempfile::tempdir().unwrap();
        let with_env = |env: &str| {
            parse_str(&format!(
                r#"
                [generator]
                language = "java"
                output_dir = "gen"

                [[schema]]
                url = "jdbc:h2:mem:test"
                password_env = "{env}"
                "#
            ))
            .unwrap()
        };

        let a = Fingerprint::compute(&with_env("DB_PASSWORD"), dir.path()).unwrap();
        let b = Fingerprint::compute(&with_env("OTHER_PASSWORD"), dir.path()).unwrap();
        assert_ne!(a, b);

        // The secret itself is not part of the preimage, only the name.
        let preimage = Fingerprint::preimage(&with_env("DB_PASSWORD"), &[]);
        assert!(preimage.contains("DB_PASSWORD"));
        assert!(!preimage.contains("hunter2"));
    }

    #[test]
    fn test_preimage_canonical_shape() {
        let config = parse_str(BASE).unwrap();
        let preimage = Fingerprint::preimage(&config, &[]);
        insta::assert_snapshot!(
            preimage,
            @r#"{"encoding":"UTF-8","engine":{"args":[],"command":null},"flags":{"pojos":"immutable","records":"true"},"inputs":[],"jdbc":{"password_env":null,"url":null,"user":null},"language":"java","output_dir":"gen","sources":[]}"#
        );
    }
}
