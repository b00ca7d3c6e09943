//! Persisted record of a successful generation run.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result, hashing};

/// Manifest format version.
///
/// Unreadable, unparsable, or differently-versioned manifests are
/// treated as absent, so a version bump (or a corrupted file) forces
/// regeneration instead of misreading stale state.
pub const MANIFEST_VERSION: u32 = 1;

/// What the last successful run produced: the input fingerprint and the
/// per-file content hashes of everything written to the output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub version: u32,
    pub fingerprint: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default, rename = "file")]
    pub files: Vec<FileEntry>,
}

/// One generated file: path relative to the output directory with `/`
/// separators, plus its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub hash: String,
}

impl FileEntry {
    /// The entry's path as a platform path.
    pub fn relative_path(&self) -> PathBuf {
        self.path.split('/').collect()
    }
}

impl RunManifest {
    /// Manifest for a run that just finished. Entries are stored sorted
    /// by path so the file is diff-friendly and engine output ordering
    /// never leaks into it.
    pub fn new(fingerprint: impl Into<String>, mut files: Vec<FileEntry>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            version: MANIFEST_VERSION,
            fingerprint: fingerprint.into(),
            generated_at: Utc::now(),
            files,
        }
    }

    /// Read a manifest, failing closed: any unreadable or unexpected
    /// content counts as "no previous run".
    pub fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        let manifest: RunManifest = match toml::from_str(&content) {
            Ok(manifest) => manifest,
            Err(error) => {
                debug!(path = %path.display(), %error, "ignoring unreadable run manifest");
                return None;
            }
        };
        if manifest.version != MANIFEST_VERSION {
            debug!(
                path = %path.display(),
                version = manifest.version,
                "ignoring run manifest with unsupported version"
            );
            return None;
        }
        Some(manifest)
    }

    /// Persist atomically: write a temp file next to the target, then
    /// rename over it. Readers never observe a half-written manifest.
    pub fn store(&self, path: &Path) -> Result<()> {
        let fail = |message: String| Error::Manifest {
            path: path.to_path_buf(),
            message,
        };

        let content = toml::to_string_pretty(self).map_err(|e| fail(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
        }
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, content).map_err(|e| fail(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| fail(e.to_string()))?;
        Ok(())
    }
}

/// Manifest location for an output directory: one file per output
/// directory under `<work_dir>/.skillet/`, named from a digest of the
/// normalized output path so the generated tree itself stays clean.
pub fn manifest_path(work_dir: &Path, output_dir: &Path) -> PathBuf {
    let normalized: Vec<String> = output_dir
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let key = hashing::hash_bytes(normalized.join("/").as_bytes());
    work_dir.join(".skillet").join(format!("{}.toml", &key[..16]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunManifest {
        RunManifest::new(
            "abc123",
            vec![
                FileEntry {
                    path: "com/example/Tables.java".to_string(),
                    hash: "deadbeef".to_string(),
                },
                FileEntry {
                    path: "com/example/Keys.java".to_string(),
                    hash: "cafebabe".to_string(),
                },
            ],
        )
    }

    #[test]
    fn test_new_sorts_entries() {
        let manifest = sample();
        assert_eq!(manifest.files[0].path, "com/example/Keys.java");
        assert_eq!(manifest.files[1].path, "com/example/Tables.java");
    }

    #[test]
    fn test_store_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.toml");

        let manifest = sample();
        manifest.store(&path).unwrap();

        let loaded = RunManifest::load(&path).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_load_missing_is_none() {
        assert!(RunManifest::load(Path::new("/nonexistent/manifest.toml")).is_none());
    }

    #[test]
    fn test_load_garbage_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.toml");
        std::fs::write(&path, "not a manifest {{{{").unwrap();
        assert!(RunManifest::load(&path).is_none());
    }

    #[test]
    fn test_load_future_version_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.toml");

        let mut manifest = sample();
        manifest.version = MANIFEST_VERSION + 1;
        manifest.store(&path).unwrap();

        assert!(RunManifest::load(&path).is_none());
    }

    #[test]
    fn test_manifest_path_distinct_per_output_dir() {
        let work = Path::new("/work");
        let a = manifest_path(work, Path::new("gen/a"));
        let b = manifest_path(work, Path::new("gen/b"));
        assert_ne!(a, b);
        assert!(a.starts_with("/work/.skillet"));
    }

    #[test]
    fn test_manifest_path_normalizes_curdir() {
        let work = Path::new("/work");
        assert_eq!(
            manifest_path(work, Path::new("gen/a")),
            manifest_path(work, Path::new("./gen/a"))
        );
    }

    #[test]
    fn test_relative_path_splits_segments() {
        let entry = FileEntry {
            path: "com/example/Tables.java".to_string(),
            hash: "00".to_string(),
        };
        let rel = entry.relative_path();
        assert_eq!(rel, PathBuf::from("com").join("example").join("Tables.java"));
    }
}
