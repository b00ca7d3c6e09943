//! Output promotion and stale-file cleanup.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::manifest::{FileEntry, RunManifest, manifest_path};
use crate::{Error, Result, hashing};

/// What [`promote`] did, for reporting.
#[derive(Debug, Clone, Default)]
pub struct PromoteOutcome {
    /// New manifest entries, sorted by path
    pub entries: Vec<FileEntry>,
    /// Files that did not exist before
    pub created: Vec<String>,
    /// Files whose content changed
    pub updated: Vec<String>,
    /// Files left in place because their content is identical
    pub unchanged: Vec<String>,
    /// Stale files deleted from the output directory
    pub deleted: Vec<String>,
}

/// What [`clean`] did.
#[derive(Debug, Clone, Default)]
pub struct CleanOutcome {
    /// Files deleted (or, on a dry run, that would be deleted)
    pub deleted: Vec<String>,
    /// Manifest entries whose file was already gone
    pub missing: Vec<String>,
    /// Whether a manifest existed for the output directory
    pub had_manifest: bool,
}

/// Promote staged output into the output directory.
///
/// Unchanged files (by content hash) stay in place, new and changed
/// files are copied over, and files recorded in the previous manifest
/// but absent from the new output are deleted, pruning directories the
/// deletions leave empty. Nothing outside `output_dir` is ever touched:
/// staged paths and manifest paths both pass the sandbox check first.
pub fn promote(
    staged_root: &Path,
    output_dir: &Path,
    previous: Option<&RunManifest>,
) -> Result<PromoteOutcome> {
    let staged = collect_files(staged_root)?;
    let staged_set: HashSet<&str> = staged.iter().map(String::as_str).collect();

    fs::create_dir_all(output_dir).map_err(|e| {
        Error::reconciliation_io(
            format!("failed to create output directory '{}'", output_dir.display()),
            e,
        )
    })?;

    let mut outcome = PromoteOutcome::default();

    for rel in &staged {
        let rel_path = rel_to_path(rel);
        let from = staged_root.join(&rel_path);
        let to = output_dir.join(&rel_path);

        let staged_hash = hashing::hash_file(&from).map_err(|e| {
            Error::reconciliation_io(format!("failed to read staged file '{rel}'"), e)
        })?;

        match hashing::hash_file(&to) {
            Ok(existing) if existing == staged_hash => outcome.unchanged.push(rel.clone()),
            Ok(_) => {
                copy_into(&from, &to).map_err(|e| {
                    Error::reconciliation_io(format!("failed to replace '{rel}'"), e)
                })?;
                outcome.updated.push(rel.clone());
            }
            Err(_) => {
                copy_into(&from, &to)
                    .map_err(|e| Error::reconciliation_io(format!("failed to write '{rel}'"), e))?;
                outcome.created.push(rel.clone());
            }
        }

        outcome.entries.push(FileEntry {
            path: rel.clone(),
            hash: staged_hash,
        });
    }

    // Stale files: recorded by the previous run but not produced now.
    // The manifest is an ordinary file on disk, so its paths are not
    // trusted either.
    if let Some(previous) = previous {
        for entry in &previous.files {
            if staged_set.contains(entry.path.as_str()) {
                continue;
            }
            let rel_path = rel_to_path(&entry.path);
            ensure_sandboxed(&rel_path)?;

            let target = output_dir.join(&rel_path);
            match fs::remove_file(&target) {
                Ok(()) => {
                    debug!(path = %entry.path, "removed stale generated file");
                    outcome.deleted.push(entry.path.clone());
                    prune_empty_dirs(output_dir, rel_path.parent());
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(Error::reconciliation_io(
                        format!("failed to delete stale file '{}'", entry.path),
                        e,
                    ));
                }
            }
        }
    }

    // Engine output ordering is untrusted; the manifest is always sorted.
    outcome.entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(outcome)
}

/// Delete everything the manifest attributes to the output directory,
/// then the manifest itself. With `dry_run`, only report.
pub fn clean(work_dir: &Path, output_dir: &Path, dry_run: bool) -> Result<CleanOutcome> {
    let manifest_file = manifest_path(work_dir, output_dir);
    let Some(manifest) = RunManifest::load(&manifest_file) else {
        return Ok(CleanOutcome::default());
    };

    let output_root = work_dir.join(output_dir);
    let mut outcome = CleanOutcome {
        had_manifest: true,
        ..CleanOutcome::default()
    };

    for entry in &manifest.files {
        let rel_path = rel_to_path(&entry.path);
        ensure_sandboxed(&rel_path)?;

        let target = output_root.join(&rel_path);
        if !target.exists() {
            outcome.missing.push(entry.path.clone());
            continue;
        }
        if dry_run {
            outcome.deleted.push(entry.path.clone());
            continue;
        }
        match fs::remove_file(&target) {
            Ok(()) => {
                outcome.deleted.push(entry.path.clone());
                prune_empty_dirs(&output_root, rel_path.parent());
            }
            Err(e) => {
                return Err(Error::reconciliation_io(
                    format!("failed to delete '{}'", entry.path),
                    e,
                ));
            }
        }
    }

    if !dry_run {
        if let Err(e) = fs::remove_file(&manifest_file) {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(Error::reconciliation_io("failed to delete run manifest", e));
            }
        }
    }

    Ok(outcome)
}

/// Reject relative paths that could reach outside the output directory.
pub(crate) fn ensure_sandboxed(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::reconciliation("empty generated file path"));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(Error::reconciliation(format!(
                    "generated path '{}' escapes the output directory",
                    path.display()
                )));
            }
        }
    }
    Ok(())
}

/// Collect regular files under `root` as sorted `/`-separated relative
/// paths. Symlinks are rejected: a link pointing outside the staging
/// area would smuggle content past the sandbox.
fn collect_files(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    walk(root, root, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(root: &Path, dir: &Path, files: &mut Vec<String>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| {
        Error::reconciliation_io(format!("failed to scan '{}'", dir.display()), e)
    })?;

    for entry in entries {
        let entry = entry
            .map_err(|e| Error::reconciliation_io("failed to scan staging output", e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| Error::reconciliation_io("failed to scan staging output", e))?;

        if file_type.is_symlink() {
            return Err(Error::reconciliation(format!(
                "engine produced a symlink '{}', which is not allowed",
                path.display()
            )));
        }
        if file_type.is_dir() {
            walk(root, &path, files)?;
        } else {
            let rel = path.strip_prefix(root).expect("walked path under root");
            ensure_sandboxed(rel)?;
            files.push(path_to_rel(rel));
        }
    }
    Ok(())
}

fn copy_into(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}

/// Remove directories left empty by a deletion, walking up toward the
/// output root. `remove_dir` refuses non-empty directories, which is
/// exactly the stop condition.
fn prune_empty_dirs(root: &Path, mut dir: Option<&Path>) {
    while let Some(d) = dir {
        if d.as_os_str().is_empty() {
            break;
        }
        if fs::remove_dir(root.join(d)).is_err() {
            break;
        }
        dir = d.parent();
    }
}

fn rel_to_path(rel: &str) -> PathBuf {
    rel.split('/').collect()
}

fn path_to_rel(path: &Path) -> String {
    let segments: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_sandbox_rejects_parent_components() {
        assert!(ensure_sandboxed(Path::new("com/example/Tables.java")).is_ok());
        assert!(ensure_sandboxed(Path::new("../evil.java")).is_err());
        assert!(ensure_sandboxed(Path::new("a/../../evil.java")).is_err());
        assert!(ensure_sandboxed(Path::new("/etc/passwd")).is_err());
        assert!(ensure_sandboxed(Path::new("")).is_err());
    }

    #[test]
    fn test_promote_creates_and_records_files() {
        let temp = tempfile::tempdir().unwrap();
        let staged = temp.path().join("staged");
        let output = temp.path().join("out");
        write(&staged, "com/example/Tables.java", "class Tables {}");
        write(&staged, "com/example/Keys.java", "class Keys {}");

        let outcome = promote(&staged, &output, None).unwrap();

        assert_eq!(outcome.created.len(), 2);
        assert!(outcome.deleted.is_empty());
        assert_eq!(outcome.entries.len(), 2);
        // Entries sorted by path
        assert_eq!(outcome.entries[0].path, "com/example/Keys.java");
        assert!(output.join("com/example/Tables.java").exists());
    }

    #[test]
    fn test_promote_removes_stale_files_and_prunes_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let staged = temp.path().join("staged");
        let output = temp.path().join("out");

        // Previous run produced A and B (B in its own subdirectory).
        write(&output, "com/example/A.java", "class A {}");
        write(&output, "com/old/B.java", "class B {}");
        let previous = RunManifest::new(
            "fp",
            vec![
                FileEntry {
                    path: "com/example/A.java".to_string(),
                    hash: hashing::hash_bytes(b"class A {}"),
                },
                FileEntry {
                    path: "com/old/B.java".to_string(),
                    hash: hashing::hash_bytes(b"class B {}"),
                },
            ],
        );

        // New run produces A (unchanged) and C.
        write(&staged, "com/example/A.java", "class A {}");
        write(&staged, "com/example/C.java", "class C {}");

        let outcome = promote(&staged, &output, Some(&previous)).unwrap();

        assert_eq!(outcome.unchanged, vec!["com/example/A.java"]);
        assert_eq!(outcome.created, vec!["com/example/C.java"]);
        assert_eq!(outcome.deleted, vec!["com/old/B.java"]);
        assert!(!output.join("com/old/B.java").exists());
        assert!(!output.join("com/old").exists(), "empty dir not pruned");
        assert!(output.join("com/example/A.java").exists());

        // A's recorded hash is the unchanged content hash.
        let a = outcome
            .entries
            .iter()
            .find(|e| e.path == "com/example/A.java")
            .unwrap();
        assert_eq!(a.hash, hashing::hash_bytes(b"class A {}"));
    }

    #[test]
    fn test_promote_rejects_tampered_manifest_paths() {
        let temp = tempfile::tempdir().unwrap();
        let staged = temp.path().join("staged");
        let output = temp.path().join("out");
        fs::create_dir_all(&staged).unwrap();

        let victim = temp.path().join("victim.txt");
        fs::write(&victim, "precious").unwrap();

        let tampered = RunManifest::new(
            "fp",
            vec![FileEntry {
                path: "../victim.txt".to_string(),
                hash: "00".to_string(),
            }],
        );

        let err = promote(&staged, &output, Some(&tampered)).unwrap_err();
        assert!(matches!(err, Error::Reconciliation { .. }));
        assert!(victim.exists(), "file outside the sandbox was touched");
    }

    #[cfg(unix)]
    #[test]
    fn test_promote_rejects_symlinked_output() {
        let temp = tempfile::tempdir().unwrap();
        let staged = temp.path().join("staged");
        let output = temp.path().join("out");
        fs::create_dir_all(&staged).unwrap();

        let outside = temp.path().join("outside.java");
        fs::write(&outside, "class Outside {}").unwrap();
        std::os::unix::fs::symlink(&outside, staged.join("Link.java")).unwrap();

        let err = promote(&staged, &output, None).unwrap_err();
        assert!(matches!(err, Error::Reconciliation { .. }));
    }

    #[test]
    fn test_promote_updates_changed_files() {
        let temp = tempfile::tempdir().unwrap();
        let staged = temp.path().join("staged");
        let output = temp.path().join("out");

        write(&output, "Tables.java", "old");
        write(&staged, "Tables.java", "new");

        let outcome = promote(&staged, &output, None).unwrap();
        assert_eq!(outcome.updated, vec!["Tables.java"]);
        assert_eq!(fs::read_to_string(output.join("Tables.java")).unwrap(), "new");
    }

    #[test]
    fn test_clean_without_manifest_is_noop() {
        let temp = tempfile::tempdir().unwrap();
        let outcome = clean(temp.path(), Path::new("gen"), false).unwrap();
        assert!(!outcome.had_manifest);
        assert!(outcome.deleted.is_empty());
    }

    #[test]
    fn test_clean_removes_manifest_files() {
        let temp = tempfile::tempdir().unwrap();
        let output_rel = Path::new("gen");
        let output = temp.path().join(output_rel);
        write(&output, "com/example/Tables.java", "class Tables {}");

        let manifest = RunManifest::new(
            "fp",
            vec![FileEntry {
                path: "com/example/Tables.java".to_string(),
                hash: hashing::hash_bytes(b"class Tables {}"),
            }],
        );
        let manifest_file = manifest_path(temp.path(), output_rel);
        manifest.store(&manifest_file).unwrap();

        // Dry run reports but touches nothing.
        let preview = clean(temp.path(), output_rel, true).unwrap();
        assert_eq!(preview.deleted, vec!["com/example/Tables.java"]);
        assert!(output.join("com/example/Tables.java").exists());
        assert!(manifest_file.exists());

        let outcome = clean(temp.path(), output_rel, false).unwrap();
        assert_eq!(outcome.deleted, vec!["com/example/Tables.java"]);
        assert!(!output.join("com/example/Tables.java").exists());
        assert!(!output.join("com/example").exists());
        assert!(!manifest_file.exists());
    }
}
