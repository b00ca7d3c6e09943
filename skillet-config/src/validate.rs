//! Value-level validation, independent of source spans.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use miette::SourceSpan;
use thiserror::Error;

use crate::{GenerationConfig, Result, TargetLanguage, flags};

/// Validation failures that need no source-file context.
///
/// The parse path wraps these into [`crate::Error`] with a span pointing
/// into skillet.toml; library callers constructing configs in code get
/// them directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("generator.output_dir must not be empty")]
    EmptyOutputDir,

    #[error("generator.output_dir must be relative to the working directory, got '{0}'")]
    AbsoluteOutputDir(String),

    #[error("generator.output_dir must stay inside the working directory, got '{0}'")]
    OutputDirEscapes(String),

    #[error("schema source #{index}: {reason}")]
    MalformedSource { index: usize, reason: &'static str },

    #[error("unknown {language} flag '{key}'")]
    UnknownFlag {
        key: String,
        language: TargetLanguage,
    },

    #[error("generator.encoding must be UTF-8 for Kotlin, got '{0}'")]
    KotlinEncoding(String),

    #[error("engine.command must not be blank when set")]
    BlankEngineCommand,
}

/// Validate a parsed config. Pure; performs no I/O.
pub(crate) fn validate(config: &GenerationConfig) -> std::result::Result<(), ValueError> {
    let output_dir = config.generator.output_dir.as_path();
    if output_dir.as_os_str().is_empty() {
        return Err(ValueError::EmptyOutputDir);
    }
    if output_dir.is_absolute() {
        return Err(ValueError::AbsoluteOutputDir(
            output_dir.display().to_string(),
        ));
    }
    if escapes_parent(output_dir) {
        return Err(ValueError::OutputDirEscapes(
            output_dir.display().to_string(),
        ));
    }

    if let Some(command) = &config.engine.command {
        if command.trim().is_empty() {
            return Err(ValueError::BlankEngineCommand);
        }
    }

    if config.generator.language == TargetLanguage::Kotlin {
        if let Some(encoding) = &config.generator.encoding {
            if !encoding.eq_ignore_ascii_case("utf-8") {
                return Err(ValueError::KotlinEncoding(encoding.clone()));
            }
        }
    }

    for (index, source) in config.schema_sources.iter().enumerate() {
        if let Some(reason) = source.malformed_reason() {
            return Err(ValueError::MalformedSource { index, reason });
        }
    }

    for key in config.flags.keys() {
        if !flags::is_known_flag(config.generator.language, key) {
            return Err(ValueError::UnknownFlag {
                key: key.clone(),
                language: config.generator.language,
            });
        }
    }

    Ok(())
}

/// True when the relative path's `..` components climb above its root.
fn escapes_parent(path: &Path) -> bool {
    let mut depth: i32 = 0;
    for component in path.components() {
        match component {
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return true;
                }
            }
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return true,
        }
    }
    false
}

/// Check that no two configured tasks share an output directory.
///
/// Distinct output directories are what make lock-free concurrent runs
/// safe, so a collision is rejected before any task starts.
pub fn ensure_distinct_output_dirs(configs: &[GenerationConfig]) -> Result<()> {
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();
    for (index, config) in configs.iter().enumerate() {
        let normalized = normalize(config.output_dir());
        if seen.insert(normalized, index).is_some() {
            return Err(Box::new(crate::Error::DuplicateOutputDir {
                dir: config.output_dir().to_path_buf(),
            }));
        }
    }
    Ok(())
}

/// Drop `.` components so `gen` and `./gen` collide.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Find the span of a table key in the TOML source.
///
/// Matches `key` followed by `=` (table entries) or `]` (headers), with
/// the preceding character ruling out matches inside longer identifiers
/// or quoted strings.
pub(crate) fn find_key_span(src: &str, key: &str) -> Option<SourceSpan> {
    let bytes = src.as_bytes();
    let mut search_from = 0;
    while let Some(pos) = src[search_from..].find(key) {
        let at = search_from + pos;
        let end = at + key.len();

        let before_ok = at == 0
            || matches!(
                bytes[at - 1],
                b' ' | b'\t' | b'\n' | b'{' | b',' | b'[' | b'.'
            );
        let after = src[end..].trim_start();
        let after_ok = after.starts_with('=') || after.starts_with(']') || after.starts_with('.');

        if before_ok && after_ok {
            return Some(SourceSpan::from((at, key.len())));
        }
        search_from = end;
    }
    None
}
