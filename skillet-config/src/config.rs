//! Root configuration for a single generation task.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    EngineSection, FlagValue, JdbcDefaults, JdbcOverrides, OverrideWarning, SchemaSource,
    TargetLanguage,
};

/// Encoding used when `generator.encoding` is unset.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Root schema for skillet.toml.
///
/// Treated as immutable after parsing, with the single exception of
/// [`GenerationConfig::apply_overrides`], which the CLI uses before
/// handing the config to the orchestrator.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Generator target settings
    pub generator: GeneratorSection,

    /// How to launch the external engine
    #[serde(default)]
    pub engine: EngineSection,

    /// Connection defaults for database schema sources
    #[serde(default)]
    pub jdbc: JdbcDefaults,

    /// Ordered schema sources the engine reads
    #[serde(default, rename = "schema")]
    pub schema_sources: Vec<SchemaSource>,

    /// Generation strategy flags, in declaration order
    #[serde(default)]
    pub flags: IndexMap<String, FlagValue>,
}

/// The `[generator]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorSection {
    /// Language the engine emits
    pub language: TargetLanguage,

    /// Where generated sources land, relative to the working directory
    pub output_dir: PathBuf,

    /// Encoding of generated files. Defaults to UTF-8; Kotlin output is
    /// always UTF-8.
    pub encoding: Option<String>,
}

impl GenerationConfig {
    /// Value-level validation, without source spans.
    ///
    /// Configs parsed through [`crate::parse_str`] have already passed
    /// this; callers constructing configs in code run it before use.
    pub fn validate(&self) -> std::result::Result<(), crate::ValueError> {
        crate::validate::validate(self)
    }

    pub fn language(&self) -> TargetLanguage {
        self.generator.language
    }

    pub fn output_dir(&self) -> &Path {
        &self.generator.output_dir
    }

    /// Encoding of the generated files.
    pub fn effective_encoding(&self) -> &str {
        self.generator
            .encoding
            .as_deref()
            .unwrap_or(DEFAULT_ENCODING)
    }

    /// Apply command-line connection overrides.
    ///
    /// Returns one warning per config-file value the overrides shadow,
    /// matching the wrapped engine's behavior of announcing ignored
    /// configuration rather than silently dropping it.
    pub fn apply_overrides(&mut self, overrides: &JdbcOverrides) -> Vec<OverrideWarning> {
        let mut warnings = Vec::new();

        if let Some(url) = &overrides.url {
            shadow(&mut self.jdbc.url, url, "jdbc.url", &mut warnings);
            for (i, source) in self.schema_sources.iter_mut().enumerate() {
                if source.is_database() {
                    shadow(
                        &mut source.url,
                        url,
                        &format!("schema[{i}].url"),
                        &mut warnings,
                    );
                }
            }
        }

        if let Some(user) = &overrides.user {
            shadow(&mut self.jdbc.user, user, "jdbc.user", &mut warnings);
            for (i, source) in self.schema_sources.iter_mut().enumerate() {
                if source.is_database() && source.user.is_some() {
                    shadow(
                        &mut source.user,
                        user,
                        &format!("schema[{i}].user"),
                        &mut warnings,
                    );
                }
            }
        }

        if let Some(password_env) = &overrides.password_env {
            shadow(
                &mut self.jdbc.password_env,
                password_env,
                "jdbc.password_env",
                &mut warnings,
            );
            for (i, source) in self.schema_sources.iter_mut().enumerate() {
                if source.is_database() && source.password_env.is_some() {
                    shadow(
                        &mut source.password_env,
                        password_env,
                        &format!("schema[{i}].password_env"),
                        &mut warnings,
                    );
                }
            }
        }

        warnings
    }
}

/// Replace `slot` with `value`, recording a warning when a different
/// config-file value gets shadowed.
fn shadow(slot: &mut Option<String>, value: &str, key: &str, warnings: &mut Vec<OverrideWarning>) {
    if let Some(existing) = slot.as_deref() {
        if !existing.is_empty() && existing != value {
            warnings.push(OverrideWarning {
                key: key.to_string(),
                ignored: existing.to_string(),
            });
        }
    }
    *slot = Some(value.to_string());
}
