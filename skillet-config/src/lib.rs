// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod config;
mod engine;
mod error;
mod file;
mod flags;
mod jdbc;
mod language;
mod source;
mod validate;

use std::path::Path;

pub use config::{DEFAULT_ENCODING, GenerationConfig, GeneratorSection};
pub use engine::EngineSection;
pub use error::{Error, Result, SourceContext};
pub use file::SkilletToml;
pub use flags::{FlagValue, known_flags};
pub use jdbc::{JdbcDefaults, JdbcOverrides, OverrideWarning};
pub use language::TargetLanguage;
pub use source::SchemaSource;
pub use validate::{ValueError, ensure_distinct_output_dirs};

/// Parse a skillet.toml file from the given path
pub fn parse_file(path: impl AsRef<Path>) -> Result<GenerationConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source: e,
        })
    })?;
    let filename = path.display().to_string();
    parse_str_with_filename(&content, &filename)
}

/// Parse a skillet.toml from a string (uses "skillet.toml" as default filename)
pub fn parse_str(content: &str) -> Result<GenerationConfig> {
    parse_str_with_filename(content, "skillet.toml")
}

/// Parse a skillet.toml from a string with a custom filename for error reporting
pub fn parse_str_with_filename(content: &str, filename: &str) -> Result<GenerationConfig> {
    let config: GenerationConfig =
        toml::from_str(content).map_err(|e| Error::parse(e, content, filename))?;

    let ctx = SourceContext::new(content, filename);
    validate::validate(&config).map_err(|e| Error::from_value(e, &ctx))?;
    Ok(config)
}
