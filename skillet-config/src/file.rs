use std::path::{Path, PathBuf};

use crate::{GenerationConfig, Result};

/// Represents a skillet.toml file with both raw content and parsed config.
pub struct SkilletToml {
    path: PathBuf,
    content: String,
    config: GenerationConfig,
}

impl SkilletToml {
    /// Open and parse a skillet.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(crate::Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let filename = path.display().to_string();
        let config = crate::parse_str_with_filename(&content, &filename)?;

        Ok(Self {
            path,
            content,
            config,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the raw content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the parsed config.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Consume the wrapper, keeping only the parsed config.
    pub fn into_config(self) -> GenerationConfig {
        self.config
    }
}
