//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from config validation.
#[derive(Debug)]
pub struct CheckReport {
    pub files: Vec<CheckedFile>,
}

/// Validation result for one config file.
#[derive(Debug)]
pub struct CheckedFile {
    pub path: PathBuf,
    /// Rendered diagnostic when the file is invalid.
    pub error: Option<String>,
    /// One-line task summary when the file is valid.
    pub summary: Option<String>,
}

impl CheckReport {
    /// Whether every checked file parsed and validated.
    pub fn is_valid(&self) -> bool {
        self.files.iter().all(|f| f.error.is_none())
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for file in &self.files {
            match &file.error {
                Some(error) => {
                    out.warning(&format!("{} is invalid", file.path.display()));
                    out.preformatted(error);
                }
                None => {
                    let summary = file.summary.as_deref().unwrap_or("ok");
                    out.preformatted(&format!("✓ {} ({summary})", file.path.display()));
                }
            }
        }
    }
}
