//! Clean command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from the clean operation.
#[derive(Debug)]
pub struct CleanReport {
    pub dry_run: bool,
    pub output_dir: PathBuf,
    pub had_manifest: bool,
    /// Files deleted (or that would be, on a dry run).
    pub deleted: Vec<String>,
    /// Manifest entries whose file was already gone.
    pub missing: Vec<String>,
}

impl Report for CleanReport {
    fn render(&self, out: &mut dyn Output) {
        if !self.had_manifest {
            out.preformatted(&format!(
                "no run manifest for {}; nothing to clean",
                self.output_dir.display()
            ));
            return;
        }

        let verb = if self.dry_run { "would delete" } else { "deleted" };
        out.key_value(
            &format!("{verb} from {}", self.output_dir.display()),
            &self.deleted.len().to_string(),
        );
        for path in &self.deleted {
            out.removed_item(path);
        }

        if !self.missing.is_empty() {
            out.newline();
            out.key_value("already missing", &self.missing.len().to_string());
            for path in &self.missing {
                out.list_item(path);
            }
        }
    }
}
