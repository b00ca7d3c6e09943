//! Clean operation - remove generated files recorded in the manifest.

use std::path::Path;

use eyre::{Result, WrapErr};
use skillet_config::GenerationConfig;

use crate::reports::CleanReport;

/// Execute the clean operation.
pub fn clean(config: &GenerationConfig, work_dir: &Path, dry_run: bool) -> Result<CleanReport> {
    let outcome = skillet_engine::clean(work_dir, config.output_dir(), dry_run)
        .wrap_err("Failed to clean generated files")?;

    Ok(CleanReport {
        dry_run,
        output_dir: config.output_dir().to_path_buf(),
        had_manifest: outcome.had_manifest,
        deleted: outcome.deleted,
        missing: outcome.missing,
    })
}
