//! Check operation - config validation.

use std::path::PathBuf;

use skillet_config::SkilletToml;

use crate::reports::{CheckReport, CheckedFile};

/// Execute the check operation.
///
/// Parses and validates each config, collecting rendered diagnostics
/// instead of aborting on the first bad file.
pub fn check(paths: &[PathBuf]) -> CheckReport {
    let files = paths
        .iter()
        .map(|path| match SkilletToml::open(path) {
            Ok(skillet_toml) => {
                let config = skillet_toml.config();
                CheckedFile {
                    path: path.clone(),
                    error: None,
                    summary: Some(format!(
                        "{} -> {} ({} schema sources, {} flags)",
                        config.language(),
                        config.output_dir().display(),
                        config.schema_sources.len(),
                        config.flags.len()
                    )),
                }
            }
            Err(error) => CheckedFile {
                path: path.clone(),
                error: Some(format!("{:?}", miette::Report::new(*error))),
                summary: None,
            },
        })
        .collect();

    CheckReport { files }
}
