//! Info operation - describe the configured task and its freshness.

use std::path::Path;

use skillet_config::GenerationConfig;
use skillet_engine::{Fingerprint, RunManifest, is_up_to_date, manifest_path};

use crate::reports::{InfoReport, ManifestInfo};

/// Execute the info operation.
pub fn info(config: &GenerationConfig, config_path: &Path, work_dir: &Path) -> InfoReport {
    let sources: Vec<String> = config
        .schema_sources
        .iter()
        .map(|source| match (&source.path, &source.url) {
            (Some(path), _) => format!("file {}", path.display()),
            (None, Some(url)) => format!("database {url}"),
            (None, None) => "(malformed source)".to_string(),
        })
        .collect();

    let flags: Vec<(String, String)> = config
        .flags
        .iter()
        .map(|(key, value)| (key.clone(), value.as_canonical()))
        .collect();

    let manifest_file = manifest_path(work_dir, config.output_dir());
    let manifest = RunManifest::load(&manifest_file);

    let (fingerprint, up_to_date) = match Fingerprint::compute(config, work_dir) {
        Ok(fingerprint) => {
            let output_dir = work_dir.join(config.output_dir());
            let fresh = manifest
                .as_ref()
                .map(|m| is_up_to_date(&fingerprint, m, &output_dir));
            (Some(fingerprint.short().to_string()), fresh)
        }
        Err(_) => (None, None),
    };

    InfoReport {
        config_path: config_path.to_path_buf(),
        language: config.language().to_string(),
        output_dir: config.output_dir().to_path_buf(),
        encoding: config.effective_encoding().to_string(),
        engine_command: config.engine.command.clone(),
        sources,
        flags,
        fingerprint,
        up_to_date,
        manifest: manifest.map(|m| ManifestInfo {
            generated_at: m.generated_at.to_rfc3339(),
            file_count: m.files.len(),
        }),
    }
}
