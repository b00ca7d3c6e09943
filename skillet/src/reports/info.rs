//! Info command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data describing the configured task.
#[derive(Debug)]
pub struct InfoReport {
    pub config_path: PathBuf,
    pub language: String,
    pub output_dir: PathBuf,
    pub encoding: String,
    pub engine_command: Option<String>,
    /// Human-readable schema source descriptions, in order.
    pub sources: Vec<String>,
    /// Flag key/value pairs, in declaration order.
    pub flags: Vec<(String, String)>,
    /// Shortened input fingerprint; None when an input is unreadable.
    pub fingerprint: Option<String>,
    /// None when no manifest exists or inputs are unreadable.
    pub up_to_date: Option<bool>,
    pub manifest: Option<ManifestInfo>,
}

/// Summary of the persisted run manifest.
#[derive(Debug)]
pub struct ManifestInfo {
    pub generated_at: String,
    pub file_count: usize,
}

impl Report for InfoReport {
    fn render(&self, out: &mut dyn Output) {
        out.key_value("config", &self.config_path.display().to_string());
        out.key_value("language", &self.language);
        out.key_value("output", &self.output_dir.display().to_string());
        out.key_value("encoding", &self.encoding);
        out.key_value(
            "engine",
            self.engine_command.as_deref().unwrap_or("(not configured)"),
        );

        if !self.sources.is_empty() {
            out.newline();
            out.key_value("schema sources", &self.sources.len().to_string());
            for source in &self.sources {
                out.list_item(source);
            }
        }

        if !self.flags.is_empty() {
            out.newline();
            out.key_value("flags", &self.flags.len().to_string());
            for (key, value) in &self.flags {
                out.key_value_indented(key, value);
            }
        }

        out.newline();
        match &self.fingerprint {
            Some(fingerprint) => out.key_value("fingerprint", fingerprint),
            None => out.key_value("fingerprint", "(inputs unreadable)"),
        }
        match (&self.manifest, self.up_to_date) {
            (None, _) => out.key_value("state", "never generated"),
            (Some(manifest), fresh) => {
                let state = match fresh {
                    Some(true) => "up to date",
                    Some(false) => "stale",
                    None => "unknown",
                };
                out.key_value("state", state);
                out.key_value_indented("generated at", &manifest.generated_at);
                out.key_value_indented("files", &manifest.file_count.to_string());
            }
        }
    }
}
