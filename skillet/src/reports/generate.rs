//! Generate command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from the generate operation.
#[derive(Debug)]
pub struct GenerateReport {
    /// Override warnings, one per shadowed config value.
    pub warnings: Vec<String>,
    /// Per-task outcomes, in invocation order.
    pub tasks: Vec<TaskResult>,
}

/// Outcome of one generation task.
#[derive(Debug)]
pub struct TaskResult {
    /// Config file the task came from.
    pub config_path: PathBuf,
    /// Output directory, relative to the working directory.
    pub output_dir: PathBuf,
    pub status: TaskStatus,
}

/// What happened to a single task.
#[derive(Debug)]
pub enum TaskStatus {
    /// Output was already valid for the current inputs.
    Skipped { fingerprint: String },
    /// The engine ran and the output directory was reconciled.
    Generated {
        created: usize,
        updated: usize,
        unchanged: usize,
        total: usize,
        deleted: Vec<String>,
    },
    /// The task failed; `diagnostics` carries engine output when present.
    Failed {
        message: String,
        diagnostics: Option<String>,
    },
}

impl GenerateReport {
    /// Number of tasks that failed.
    pub fn failed_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(t.status, TaskStatus::Failed { .. }))
            .count()
    }
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        for task in &self.tasks {
            let label = format!(
                "{} -> {}",
                task.config_path.display(),
                task.output_dir.display()
            );
            match &task.status {
                TaskStatus::Skipped { fingerprint } => {
                    out.key_value(&label, &format!("up to date ({fingerprint})"));
                }
                TaskStatus::Generated {
                    created,
                    updated,
                    unchanged,
                    total,
                    deleted,
                } => {
                    out.key_value(
                        &label,
                        &format!(
                            "{total} files ({created} new, {updated} updated, {unchanged} unchanged)"
                        ),
                    );
                    for path in deleted {
                        out.removed_item(path);
                    }
                }
                TaskStatus::Failed {
                    message,
                    diagnostics,
                } => {
                    out.warning(&format!("{label}: {message}"));
                    if let Some(diagnostics) = diagnostics {
                        out.preformatted(diagnostics);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_count() {
        let report = GenerateReport {
            warnings: Vec::new(),
            tasks: vec![
                TaskResult {
                    config_path: "a.toml".into(),
                    output_dir: "gen/a".into(),
                    status: TaskStatus::Skipped {
                        fingerprint: "abc".to_string(),
                    },
                },
                TaskResult {
                    config_path: "b.toml".into(),
                    output_dir: "gen/b".into(),
                    status: TaskStatus::Failed {
                        message: "engine exploded".to_string(),
                        diagnostics: None,
                    },
                },
            ],
        };
        assert_eq!(report.failed_count(), 1);
    }
}
