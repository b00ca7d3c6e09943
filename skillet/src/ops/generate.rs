//! Generate operation - run the engine for each configured task.

use std::path::{Path, PathBuf};
use std::time::Duration;

use skillet_config::{GenerationConfig, JdbcOverrides};
use skillet_engine::{
    CancelToken, CommandEngine, InvocationResult, Orchestrator, RunOptions,
};
use tracing::warn;

use crate::reports::{GenerateReport, TaskResult, TaskStatus};

/// Options for the generate operation.
pub struct GenerateOptions<'a> {
    /// Working directory that output and schema paths resolve against.
    pub work_dir: &'a Path,
    /// Regenerate even when outputs are up to date.
    pub force: bool,
    /// Kill the engine when it exceeds this budget.
    pub timeout: Option<Duration>,
    /// Connection overrides from the command line.
    pub overrides: JdbcOverrides,
}

/// Execute the generate operation over a set of (path, config) tasks.
///
/// Per-task failures land in the report rather than aborting the whole
/// run, so independent tasks still complete.
pub fn generate(
    configs: Vec<(PathBuf, GenerationConfig)>,
    opts: GenerateOptions,
) -> GenerateReport {
    let mut warnings = Vec::new();
    let mut tasks = Vec::new();

    for (path, mut config) in configs {
        for warning in config.apply_overrides(&opts.overrides) {
            warn!(config = %path.display(), "{warning}");
            warnings.push(format!("{}: {}", path.display(), warning));
        }

        let status = run_task(&config, &opts);
        tasks.push(TaskResult {
            config_path: path,
            output_dir: config.output_dir().to_path_buf(),
            status,
        });
    }

    GenerateReport { warnings, tasks }
}

fn run_task(config: &GenerationConfig, opts: &GenerateOptions) -> TaskStatus {
    let engine = match CommandEngine::from_section(&config.engine) {
        Ok(engine) => engine,
        Err(error) => {
            return TaskStatus::Failed {
                message: error.to_string(),
                diagnostics: None,
            };
        }
    };

    let orchestrator = Orchestrator::with_options(
        &engine,
        RunOptions {
            force: opts.force,
            timeout: opts.timeout,
            cancel: CancelToken::new(),
        },
    );

    match orchestrator.run(config, opts.work_dir) {
        InvocationResult::Skipped { fingerprint } => TaskStatus::Skipped {
            fingerprint: fingerprint.short().to_string(),
        },
        InvocationResult::Succeeded { outcome, .. } => TaskStatus::Generated {
            created: outcome.created.len(),
            updated: outcome.updated.len(),
            unchanged: outcome.unchanged.len(),
            total: outcome.entries.len(),
            deleted: outcome.deleted,
        },
        InvocationResult::Failed(error) => TaskStatus::Failed {
            diagnostics: error.diagnostics().map(String::from),
            message: error.to_string(),
        },
    }
}
