//! Top-level run sequencing.
//!
//! One invocation walks INIT → FINGERPRINTING → either UP_TO_DATE
//! (skip) or INVOKING → RECONCILING → DONE. Every failure path leaves
//! the persisted manifest in its last-known-good state.

use std::path::Path;
use std::time::Duration;

use skillet_config::GenerationConfig;
use tracing::{debug, info};

use crate::invoke::{CancelToken, EngineRequest, GeneratorEngine, InvokeControl};
use crate::manifest::{RunManifest, manifest_path};
use crate::reconcile::{PromoteOutcome, promote};
use crate::{Error, Fingerprint, Result, is_up_to_date};

/// Options for a single orchestrator run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Regenerate even when the fingerprint says up to date
    pub force: bool,
    /// Kill the engine when it exceeds this budget
    pub timeout: Option<Duration>,
    /// Cooperative cancellation handle
    pub cancel: CancelToken,
}

/// Outcome of one orchestrator run.
#[derive(Debug)]
pub enum InvocationResult {
    /// Prior output is valid; nothing was touched.
    Skipped { fingerprint: Fingerprint },
    /// The engine ran and the output directory was reconciled.
    Succeeded {
        manifest: RunManifest,
        outcome: PromoteOutcome,
    },
    /// The run failed; the manifest keeps its last-known-good state.
    Failed(Error),
}

impl InvocationResult {
    pub fn is_skipped(&self) -> bool {
        matches!(self, InvocationResult::Skipped { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, InvocationResult::Failed(_))
    }
}

/// Sequences fingerprint → skip-or-invoke → reconcile → persist.
///
/// Holds no state across invocations beyond the persisted manifest, so
/// independent tasks with distinct output directories can run on
/// separate threads without coordination.
pub struct Orchestrator<'e> {
    engine: &'e dyn GeneratorEngine,
    options: RunOptions,
}

impl<'e> Orchestrator<'e> {
    pub fn new(engine: &'e dyn GeneratorEngine) -> Self {
        Self {
            engine,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(engine: &'e dyn GeneratorEngine, options: RunOptions) -> Self {
        Self { engine, options }
    }

    /// Run one generation task rooted at `work_dir`.
    ///
    /// Errors are folded into [`InvocationResult::Failed`] so the caller
    /// gets exactly one of the three terminal states.
    pub fn run(&self, config: &GenerationConfig, work_dir: &Path) -> InvocationResult {
        match self.try_run(config, work_dir) {
            Ok(result) => result,
            Err(error) => InvocationResult::Failed(error),
        }
    }

    fn try_run(&self, config: &GenerationConfig, work_dir: &Path) -> Result<InvocationResult> {
        // Fail fast on a bad config, before any filesystem access.
        config.validate()?;

        let fingerprint = Fingerprint::compute(config, work_dir)?;
        let manifest_file = manifest_path(work_dir, config.output_dir());
        let previous = RunManifest::load(&manifest_file);
        let output_dir = work_dir.join(config.output_dir());

        if !self.options.force {
            if let Some(previous) = &previous {
                if is_up_to_date(&fingerprint, previous, &output_dir) {
                    debug!(fingerprint = fingerprint.short(), "output is up to date");
                    return Ok(InvocationResult::Skipped { fingerprint });
                }
            }
        }

        // Stage inside the working directory so promotion never crosses
        // a filesystem boundary. The TempDir guard cleans up the whole
        // staging area on every exit path.
        let staging = tempfile::Builder::new()
            .prefix(".skillet-stage-")
            .tempdir_in(work_dir)
            .map_err(|e| Error::Staging { source: e })?;
        let target_dir = staging.path().join("out");
        std::fs::create_dir_all(&target_dir).map_err(|e| Error::Staging { source: e })?;

        let request = EngineRequest::resolve(config, work_dir, &target_dir);
        let control = InvokeControl::new(self.options.cancel.clone(), self.options.timeout);

        info!(
            language = config.language().as_str(),
            fingerprint = fingerprint.short(),
            "invoking generation engine"
        );
        self.engine.generate(&request, &control)?;
        // A cancel that raced the engine's exit still aborts before any
        // output is promoted.
        control.check()?;

        let outcome = promote(&target_dir, &output_dir, previous.as_ref())?;
        let manifest = RunManifest::new(fingerprint.as_hex(), outcome.entries.clone());
        manifest.store(&manifest_file)?;

        info!(
            created = outcome.created.len(),
            updated = outcome.updated.len(),
            deleted = outcome.deleted.len(),
            unchanged = outcome.unchanged.len(),
            "generation complete"
        );
        Ok(InvocationResult::Succeeded { manifest, outcome })
    }
}
