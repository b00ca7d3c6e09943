//! Generator engine invocation.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::Serialize;
use skillet_config::{EngineSection, GenerationConfig};
use tracing::warn;

use crate::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cooperative cancellation handle shared between the caller and a
/// running invocation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Time budget and cancellation for one invocation.
#[derive(Debug, Clone)]
pub struct InvokeControl {
    cancel: CancelToken,
    deadline: Option<Instant>,
    limit: Option<Duration>,
}

impl InvokeControl {
    /// The deadline starts counting now.
    pub fn new(cancel: CancelToken, timeout: Option<Duration>) -> Self {
        Self {
            cancel,
            deadline: timeout.map(|t| Instant::now() + t),
            limit: timeout,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(CancelToken::new(), None)
    }

    /// Err when the budget is exhausted or the caller cancelled.
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::Timeout {
                    limit: self.limit.unwrap_or_default(),
                });
            }
        }
        Ok(())
    }
}

/// Resolved settings handed to the engine.
///
/// Serialized as TOML for subprocess engines; in-process engines consume
/// it directly. Passwords never appear here: sources carry the name of
/// the environment variable the engine resolves itself.
#[derive(Debug, Clone, Serialize)]
pub struct EngineRequest {
    pub language: String,
    pub encoding: String,
    /// Absolute directory the engine must write into (the staging area)
    pub target_dir: PathBuf,
    /// Ordered schema sources, file paths made absolute
    #[serde(rename = "source")]
    pub sources: Vec<RequestSource>,
    /// Strategy flags in canonical textual form, declaration order
    pub flags: IndexMap<String, String>,
}

/// One resolved schema source.
#[derive(Debug, Clone, Serialize)]
pub struct RequestSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,
}

impl EngineRequest {
    /// Resolve a validated config against the working directory.
    ///
    /// Database sources inherit missing `user`/`password_env` from the
    /// `[jdbc]` defaults; a `[jdbc] url` with no `[[schema]]` entries
    /// acts as a single implicit connection source.
    pub fn resolve(config: &GenerationConfig, work_dir: &Path, target_dir: &Path) -> Self {
        let mut sources: Vec<RequestSource> = config
            .schema_sources
            .iter()
            .map(|source| {
                if source.is_database() {
                    RequestSource {
                        path: None,
                        url: source.url.clone(),
                        user: source.user.clone().or_else(|| config.jdbc.user.clone()),
                        password_env: source
                            .password_env
                            .clone()
                            .or_else(|| config.jdbc.password_env.clone()),
                    }
                } else {
                    RequestSource {
                        path: source.path.as_ref().map(|p| work_dir.join(p)),
                        url: None,
                        user: None,
                        password_env: None,
                    }
                }
            })
            .collect();

        if sources.is_empty() {
            if let Some(url) = &config.jdbc.url {
                sources.push(RequestSource {
                    path: None,
                    url: Some(url.clone()),
                    user: config.jdbc.user.clone(),
                    password_env: config.jdbc.password_env.clone(),
                });
            }
        }

        let flags = config
            .flags
            .iter()
            .map(|(key, value)| (key.clone(), value.as_canonical()))
            .collect();

        Self {
            language: config.language().as_str().to_string(),
            encoding: config.effective_encoding().to_string(),
            target_dir: target_dir.to_path_buf(),
            sources,
            flags,
        }
    }
}

/// The external code-generation engine boundary.
///
/// The production implementation spawns a subprocess; tests inject
/// in-process fakes.
pub trait GeneratorEngine: Send + Sync {
    fn generate(&self, request: &EngineRequest, control: &InvokeControl) -> Result<()>;
}

/// Subprocess engine.
///
/// Writes the request file next to the staging target and runs the
/// configured command with the staging area as its working directory,
/// capturing stdout/stderr for diagnostics.
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_section(engine: &EngineSection) -> Result<Self> {
        match &engine.command {
            Some(command) => Ok(Self::new(command.clone(), engine.args.clone())),
            None => Err(Error::MissingEngineCommand),
        }
    }
}

impl GeneratorEngine for CommandEngine {
    fn generate(&self, request: &EngineRequest, control: &InvokeControl) -> Result<()> {
        control.check()?;

        let staging_root = request
            .target_dir
            .parent()
            .unwrap_or(&request.target_dir)
            .to_path_buf();
        let request_file = staging_root.join("request.toml");
        let rendered = toml::to_string_pretty(request)
            .map_err(|e| Error::Staging {
                source: std::io::Error::other(e),
            })?;
        std::fs::write(&request_file, rendered).map_err(|e| Error::Staging { source: e })?;

        warn_unset_password_vars(request);

        let spawn_err = |e: std::io::Error| Error::Spawn {
            command: self.program.clone(),
            source: e,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(&request_file)
            .current_dir(&staging_root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        // Drain the pipes on the side so an engine that logs more than
        // the pipe buffer holds cannot deadlock against our wait loop.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = loop {
            match child.try_wait().map_err(spawn_err)? {
                Some(status) => break status,
                None => {
                    if let Err(interrupt) = control.check() {
                        kill_and_reap(&mut child);
                        return Err(interrupt);
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(Error::Generation {
                status: status.code(),
                diagnostics: compose_diagnostics(&stdout, &stderr),
            })
        }
    }
}

fn drain(pipe: Option<impl Read + Send + 'static>) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buffer);
        }
        buffer
    })
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn compose_diagnostics(stdout: &str, stderr: &str) -> String {
    let mut parts = Vec::new();
    if !stderr.trim().is_empty() {
        parts.push(stderr.trim().to_string());
    }
    if !stdout.trim().is_empty() {
        parts.push(stdout.trim().to_string());
    }
    parts.join("\n")
}

/// A dangling password reference usually means a misconfigured shell or
/// CI secret; say so before the engine fails with a less helpful error.
fn warn_unset_password_vars(request: &EngineRequest) {
    for source in &request.sources {
        if let Some(name) = &source.password_env {
            if std::env::var_os(name).is_none() {
                warn!(
                    variable = %name,
                    "password environment variable referenced by the config is not set"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use skillet_config::parse_str;

    use super::*;

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_control_check_cancelled() {
        let token = CancelToken::new();
        let control = InvokeControl::new(token.clone(), None);
        assert!(control.check().is_ok());

        token.cancel();
        assert!(matches!(control.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_control_check_timeout() {
        let control = InvokeControl::new(CancelToken::new(), Some(Duration::ZERO));
        assert!(matches!(control.check(), Err(Error::Timeout { .. })));
    }

    #[test]
    fn test_resolve_merges_jdbc_defaults() {
        let config = parse_str(
            r#"
            [generator]
            language = "java"
            output_dir = "gen"

            [jdbc]
            user = "app"
            password_env = "APP_DB_PASSWORD"

            [[schema]]
            url = "jdbc:postgresql://localhost/app"

            [[schema]]
            url = "jdbc:postgresql://localhost/audit"
            user = "auditor"
            "#,
        )
        .unwrap();

        let request = EngineRequest::resolve(&config, Path::new("/work"), Path::new("/stage/out"));
        assert_eq!(request.sources.len(), 2);
        assert_eq!(request.sources[0].user.as_deref(), Some("app"));
        assert_eq!(
            request.sources[0].password_env.as_deref(),
            Some("APP_DB_PASSWORD")
        );
        assert_eq!(request.sources[1].user.as_deref(), Some("auditor"));
    }

    #[test]
    fn test_resolve_implicit_source_from_jdbc_url() {
        let config = parse_str(
            r#"
            [generator]
            language = "kotlin"
            output_dir = "gen"

            [jdbc]
            url = "jdbc:h2:mem:test"
            user = "sa"
            "#,
        )
        .unwrap();

        let request = EngineRequest::resolve(&config, Path::new("/work"), Path::new("/stage/out"));
        assert_eq!(request.sources.len(), 1);
        assert_eq!(request.sources[0].url.as_deref(), Some("jdbc:h2:mem:test"));
        assert_eq!(request.language, "kotlin");
        assert_eq!(request.encoding, "UTF-8");
    }

    #[test]
    fn test_resolve_makes_file_paths_absolute() {
        let config = parse_str(
            r#"
            [generator]
            language = "java"
            output_dir = "gen"

            [[schema]]
            path = "db/schema.sql"
            "#,
        )
        .unwrap();

        let request = EngineRequest::resolve(&config, Path::new("/work"), Path::new("/stage/out"));
        assert_eq!(
            request.sources[0].path.as_deref(),
            Some(Path::new("/work/db/schema.sql"))
        );
    }

    #[test]
    fn test_request_serializes_without_password_values() {
        let config = parse_str(
            r#"
            [generator]
            language = "java"
            output_dir = "gen"

            [[schema]]
            url = "jdbc:h2:mem:test"
            password_env = "DB_PASSWORD"
            "#,
        )
        .unwrap();

        let request = EngineRequest::resolve(&config, Path::new("/work"), Path::new("/stage/out"));
        let rendered = toml::to_string_pretty(&request).unwrap();
        assert!(rendered.contains("password_env = \"DB_PASSWORD\""));
        assert!(!rendered.contains("password ="));
    }

    #[test]
    fn test_from_section_requires_command() {
        let missing = EngineSection::default();
        assert!(matches!(
            CommandEngine::from_section(&missing),
            Err(Error::MissingEngineCommand)
        ));
    }
}
