//! External engine launch settings.

use serde::Deserialize;

/// How to launch the external code-generation engine.
///
/// `generate` needs a command; `check` and `info` work without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineSection {
    /// Engine executable, resolved through `PATH`
    pub command: Option<String>,

    /// Arguments placed before the request-file argument
    #[serde(default)]
    pub args: Vec<String>,
}
