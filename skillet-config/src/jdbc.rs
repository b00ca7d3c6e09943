//! JDBC connection defaults and per-invocation overrides.

use serde::Deserialize;

/// Connection defaults from `[jdbc]`.
///
/// Database schema sources that do not set their own `user` or
/// `password_env` inherit these values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JdbcDefaults {
    /// Default JDBC url for database sources
    pub url: Option<String>,

    /// Default database user
    pub user: Option<String>,

    /// Name of the environment variable holding the password. The secret
    /// itself never appears in the config, the manifest, or logs.
    pub password_env: Option<String>,
}

/// Command-line overrides applied on top of the parsed config.
///
/// Mirrors the `--url`, `--user`, and `--password-env` options of the
/// `generate` command.
#[derive(Debug, Clone, Default)]
pub struct JdbcOverrides {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password_env: Option<String>,
}

impl JdbcOverrides {
    /// True when no override was given.
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.user.is_none() && self.password_env.is_none()
    }
}

/// A config-file value that a command-line override shadowed.
///
/// Passwords are referenced by environment variable name, so `ignored`
/// is always safe to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideWarning {
    /// Key of the shadowed value, e.g. `jdbc.url`
    pub key: String,
    /// The config-file value that will be ignored
    pub ignored: String,
}

impl std::fmt::Display for OverrideWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "config file sets {} = '{}', which the command-line override replaces",
            self.key, self.ignored
        )
    }
}
