//! Schema-source descriptors.

use std::path::PathBuf;

use serde::Deserialize;

/// One entry of the ordered `[[schema]]` list: either a schema file on
/// disk or a database connection to introspect.
///
/// The two forms are mutually exclusive; `user` and `password_env` only
/// apply to the connection form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSource {
    /// Path to a schema file, relative to the working directory
    pub path: Option<PathBuf>,

    /// JDBC url of a database to introspect
    pub url: Option<String>,

    /// Database user (connection form only)
    pub user: Option<String>,

    /// Environment variable holding the password (connection form only)
    pub password_env: Option<String>,
}

impl SchemaSource {
    /// Shorthand for a file source.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Shorthand for a connection source.
    pub fn database(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn is_file(&self) -> bool {
        self.path.is_some() && self.url.is_none()
    }

    pub fn is_database(&self) -> bool {
        self.url.is_some() && self.path.is_none()
    }

    pub(crate) fn malformed_reason(&self) -> Option<&'static str> {
        match (&self.path, &self.url) {
            (Some(_), Some(_)) => Some("a schema source cannot set both `path` and `url`"),
            (None, None) => Some("a schema source must set either `path` or `url`"),
            (Some(_), None) if self.user.is_some() || self.password_env.is_some() => {
                Some("`user` and `password_env` only apply to sources with `url`")
            }
            _ => None,
        }
    }
}
