use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::validate::{ValueError, find_key_span};

/// Result type for skillet-config operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Encapsulates the config file content and filename so errors can carry
/// a [`NamedSource`] with a span pointing at the offending key.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("create a skillet.toml describing the generation task"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse skillet.toml")]
    #[diagnostic(code(skillet::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(skillet::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("unknown {language} flag '{key}'")]
    #[diagnostic(code(skillet::unknown_flag), help("known {language} flags: {known}"))]
    UnknownFlag {
        #[source_code]
        src: NamedSource<String>,
        #[label("not a known flag")]
        span: Option<SourceSpan>,
        key: String,
        language: String,
        known: String,
    },

    #[error("output directory '{dir}' is used by more than one generation task")]
    #[diagnostic(
        code(skillet::duplicate_output_dir),
        help("concurrent tasks must write to distinct directories")
    )]
    DuplicateOutputDir { dir: PathBuf },
}

impl Error {
    /// Create a parse error from a toml error with source context
    pub fn parse(source: toml::de::Error, src: &str, filename: &str) -> Box<Self> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: NamedSource::new(filename, src.to_string()),
            span,
            source,
        })
    }

    /// Create a validation error with source context
    pub fn validation(message: impl Into<String>, ctx: &SourceContext) -> Box<Self> {
        Box::new(Error::Validation {
            src: ctx.named_source(),
            span: None,
            message: message.into(),
        })
    }

    /// Wrap a value-level validation failure, attaching the span of the
    /// offending key where it can be found in the source.
    pub(crate) fn from_value(error: ValueError, ctx: &SourceContext) -> Box<Self> {
        let span_key = match &error {
            ValueError::EmptyOutputDir
            | ValueError::AbsoluteOutputDir(_)
            | ValueError::OutputDirEscapes(_) => Some("output_dir"),
            ValueError::KotlinEncoding(_) => Some("encoding"),
            ValueError::BlankEngineCommand => Some("command"),
            ValueError::MalformedSource { .. } => Some("schema"),
            ValueError::UnknownFlag { .. } => None,
        };

        if let ValueError::UnknownFlag { key, language } = &error {
            return Box::new(Error::UnknownFlag {
                src: ctx.named_source(),
                span: find_key_span(ctx.src(), key),
                key: key.clone(),
                language: language.to_string(),
                known: crate::flags::known_flags(*language).join(", "),
            });
        }

        let span = span_key.and_then(|key| find_key_span(ctx.src(), key));
        Box::new(Error::Validation {
            src: ctx.named_source(),
            span,
            message: error.to_string(),
        })
    }
}
