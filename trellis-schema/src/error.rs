use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for trellis-schema operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Encapsulates the source content and filename, reducing parameter passing
/// in error factory functions.
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

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a validation error without a span.
    pub fn validation_error(&self, message: impl Into<String>) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span: None,
            message: message.into(),
        })
    }

    /// Create an unknown-type error.
    pub fn unknown_type_error(&self, name: impl Into<String>, context: impl Into<String>) -> Box<Error> {
        Box::new(Error::UnknownType {
            src: self.named_source(),
            span: None,
            name: name.into(),
            context: context.into(),
        })
    }

    /// Create a duplicate-type error.
    pub fn duplicate_type_error(&self, name: impl Into<String>) -> Box<Error> {
        Box::new(Error::DuplicateType {
            src: self.named_source(),
            span: None,
            name: name.into(),
        })
    }

    /// Create an invalid type-reference error.
    pub fn invalid_reference_error(
        &self,
        reference: impl Into<String>,
        reason: impl Into<String>,
    ) -> Box<Error> {
        Box::new(Error::InvalidReference {
            src: self.named_source(),
            span: None,
            reference: reference.into(),
            reason: reason.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("check that the schema file exists and is readable"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema")]
    #[diagnostic(code(trellis::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown type '{name}' referenced by {context}")]
    #[diagnostic(
        code(trellis::unknown_type),
        help("declare '{name}' as a [[types]] entry or reference a builtin System type")
    )]
    UnknownType {
        #[source_code]
        src: NamedSource<String>,
        #[label("referenced here")]
        span: Option<SourceSpan>,
        name: String,
        context: String,
    },

    #[error("type '{name}' is declared more than once")]
    #[diagnostic(
        code(trellis::duplicate_type),
        help("each (namespace, name) pair may only be declared once")
    )]
    DuplicateType {
        #[source_code]
        src: NamedSource<String>,
        #[label("duplicate declaration")]
        span: Option<SourceSpan>,
        name: String,
    },

    #[error("invalid type reference '{reference}'")]
    #[diagnostic(
        code(trellis::invalid_reference),
        help("{reason}. Valid forms: 'Name', 'Ns.Name', 'Name[]', 'Name?', 'Generic<A, B>'")
    )]
    InvalidReference {
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid reference")]
        span: Option<SourceSpan>,
        reference: String,
        reason: String,
    },

    #[error("{message}")]
    #[diagnostic(code(trellis::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },
}
