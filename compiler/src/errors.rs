//! Error reporting for every compilation stage.
//!
//! Uses miette so that lexical errors render with the offending source
//! line underlined. Parse and transform errors have no reliable source
//! position (the token stream may be hand-built) and carry the message
//! only.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

/// A compiler error. The first error aborts compilation; nothing is
/// recovered and no partial output is produced.
#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    /// Bad character, bad indentation or malformed clause spacing.
    #[error("Line {line} Char {column} — {message}")]
    #[diagnostic(code(tube::lex))]
    Lex {
        message: String,
        line: usize,
        column: usize,

        #[source_code]
        src: String,

        #[label("here")]
        span: SourceSpan,
    },

    /// Unexpected token kind or malformed pipe declaration.
    #[error("{message}")]
    #[diagnostic(code(tube::parse))]
    Parse { message: String },

    /// The tree violates a lowering rule (initial-step arity).
    #[error("{message}")]
    #[diagnostic(code(tube::transform))]
    Transform { message: String },
}

impl CompileError {
    pub fn lex(
        message: impl Into<String>,
        src: &str,
        line: usize,
        column: usize,
        offset: usize,
        len: usize,
    ) -> Self {
        Self::Lex {
            message: message.into(),
            line,
            column,
            src: src.to_string(),
            span: (offset, len).into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
        }
    }

    /// The bare message, without any position prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Lex { message, .. } | Self::Parse { message } | Self::Transform { message } => {
                message
            }
        }
    }
}
