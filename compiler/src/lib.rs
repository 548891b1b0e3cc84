//! Tube Compiler — Source-to-source compiler for the Tube pipeline language.
//!
//! # Compiler Pipeline
//!
//! ```text
//! Source Code (.tube)
//!     │
//!     ▼
//! ┌────────────┐
//! │  Lexer      │  Indentation-aware tokens with spans
//! └────┬───────┘
//!      │
//!      ▼
//! ┌────────────┐
//! │  Parser     │  Recursive descent over indentation levels
//! └────┬───────┘
//!      │
//!      ▼
//! ┌────────────┐
//! │  Transform  │  Currying decisions, pipe inputs, deduplication
//! └────┬───────┘
//!      │
//!      ▼
//! ┌────────────┐
//! │  Generator  │  Target text against a runtime namespace
//! └────┬───────┘
//!      │
//!      ▼
//! Target Source (.js)
//! ```

pub mod ast;
pub mod errors;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod token;
pub mod transform;

pub use errors::{CompileError, Result};
pub use generator::{generate, generate_with};
pub use lexer::tokenize;
pub use parser::parse;
pub use runtime::{Runtime, RuntimeNames};
pub use transform::transform;

use tracing::debug;

/// Compile a script against the default runtime names.
pub fn compile(source: &str) -> Result<String> {
    compile_with(source, &RuntimeNames::default())
}

/// Compile a script, naming runtime operations through `runtime`.
pub fn compile_with(source: &str, runtime: &dyn Runtime) -> Result<String> {
    let tokens = tokenize(source)?;
    debug!(tokens = tokens.len(), "tokenized");

    let program = parse(tokens)?;
    debug!(statements = program.len(), "parsed");

    let lowered = transform(program)?;
    debug!(
        curried = lowered.curried.len(),
        pipes = lowered.pipes.len(),
        invocations = lowered.invocations.len(),
        "transformed"
    );

    let output = generate_with(&lowered, runtime);
    debug!(bytes = output.len(), "generated");
    Ok(output)
}
