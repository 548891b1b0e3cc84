//! Names of the runtime the generated code links against.
//!
//! The generator never hard-codes where `pipe`, `curry`, `negate`,
//! `sideEffect` and `union` live. It asks a [`Runtime`] for the identifier
//! of each operation, so the same compiled script can target any module
//! that provides those five functions.

use serde::{Deserialize, Serialize};

/// The five runtime operations the generated code depends on, plus the
/// naming scheme for curried wrappers.
pub trait Runtime {
    /// `pipe(...fns) -> x -> result`, left-to-right composition.
    fn pipe(&self) -> String;
    /// `curry(f)`, accumulates arguments until `f`'s arity is reached.
    fn curry(&self) -> String;
    /// `negate(f) -> x -> !f(x)`
    fn negate(&self) -> String;
    /// `sideEffect(f) -> x -> (f(x), x)`
    fn side_effect(&self) -> String;
    /// `union(...fns) -> x -> merged`
    fn union(&self) -> String;
    /// Identifier bound to the curried wrapper of `function`.
    fn curried_name(&self, function: &str) -> String;
}

/// A runtime exposed as a single namespace object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeNames {
    pub namespace: String,
    pub curried_prefix: String,
}

impl RuntimeNames {
    pub fn new(namespace: impl Into<String>, curried_prefix: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            curried_prefix: curried_prefix.into(),
        }
    }

    /// The names used by the `__tube_lang__` runtime package.
    pub fn tube() -> Self {
        Self::new("__tube_lang__", "__tube_curried_")
    }

    fn member(&self, name: &str) -> String {
        format!("{}.{}", self.namespace, name)
    }
}

impl Default for RuntimeNames {
    fn default() -> Self {
        Self::new("runtime", "curried_")
    }
}

impl Runtime for RuntimeNames {
    fn pipe(&self) -> String {
        self.member("pipe")
    }

    fn curry(&self) -> String {
        self.member("curry")
    }

    fn negate(&self) -> String {
        self.member("negate")
    }

    fn side_effect(&self) -> String {
        self.member("sideEffect")
    }

    fn union(&self) -> String {
        self.member("union")
    }

    fn curried_name(&self, function: &str) -> String {
        format!("{}{}", self.curried_prefix, function)
    }
}
