//! Abstract Syntax Tree — Typed nodes for the Tube language.
//!
//! A script is a list of pipes. Every pipe is a list of steps; a step is a
//! call, a method, a side effect, a union or a switch. Conditional
//! branches hang off the call that guards them, so a nested `: clause`
//! tree is just a chain of boxed [`Function`]s.
//!
//! The parser builds [`Program`]; the transformer consumes it and produces
//! a [`TransformedProgram`] that the generator walks.

/// A complete program is a sequence of top-level pipes.
pub type Program = Vec<Statement>;

// ── Statements ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `-> name` followed by an indented body.
    Pipe(PipeStatement),

    /// A block of steps evaluated immediately.
    Invocation(PipeInvocation),
}

/// A named, reusable pipe.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeStatement {
    pub name: String,
    pub steps: Vec<Step>,
}

/// An anonymous pipe. `argument` is the value the composed pipe is
/// called with; it is lifted off the first step during transformation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipeInvocation {
    pub steps: Vec<Step>,
    pub argument: Option<Literal>,
}

// ── Steps ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Function(Function),
    Method(Method),

    /// `< name >`: called for effect, the piped value passes through.
    SideEffect(String),

    Union(UnionStatement),
    Switch(SwitchStatement),
}

/// A call step: `name args...`, possibly guarding an if/else branch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Function {
    pub name: String,
    pub args: Vec<Literal>,
    pub negated: bool,
    pub modifier: Option<Modifier>,
    /// Call `name` directly instead of its curried wrapper.
    pub disable_auto_currying: bool,
    /// First step of an invocation; rendered as a bare reference.
    pub initial: bool,
    pub if_branch: Option<Box<Function>>,
    pub else_branch: Option<Box<Function>>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_args(mut self, args: Vec<Literal>) -> Self {
        self.args = args;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.disable_auto_currying = modifier == Modifier::Variadic;
        self.modifier = Some(modifier);
        self
    }

    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }

    pub fn with_branches(mut self, if_branch: Function, else_branch: Option<Function>) -> Self {
        self.if_branch = Some(Box::new(if_branch));
        self.else_branch = else_branch.map(Box::new);
        self
    }
}

/// Call modifiers. At most one applies to a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `...` / `ary`: arity is not fixed, never auto-curry.
    Variadic,
    /// `flip`: the piped value goes first, the literal arguments second.
    Flip,
    /// `defer`: wrap the call in a thunk.
    Defer,
    /// `wrap`: wrap the call in a forwarding lambda.
    Wrap,
}

/// `::name args...`, a method invoked on the piped value.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub args: Vec<Literal>,
}

/// `U name` lines; every member sees the same input and the results are
/// merged by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionStatement {
    pub members: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SwitchStatement {
    pub cases: Vec<SwitchCase>,
    pub default: Option<SwitchCase>,
}

/// `: predicate : value`
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub predicate: String,
    pub value: String,
}

// ── Literals ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Number(String),
    Variable(String),
}

// ── Lowered program ──────────────────────────────────────────────────

/// The three flat collections the generator emits, in this order. Each is
/// order-preserving; curried names and pipe names are unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformedProgram {
    pub curried: Vec<String>,
    pub pipes: Vec<PipeStatement>,
    pub invocations: Vec<PipeInvocation>,
}
