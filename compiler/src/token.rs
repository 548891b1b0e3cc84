//! Token types for the Tube language.
//!
//! Each token carries its kind (with any payload the kind needs, such as
//! an identifier or an indentation level) and a span indicating its
//! position in the source. Spans are byte offsets so that errors can
//! point miette at the exact characters.

/// Byte offset range in the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// All token kinds in the Tube language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Callees
    Function(String),
    Method(String), // ::name

    // Arguments
    Number(String),
    Str(String),
    Variable(String),

    // Modifiers
    Negation, // isnt, arent, aint, negate
    Variadic, // ... or ary
    Flip,
    Defer,
    Wrap,

    // Block markers
    Arrow,              // ->
    SideEffect(String), // < name >
    Union,              // U
    SwitchCase { predicate: String, value: String },
    DefaultSwitchCase { value: String },

    // Layout
    NewLine(usize),
    EmptyLine,
}

impl TokenKind {
    /// The name of the kind, without its payload. Used in parse errors.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Function(_) => "Function",
            TokenKind::Method(_) => "Method",
            TokenKind::Number(_) => "Number",
            TokenKind::Str(_) => "String",
            TokenKind::Variable(_) => "Variable",
            TokenKind::Negation => "Negation",
            TokenKind::Variadic => "Variadic",
            TokenKind::Flip => "Flip",
            TokenKind::Defer => "Defer",
            TokenKind::Wrap => "Wrap",
            TokenKind::Arrow => "Arrow",
            TokenKind::SideEffect(_) => "SideEffect",
            TokenKind::Union => "Union",
            TokenKind::SwitchCase { .. } => "SwitchCase",
            TokenKind::DefaultSwitchCase { .. } => "DefaultSwitchCase",
            TokenKind::NewLine(_) => "NewLine",
            TokenKind::EmptyLine => "EmptyLine",
        }
    }

    /// Whether an identifier right after this token is an argument of the
    /// same call rather than a new callee.
    pub fn takes_arguments(&self) -> bool {
        matches!(
            self,
            TokenKind::Function(_)
                | TokenKind::Method(_)
                | TokenKind::Number(_)
                | TokenKind::Str(_)
                | TokenKind::Variable(_)
                | TokenKind::Variadic
                | TokenKind::Flip
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
