//! Parser — Recursive descent over an indentation-aware token stream.
//!
//! The parser converts the flat token stream into a list of pipes. Layout
//! tokens drive the structure:
//!
//! - `EmptyLine` closes the current top-level block.
//! - `NewLine(level)` sets the level of whatever is parsed next. Each
//!   block has a baseline (0 for an invocation, 1 for the body of a `->`
//!   declaration); calls at the baseline are sibling steps.
//! - A call line exactly one level deeper than the call above it is a
//!   conditional branch of that call: the first such line is the `if`
//!   branch, the second the `else` branch. Branches nest to any depth by
//!   recursing one level at a time.
//!
//! Parsing stops at the first error; no partial program is returned.

use crate::ast::*;
use crate::errors::{CompileError, Result};
use crate::token::{Token, TokenKind};
use tracing::trace;

/// Parse a token stream into a program.
pub fn parse(tokens: Vec<Token>) -> Result<Program> {
    Parser::new(tokens).parse()
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    level: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            level: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Program> {
        let mut program = Vec::new();
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::EmptyLine => {
                    self.level = 0;
                    self.current += 1;
                }
                TokenKind::NewLine(level) => {
                    self.level = level;
                    self.current += 1;
                }
                TokenKind::Arrow => program.push(self.pipe_statement()?),
                kind if starts_call(&kind) => program.push(self.pipe_invocation()?),
                other => return Err(unsupported(&other)),
            }
        }
        Ok(program)
    }

    // ── Statements ───────────────────────────────────────────────────

    fn pipe_statement(&mut self) -> Result<Statement> {
        self.current += 1; // ->
        let name = match self.advance_kind() {
            Some(TokenKind::Function(name)) => name,
            _ => return Err(CompileError::parse("Invalid PipeStatement format")),
        };
        let steps = self.block(1, Vec::new())?;
        trace!(name = %name, steps = steps.len(), "parsed pipe statement");
        Ok(Statement::Pipe(PipeStatement { name, steps }))
    }

    fn pipe_invocation(&mut self) -> Result<Statement> {
        if self.level > 0 {
            return Err(misplaced_clause());
        }
        let first = self.function(0)?;
        let steps = self.block(0, vec![Step::Function(first)])?;
        trace!(steps = steps.len(), "parsed pipe invocation");
        Ok(Statement::Invocation(PipeInvocation {
            steps,
            argument: None,
        }))
    }

    /// Collect steps until the block is closed by an empty line or the end
    /// of input.
    fn block(&mut self, baseline: usize, mut steps: Vec<Step>) -> Result<Vec<Step>> {
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::EmptyLine => {
                    self.level = 0;
                    self.current += 1;
                    break;
                }
                TokenKind::NewLine(level) => {
                    self.level = level;
                    self.current += 1;
                }
                _ => steps.push(self.step(baseline)?),
            }
        }
        Ok(steps)
    }

    fn step(&mut self, baseline: usize) -> Result<Step> {
        let kind = self.peek_kind().ok_or_else(end_of_input)?;
        match kind {
            kind if starts_call(&kind) => {
                // Deeper calls are only valid as branches, which the call
                // above them has already consumed.
                if self.level > baseline {
                    return Err(misplaced_clause());
                }
                Ok(Step::Function(self.function(self.level)?))
            }
            TokenKind::Method(name) => {
                self.current += 1;
                let args = self.arguments()?;
                Ok(Step::Method(Method { name, args }))
            }
            TokenKind::SideEffect(name) => {
                self.current += 1;
                Ok(Step::SideEffect(name))
            }
            TokenKind::Union => self.union(),
            TokenKind::SwitchCase { .. } | TokenKind::DefaultSwitchCase { .. } => self.switch(),
            other => Err(unsupported(&other)),
        }
    }

    // ── Calls ────────────────────────────────────────────────────────

    /// A call at `level`, with its arguments, modifiers and any branches
    /// on the lines right below it.
    fn function(&mut self, level: usize) -> Result<Function> {
        let mut negated = false;
        let mut modifiers = Vec::new();

        let name = loop {
            match self.advance_kind() {
                Some(TokenKind::Negation) => negated = true,
                Some(TokenKind::Defer) => modifiers.push(Modifier::Defer),
                Some(TokenKind::Wrap) => modifiers.push(Modifier::Wrap),
                Some(TokenKind::Function(name)) => break name,
                Some(other) => return Err(unsupported(&other)),
                None => return Err(end_of_input()),
            }
        };

        let mut function = Function::new(name);
        function.negated = negated;

        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::Variadic => modifiers.push(Modifier::Variadic),
                TokenKind::Flip => modifiers.push(Modifier::Flip),
                TokenKind::Defer => modifiers.push(Modifier::Defer),
                TokenKind::NewLine(_) | TokenKind::EmptyLine => break,
                other => match literal(&other) {
                    Some(arg) => function.args.push(arg),
                    None => return Err(unsupported(&other)),
                },
            }
            self.current += 1;
        }

        if modifiers.len() > 1 {
            return Err(CompileError::parse(
                "Function with several special modifiers not supported",
            ));
        }
        if let Some(modifier) = modifiers.pop() {
            function = function.with_modifier(modifier);
        }

        while self.at_branch(level) {
            self.current += 1; // NewLine
            self.level = level + 1;
            let branch = Box::new(self.function(level + 1)?);
            if function.if_branch.is_none() {
                function.if_branch = Some(branch);
            } else if function.else_branch.is_none() {
                function.else_branch = Some(branch);
            } else {
                return Err(CompileError::parse(
                    "Conditional clause already has an if and an else branch",
                ));
            }
        }

        Ok(function)
    }

    /// Whether the next line is a call one level below a call at `level`.
    fn at_branch(&self, level: usize) -> bool {
        match (self.peek_kind_at(0), self.peek_kind_at(1)) {
            (Some(TokenKind::NewLine(next)), Some(kind)) => *next == level + 1 && starts_call(kind),
            _ => false,
        }
    }

    /// Literal arguments up to the end of the line.
    fn arguments(&mut self) -> Result<Vec<Literal>> {
        let mut args = Vec::new();
        while let Some(kind) = self.peek_kind_at(0) {
            if matches!(kind, TokenKind::NewLine(_) | TokenKind::EmptyLine) {
                break;
            }
            match literal(kind) {
                Some(arg) => args.push(arg),
                None => return Err(unsupported(kind)),
            }
            self.current += 1;
        }
        Ok(args)
    }

    // ── Compound steps ───────────────────────────────────────────────

    /// Every call line at the level of the opening `U`, with or without
    /// its own `U`, until the level changes or the block ends.
    fn union(&mut self) -> Result<Step> {
        let level = self.level;
        let mut members = Vec::new();
        loop {
            if self.peek_kind_at(0) == Some(&TokenKind::Union) {
                self.current += 1;
            }
            members.push(self.function(level)?);
            match (self.peek_kind_at(0), self.peek_kind_at(1)) {
                (Some(TokenKind::NewLine(next)), Some(kind)) if *next == level => {
                    if *kind != TokenKind::Union && !starts_call(kind) {
                        return Err(unsupported(kind));
                    }
                    self.current += 1;
                }
                _ => break,
            }
        }
        trace!(members = members.len(), "parsed union");
        Ok(Step::Union(UnionStatement { members }))
    }

    /// Cases accumulate until a line starts with anything else. A later
    /// default replaces an earlier one.
    fn switch(&mut self) -> Result<Step> {
        let mut switch = SwitchStatement::default();
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::SwitchCase { predicate, value } => {
                    switch.cases.push(SwitchCase { predicate, value });
                }
                TokenKind::DefaultSwitchCase { value } => {
                    switch.default = Some(SwitchCase {
                        predicate: "default".to_string(),
                        value,
                    });
                }
                TokenKind::NewLine(level) => self.level = level,
                _ => break,
            }
            self.current += 1;
        }
        trace!(cases = switch.cases.len(), "parsed switch");
        Ok(Step::Switch(switch))
    }

    // ── Token manipulation ───────────────────────────────────────────

    fn advance_kind(&mut self) -> Option<TokenKind> {
        let kind = self.peek_kind();
        if kind.is_some() {
            self.current += 1;
        }
        kind
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek_kind_at(0).cloned()
    }

    fn peek_kind_at(&self, distance: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + distance).map(|t| &t.kind)
    }
}

fn starts_call(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Function(_) | TokenKind::Negation | TokenKind::Defer | TokenKind::Wrap
    )
}

fn literal(kind: &TokenKind) -> Option<Literal> {
    match kind {
        TokenKind::Str(value) => Some(Literal::Str(value.clone())),
        TokenKind::Number(value) => Some(Literal::Number(value.clone())),
        TokenKind::Variable(value) => Some(Literal::Variable(value.clone())),
        _ => None,
    }
}

fn unsupported(kind: &TokenKind) -> CompileError {
    CompileError::parse(format!("{} token type not supported", kind.name()))
}

fn misplaced_clause() -> CompileError {
    CompileError::parse("Unexpected indentation for a conditional clause")
}

fn end_of_input() -> CompileError {
    CompileError::parse("Unexpected end of input")
}
