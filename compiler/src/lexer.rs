//! Lexer — Tokenizes Tube source code.
//!
//! The lexer scans the source string character by character with one or
//! two characters of lookahead, producing a flat vector of tokens. Key
//! points:
//!
//! - **Layout is lexical**: a run of line breaks becomes a single
//!   `NewLine(level)` token (or `EmptyLine` when the run contains a blank
//!   line). The level is measured from the indentation that follows: four
//!   spaces or one tab per level, never mixed.
//!
//! - **Fail fast**: the first malformed construct aborts tokenization with
//!   a [`CompileError::Lex`] carrying the line and column of the offending
//!   character.
//!
//! - **Context-sensitive identifiers**: an identifier directly after a
//!   callee or an argument is itself an argument (`Variable`), otherwise it
//!   starts a new call (`Function`). Connective words such as `with` or
//!   `and` are dropped, so `fn with x and y` lexes exactly like `fn x y`.

use crate::errors::{CompileError, Result};
use crate::token::{Span, Token, TokenKind};

const NEGATIONS: &[&str] = &["isnt", "arent", "aint", "negate"];

const JOINERS: &[&str] = &[
    "with", "for", "between", "by", "at", "to", "until", "and", "below", "under", "on", "since",
    "ago", "past", "into", "from", "about", "through", "across", "after",
];

/// Tokenize a whole script.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).scan_tokens()
}

pub struct Lexer<'src> {
    source: &'src str,
    chars: Vec<char>,
    start: usize,      // Start of current token (byte offset)
    current: usize,    // Current position (char index)
    byte_pos: usize,   // Current byte position
    line: usize,       // Line breaks seen so far
    line_start: usize, // Char index of the first character of the line
    level: usize,      // Indentation level of the current line
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            start: 0,
            current: 0,
            byte_pos: 0,
            line: 0,
            line_start: 0,
            level: 0,
            tokens: Vec::new(),
        }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.byte_pos;
            self.scan_token()?;
        }
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<()> {
        let c = self.advance();
        match c {
            // Method call on the piped value
            ':' if self.match_char(':') => self.method(),

            // Pipe declaration
            '-' if self.match_char('>') => {
                self.add_token(TokenKind::Arrow);
                Ok(())
            }

            'U' if matches!(self.peek(), ' ' | '\t') => self.union(),

            // If/else clause or switch case
            ':' => self.clause(),

            '\n' | '\r' => self.layout(c),

            ' ' | '\t' => Ok(()),

            '<' => self.side_effect(),

            '.' if self.peek() == '.' && self.peek_next() == '.' => {
                self.advance();
                self.advance();
                self.add_token(TokenKind::Variadic);
                Ok(())
            }

            c if c.is_ascii_digit() || c == '.' => {
                self.number(c);
                Ok(())
            }

            '\'' => self.string(),

            c if c.is_ascii_alphabetic() => self.word(c),

            other => Err(self.error_at(
                self.current - 1,
                format!("Unable to parse character '{}'", other),
            )),
        }
    }

    // ── Clauses ──────────────────────────────────────────────────────

    fn method(&mut self) -> Result<()> {
        if matches!(self.peek(), ' ' | '\t') {
            return Err(self.error("Method invocation not allowed with empty spaces after '::'"));
        }
        let name = self.name();
        if name.is_empty() {
            return Err(self.error("Method invocation requires a name after '::'"));
        }
        self.add_token(TokenKind::Method(name));
        Ok(())
    }

    fn union(&mut self) -> Result<()> {
        if self.level != 1 {
            return Err(self.error_at(self.current - 1, "Invalid indentation for a union clause"));
        }
        self.advance(); // the separating space
        if matches!(self.peek(), ' ' | '\t') {
            return Err(self.error(
                "Union expression not allowed with more than one space after union keyword U",
            ));
        }
        self.add_token(TokenKind::Union);
        Ok(())
    }

    /// `: name` (conditional branch) or `: predicate : value` (switch case).
    fn clause(&mut self) -> Result<()> {
        if self.level == 0 {
            return Err(self.error_at(
                self.current - 1,
                "Invalid indentation for a conditional clause",
            ));
        }
        if self.peek() != ' ' {
            return Err(self.error(
                "Brancher invocation not allowed without one space after brancher declaration",
            ));
        }
        self.advance();
        if matches!(self.peek(), ' ' | '\t') {
            return Err(self.error(
                "Brancher invocation not allowed with more than one space after brancher declaration",
            ));
        }

        let predicate = self.name();
        if predicate.is_empty() {
            return Err(self.error("Brancher invocation requires a function name"));
        }

        // A lone ':' further along the line turns the clause into a case.
        let mut spaces = 0;
        while self.peek_at(spaces) == ' ' {
            spaces += 1;
        }
        let is_case = self.peek_at(spaces) == ':' && self.peek_at(spaces + 1) != ':';
        if !is_case {
            self.add_token(TokenKind::Function(predicate));
            return Ok(());
        }
        if spaces != 1 {
            return Err(self.error(
                "Switch clause not allowed without one space before case declaration",
            ));
        }
        self.advance(); // space
        self.advance(); // ':'

        if self.peek() != ' ' {
            return Err(self.error(
                "Switch clause not allowed without one space after case declaration",
            ));
        }
        self.advance();
        if matches!(self.peek(), ' ' | '\t') {
            return Err(self.error(
                "Switch clause not allowed with more than one space after case declaration",
            ));
        }

        let value = self.name();
        if value.is_empty() {
            return Err(self.error("Switch clause requires a function name"));
        }

        if predicate.eq_ignore_ascii_case("default") {
            self.add_token(TokenKind::DefaultSwitchCase { value });
        } else {
            self.add_token(TokenKind::SwitchCase { predicate, value });
        }
        Ok(())
    }

    /// `< name >` with exactly one space on each side of the name.
    fn side_effect(&mut self) -> Result<()> {
        if self.peek() != ' ' {
            return Err(self.error("Side effect call format not allowed"));
        }
        self.advance();

        let name = self.name();
        if name.is_empty() {
            return Err(self.error("Side effect call format not allowed"));
        }

        match self.peek() {
            ' ' => {
                self.advance();
            }
            '>' => return Err(self.error("Side effect call format not allowed")),
            _ => return Err(self.error("Side effect clause not closed")),
        }
        match self.peek() {
            '>' => {
                self.advance();
                self.add_token(TokenKind::SideEffect(name));
                Ok(())
            }
            ' ' | '\t' => Err(self.error("Side effect call format not allowed")),
            _ => Err(self.error("Side effect clause not closed")),
        }
    }

    // ── Layout ───────────────────────────────────────────────────────

    /// Collapse a run of line breaks (and whitespace-only lines) into one
    /// layout token, measuring the indentation of the next real line.
    fn layout(&mut self, first: char) -> Result<()> {
        let mut breaks = 0;
        let mut c = first;
        let (spaces, tabs) = loop {
            if c == '\r' {
                self.match_char('\n');
            }
            breaks += 1;
            self.line += 1;
            self.line_start = self.current;

            let mut spaces = 0;
            let mut tabs = 0;
            loop {
                match self.peek() {
                    ' ' => spaces += 1,
                    '\t' => tabs += 1,
                    _ => break,
                }
                self.advance();
            }

            if matches!(self.peek(), '\n' | '\r') {
                c = self.advance();
                continue;
            }
            break (spaces, tabs);
        };

        self.level = if self.is_at_end() {
            0
        } else if (spaces > 0 && tabs > 0) || spaces % 4 != 0 {
            return Err(self.error("Incorrect indenting format"));
        } else {
            spaces / 4 + tabs
        };

        if breaks == 1 {
            self.add_token(TokenKind::NewLine(self.level));
        } else {
            self.add_token(TokenKind::EmptyLine);
        }
        Ok(())
    }

    // ── Literal scanners ─────────────────────────────────────────────

    fn number(&mut self, first: char) {
        let mut value = String::new();
        value.push(first);
        while self.peek().is_ascii_digit() || self.peek() == '.' {
            value.push(self.advance());
        }
        self.add_token(TokenKind::Number(value));
    }

    fn string(&mut self) -> Result<()> {
        let open = self.current - 1;
        let mut value = String::new();
        while !self.is_at_end() && !matches!(self.peek(), '\'' | '\n' | '\r') {
            value.push(self.advance());
        }
        if !self.match_char('\'') {
            return Err(self.error_at(open, "String literal not closed"));
        }
        self.add_token(TokenKind::Str(value));
        Ok(())
    }

    /// Identifiers, negations, modifier keywords and connective words.
    fn word(&mut self, first: char) -> Result<()> {
        let mut value = String::new();
        value.push(first);
        value.push_str(&self.name());

        let lower = value.to_ascii_lowercase();
        let previous = self.tokens.last().map(|t| &t.kind);

        if NEGATIONS.contains(&lower.as_str()) {
            if previous == Some(&TokenKind::Negation) {
                return Err(self.error_at(
                    self.current - value.chars().count(),
                    "More than one successive negation not allowed",
                ));
            }
            self.add_token(TokenKind::Negation);
            return Ok(());
        }
        if JOINERS.contains(&lower.as_str()) {
            return Ok(());
        }

        let kind = match lower.as_str() {
            "ary" => TokenKind::Variadic,
            "flip" => TokenKind::Flip,
            "defer" => TokenKind::Defer,
            "wrap" => TokenKind::Wrap,
            _ if previous.is_some_and(TokenKind::takes_arguments) => TokenKind::Variable(value),
            _ => TokenKind::Function(value),
        };
        self.add_token(kind);
        Ok(())
    }

    /// Consume `[A-Za-z0-9.]*`.
    fn name(&mut self) -> String {
        let mut name = String::new();
        while self.peek().is_ascii_alphanumeric() || self.peek() == '.' {
            name.push(self.advance());
        }
        name
    }

    // ── Character-level helpers ──────────────────────────────────────

    fn advance(&mut self) -> char {
        let c = self.peek();
        if !self.is_at_end() {
            self.current += 1;
            self.byte_pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    fn peek_at(&self, distance: usize) -> char {
        self.chars.get(self.current + distance).copied().unwrap_or('\0')
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }
        self.advance();
        true
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.tokens.push(Token::new(kind, Span::new(self.start, self.byte_pos)));
    }

    // ── Errors ───────────────────────────────────────────────────────

    fn error(&self, message: impl Into<String>) -> CompileError {
        self.error_at(self.current, message)
    }

    /// Build an error pointing at the character with index `index`.
    fn error_at(&self, index: usize, message: impl Into<String>) -> CompileError {
        let offset: usize = self.chars.iter().take(index).map(|c| c.len_utf8()).sum();
        let len = self.chars.get(index).map_or(0, |c| c.len_utf8());
        CompileError::lex(
            message,
            self.source,
            self.line,
            index.saturating_sub(self.line_start),
            offset,
            len,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        match tokenize(source) {
            Ok(tokens) => tokens.into_iter().map(|t| t.kind).collect(),
            Err(err) => panic!("Lexer error: {}", err),
        }
    }

    fn lex_error(source: &str) -> String {
        match tokenize(source) {
            Ok(tokens) => panic!("Expected an error, got {:?}", tokens),
            Err(err) => err.to_string(),
        }
    }

    fn func(name: &str) -> TokenKind {
        Function(name.into())
    }

    #[test]
    fn test_pipe_invocation() {
        assert_eq!(
            lex("\nfnOne\nfnTwo\nfnThree\n"),
            vec![
                NewLine(0),
                func("fnOne"),
                NewLine(0),
                func("fnTwo"),
                NewLine(0),
                func("fnThree"),
                NewLine(0),
            ]
        );
    }

    #[test]
    fn test_pipe_declaration() {
        assert_eq!(
            lex("-> fnABC\n    fnA\n    fnB\n\nfnOne\n"),
            vec![
                Arrow,
                func("fnABC"),
                NewLine(1),
                func("fnA"),
                NewLine(1),
                func("fnB"),
                EmptyLine,
                func("fnOne"),
                NewLine(0),
            ]
        );
    }

    #[test]
    fn test_method_with_arguments() {
        assert_eq!(
            lex("fnOne\n::map to ids\n"),
            vec![
                func("fnOne"),
                NewLine(0),
                Method("map".into()),
                Variable("ids".into()),
                NewLine(0),
            ]
        );
    }

    #[test]
    fn test_side_effect() {
        assert_eq!(
            lex("fnOne\n< console.log >\n"),
            vec![func("fnOne"), NewLine(0), SideEffect("console.log".into()), NewLine(0)]
        );
    }

    #[test]
    fn test_negation() {
        assert_eq!(
            lex("ISNT fnOne\naint fnTwo"),
            vec![Negation, func("fnOne"), NewLine(0), Negation, func("fnTwo")]
        );
    }

    #[test]
    fn test_brancher() {
        assert_eq!(
            lex("fnOne\n    : fnA\n    : fnB\n"),
            vec![
                func("fnOne"),
                NewLine(1),
                func("fnA"),
                NewLine(1),
                func("fnB"),
                NewLine(0),
            ]
        );
    }

    #[test]
    fn test_switch_cases() {
        assert_eq!(
            lex("pick 'n1'\n    : isZero : addOne\n    : default : addTwo\n"),
            vec![
                func("pick"),
                Str("n1".into()),
                NewLine(1),
                SwitchCase {
                    predicate: "isZero".into(),
                    value: "addOne".into()
                },
                NewLine(1),
                DefaultSwitchCase {
                    value: "addTwo".into()
                },
                NewLine(0),
            ]
        );
    }

    #[test]
    fn test_union() {
        assert_eq!(
            lex("fnTwo with 1\n    U fnUnionA\n    U fnUnionB\n"),
            vec![
                func("fnTwo"),
                Number("1".into()),
                NewLine(1),
                Union,
                func("fnUnionA"),
                NewLine(1),
                Union,
                func("fnUnionB"),
                NewLine(0),
            ]
        );
    }

    #[test]
    fn test_arguments() {
        assert_eq!(
            lex("fnTwo var1 'str1' 2.5"),
            vec![
                func("fnTwo"),
                Variable("var1".into()),
                Str("str1".into()),
                Number("2.5".into()),
            ]
        );
    }

    #[test]
    fn test_verbose_arguments_match_bare_arguments() {
        assert_eq!(
            lex("fnOne\nfnTwo with var1 with 'str1' by 2\n"),
            lex("fnOne\nfnTwo var1 'str1' 2\n")
        );
    }

    #[test]
    fn test_modifiers() {
        assert_eq!(
            lex("set ... 'a'\nsum ary 1 2\nsubtract flip x\ndefer load\nwrap handler"),
            vec![
                func("set"),
                Variadic,
                Str("a".into()),
                NewLine(0),
                func("sum"),
                Variadic,
                Number("1".into()),
                Number("2".into()),
                NewLine(0),
                func("subtract"),
                Flip,
                Variable("x".into()),
                NewLine(0),
                Defer,
                func("load"),
                NewLine(0),
                Wrap,
                func("handler"),
            ]
        );
    }

    #[test]
    fn test_identifiers_with_dots_digits_and_uppercase() {
        assert_eq!(
            lex("JSON.stringify\nfn1\nfnONE"),
            vec![
                func("JSON.stringify"),
                NewLine(0),
                func("fn1"),
                NewLine(0),
                func("fnONE"),
            ]
        );
    }

    #[test]
    fn test_tab_indentation() {
        assert_eq!(
            lex("fnOne\n\t: fnTwo\n\t\t: fnThree\n"),
            vec![
                func("fnOne"),
                NewLine(1),
                func("fnTwo"),
                NewLine(2),
                func("fnThree"),
                NewLine(0),
            ]
        );
    }

    #[test]
    fn test_blank_lines() {
        assert_eq!(
            lex("fnOne\n\n\nfnTwo\r\nfnThree\n    \nfnFour"),
            vec![
                func("fnOne"),
                EmptyLine,
                func("fnTwo"),
                NewLine(0),
                func("fnThree"),
                EmptyLine,
                func("fnFour"),
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("fn 'ab'").expect("tokenize");
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(3, 7));
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(
            lex_error("\nfnOne\nfnTwo\n-fnThree\n"),
            "Line 3 Char 0 — Unable to parse character '-'"
        );
    }

    #[test]
    fn test_invalid_indent() {
        assert_eq!(
            lex_error("\nfnOne\n  : fnThree\n"),
            "Line 2 Char 2 — Incorrect indenting format"
        );
    }

    #[test]
    fn test_mixed_indent() {
        assert!(lex_error("fnOne\n\t    : fnThree\n").ends_with("Incorrect indenting format"));
    }

    #[test]
    fn test_method_errors() {
        assert!(lex_error("fnOne\n:: fnThree\n")
            .ends_with("Method invocation not allowed with empty spaces after '::'"));
        assert!(lex_error("fnOne\n::\n").ends_with("Method invocation requires a name after '::'"));
    }

    #[test]
    fn test_side_effect_errors() {
        assert!(lex_error("fnOne\n< console.log\n").ends_with("Side effect clause not closed"));
        assert!(lex_error("fnOne\n<  console.log >\n")
            .ends_with("Side effect call format not allowed"));
        assert!(lex_error("fnOne\n< console.log  >\n")
            .ends_with("Side effect call format not allowed"));
        assert!(lex_error("fnOne\n<console.log >\n")
            .ends_with("Side effect call format not allowed"));
    }

    #[test]
    fn test_double_negation() {
        assert_eq!(
            lex_error("fnOne\naint aint console.log\n"),
            "Line 1 Char 5 — More than one successive negation not allowed"
        );
    }

    #[test]
    fn test_clause_errors() {
        assert!(lex_error("fnOne\n: fnThree\n")
            .ends_with("Invalid indentation for a conditional clause"));
        assert!(lex_error("fnOne\n    :fnA\n").ends_with(
            "Brancher invocation not allowed without one space after brancher declaration"
        ));
        assert!(lex_error("fnOne\n    :  fnA\n").ends_with(
            "Brancher invocation not allowed with more than one space after brancher declaration"
        ));
        assert!(lex_error("fnOne\n    : isA :fnA\n")
            .ends_with("Switch clause not allowed without one space after case declaration"));
        assert!(lex_error("fnOne\n    : isA  : fnA\n")
            .ends_with("Switch clause not allowed without one space before case declaration"));
        assert!(lex_error("fnOne\n    : \n").ends_with("Brancher invocation requires a function name"));
        assert!(lex_error("fnOne\n    : isA : \n").ends_with("Switch clause requires a function name"));
        assert!(lex_error("fnOne\n    : isA :  fnA\n").ends_with(
            "Switch clause not allowed with more than one space after case declaration"
        ));
    }

    #[test]
    fn test_union_errors() {
        assert!(lex_error("fnOne\n    U  fnUnionA\n").ends_with(
            "Union expression not allowed with more than one space after union keyword U"
        ));
        assert!(lex_error("fnOne\nU fnUnionA\n").ends_with("Invalid indentation for a union clause"));
        assert!(lex_error("fnOne\n        U fnUnionA\n")
            .ends_with("Invalid indentation for a union clause"));
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            lex_error("fnOne 'abc\nfnTwo"),
            "Line 0 Char 6 — String literal not closed"
        );
    }
}
