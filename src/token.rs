use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Structural
    Semicolon,  // ;
    Comma,      // ,
    OpenParen,  // (
    CloseParen, // )
    OpenBrace,  // {
    CloseBrace, // }

    // Operators, grouped by precedence class; the matched text
    // distinguishes the members of a class
    AdditiveOp,       // + -
    MultiplicativeOp, // * /
    EqualityOp,       // == !=
    Greater,          // >
    Less,             // <
    LogicalAnd,       // &&
    LogicalOr,        // ||
    LogicalNot,       // !
    Assign,           // =
    CompoundAssign,   // += -= *= /=

    // Literal classes
    Number,
    String,
    Boolean,
    Null,

    // Keywords
    Var,
    If,
    Else,

    Identifier,
    Whitespace,
    End,
    Unknown,
}

impl TokenKind {
    /// Human-readable name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::OpenBrace => "'{'",
            TokenKind::CloseBrace => "'}'",
            TokenKind::AdditiveOp => "an additive operator",
            TokenKind::MultiplicativeOp => "a multiplicative operator",
            TokenKind::EqualityOp => "an equality operator",
            TokenKind::Greater => "'>'",
            TokenKind::Less => "'<'",
            TokenKind::LogicalAnd => "'&&'",
            TokenKind::LogicalOr => "'||'",
            TokenKind::LogicalNot => "'!'",
            TokenKind::Assign => "'='",
            TokenKind::CompoundAssign => "a compound assignment operator",
            TokenKind::Number => "a number literal",
            TokenKind::String => "a string literal",
            TokenKind::Boolean => "a boolean literal",
            TokenKind::Null => "'null'",
            TokenKind::Var => "'var'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Identifier => "an identifier",
            TokenKind::Whitespace => "whitespace",
            TokenKind::End => "end of input",
            TokenKind::Unknown => "an unrecognized character",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub span: Span,
    pub text: &'src str,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, span: Span, text: &'src str) -> Self {
        Self { kind, span, text }
    }

    /// End-of-input sentinel with an empty span at `offset`.
    pub fn end(offset: usize) -> Self {
        Self {
            kind: TokenKind::End,
            span: Span::new(offset, offset),
            text: "",
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "{:?} {}..{}", self.kind, self.span.start, self.span.end)
        } else {
            write!(
                f,
                "{:?} {}..{} {:?}",
                self.kind, self.span.start, self.span.end, self.text
            )
        }
    }
}
