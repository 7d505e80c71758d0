use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::token::{Span, Token, TokenKind};

#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum LexError {
    #[error("Unexpected character '{character}'")]
    UnexpectedCharacter {
        character: char,
        #[source_code]
        src: String,
        #[label("no token rule matches here")]
        span: SourceSpan,
    },
}

pub type LexResult<T> = Result<T, LexError>;

/// One lexer rule; the first rule whose pattern matches at the cursor wins.
struct Rule {
    kind: TokenKind,
    pattern: Pattern,
}

enum Pattern {
    /// Exact text.
    Literal(&'static str),
    /// Exact word that must not be followed by an identifier character.
    Keyword(&'static str),
    /// Hand-rolled matcher returning the matched byte length.
    Matcher(fn(&str) -> Option<usize>),
}

impl Rule {
    const fn literal(kind: TokenKind, text: &'static str) -> Self {
        Self {
            kind,
            pattern: Pattern::Literal(text),
        }
    }

    const fn keyword(kind: TokenKind, word: &'static str) -> Self {
        Self {
            kind,
            pattern: Pattern::Keyword(word),
        }
    }

    const fn matcher(kind: TokenKind, matcher: fn(&str) -> Option<usize>) -> Self {
        Self {
            kind,
            pattern: Pattern::Matcher(matcher),
        }
    }

    fn matches(&self, rest: &str) -> Option<usize> {
        match self.pattern {
            Pattern::Literal(text) => rest.starts_with(text).then(|| text.len()),
            Pattern::Keyword(word) => {
                if !rest.starts_with(word) {
                    return None;
                }
                match rest[word.len()..].chars().next() {
                    Some(c) if is_identifier_continue(c) => None,
                    _ => Some(word.len()),
                }
            }
            Pattern::Matcher(matcher) => matcher(rest),
        }
    }
}

// Order is significant: two-character operators must precede their
// one-character prefixes, and keywords must precede the identifier rule.
const RULES: &[Rule] = &[
    Rule::matcher(TokenKind::Whitespace, match_whitespace),
    Rule::literal(TokenKind::Semicolon, ";"),
    Rule::literal(TokenKind::Comma, ","),
    Rule::literal(TokenKind::OpenBrace, "{"),
    Rule::literal(TokenKind::CloseBrace, "}"),
    Rule::literal(TokenKind::OpenParen, "("),
    Rule::literal(TokenKind::CloseParen, ")"),
    Rule::literal(TokenKind::EqualityOp, "=="),
    Rule::literal(TokenKind::EqualityOp, "!="),
    Rule::literal(TokenKind::LogicalAnd, "&&"),
    Rule::literal(TokenKind::LogicalOr, "||"),
    Rule::literal(TokenKind::CompoundAssign, "+="),
    Rule::literal(TokenKind::CompoundAssign, "-="),
    Rule::literal(TokenKind::CompoundAssign, "*="),
    Rule::literal(TokenKind::CompoundAssign, "/="),
    Rule::literal(TokenKind::Assign, "="),
    Rule::literal(TokenKind::LogicalNot, "!"),
    Rule::literal(TokenKind::Greater, ">"),
    Rule::literal(TokenKind::Less, "<"),
    Rule::literal(TokenKind::AdditiveOp, "+"),
    Rule::literal(TokenKind::AdditiveOp, "-"),
    Rule::literal(TokenKind::MultiplicativeOp, "*"),
    Rule::literal(TokenKind::MultiplicativeOp, "/"),
    Rule::keyword(TokenKind::Var, "var"),
    Rule::keyword(TokenKind::If, "if"),
    Rule::keyword(TokenKind::Else, "else"),
    Rule::keyword(TokenKind::Boolean, "true"),
    Rule::keyword(TokenKind::Boolean, "false"),
    Rule::keyword(TokenKind::Null, "null"),
    Rule::matcher(TokenKind::Number, match_number),
    Rule::matcher(TokenKind::String, match_string),
    Rule::matcher(TokenKind::Identifier, match_identifier),
];

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn match_whitespace(rest: &str) -> Option<usize> {
    let len = rest.len() - rest.trim_start().len();
    (len > 0).then_some(len)
}

fn match_number(rest: &str) -> Option<usize> {
    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    (len > 0).then_some(len)
}

// Strings are single-line and escape-free; the quotes are part of the
// matched span and stripped later by the parser.
fn match_string(rest: &str) -> Option<usize> {
    let mut chars = rest.char_indices();
    let (_, first) = chars.next()?;
    if first != '"' {
        return None;
    }
    for (idx, c) in chars {
        match c {
            '"' => return Some(idx + 1),
            '\n' => return None,
            _ => {}
        }
    }
    None
}

fn match_identifier(rest: &str) -> Option<usize> {
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !is_identifier_start(first) {
        return None;
    }
    let len = first.len_utf8()
        + chars
            .take_while(|&c| is_identifier_continue(c))
            .map(char::len_utf8)
            .sum::<usize>();
    Some(len)
}

pub struct Lexer<'src> {
    source: &'src str,
    cursor: usize,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            cursor: 0,
            finished: false,
        }
    }

    /// Produces the next raw token, whitespace included. At end of input
    /// this returns the `End` sentinel on every call.
    pub fn next_token(&mut self) -> Token<'src> {
        if self.cursor >= self.source.len() {
            return Token::end(self.source.len());
        }
        let rest = &self.source[self.cursor..];
        for rule in RULES {
            if let Some(len) = rule.matches(rest) {
                return self.emit(rule.kind, len);
            }
        }
        // No rule matched; emit a one-character Unknown token and let the
        // caller turn it into a lexical error.
        let len = rest.chars().next().map_or(1, char::len_utf8);
        self.emit(TokenKind::Unknown, len)
    }

    fn emit(&mut self, kind: TokenKind, len: usize) -> Token<'src> {
        let span = Span::new(self.cursor, self.cursor + len);
        let token = Token::new(kind, span, &self.source[span.range()]);
        self.cursor = span.end;
        token
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::End {
            self.finished = true;
        }
        Some(token)
    }
}

/// Tokenizes the whole input for the parser: whitespace is filtered out,
/// the `End` sentinel is appended, and any `Unknown` token aborts with a
/// lexical error.
pub fn tokenize(source: &str) -> LexResult<Vec<Token<'_>>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::Whitespace => continue,
            TokenKind::Unknown => {
                return Err(LexError::UnexpectedCharacter {
                    character: token.text.chars().next().unwrap_or_default(),
                    src: source.to_string(),
                    span: token.span.range().into(),
                });
            }
            TokenKind::End => {
                tokens.push(token);
                break;
            }
            _ => tokens.push(token),
        }
    }
    Ok(tokens)
}
