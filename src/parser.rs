use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::ast::{BinaryOperator, LiteralValue, LogicalOperator, Node, UnaryOperator};
use crate::lexer::{self, LexError};
use crate::token::{Token, TokenKind};

#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum SyntaxError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error("Expected {expected}, found {found}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        #[source_code]
        src: String,
        #[label("unexpected token here")]
        span: SourceSpan,
    },

    #[error("Expected an expression, found {found}")]
    ExpectedExpression {
        found: TokenKind,
        #[source_code]
        src: String,
        #[label("expected an expression here")]
        span: SourceSpan,
    },

    #[error("Invalid assignment target: the left-hand side must be an identifier")]
    InvalidAssignmentTarget {
        #[source_code]
        src: String,
        #[label("cannot assign to this")]
        span: SourceSpan,
    },

    #[error("Invalid number literal '{literal}'")]
    InvalidNumberLiteral {
        literal: String,
        #[source_code]
        src: String,
        #[label("does not fit a 64-bit integer")]
        span: SourceSpan,
    },
}

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Recursive-descent parser over a fully pre-tokenized input. Each grammar
/// level has one method; binary levels fold iteratively to stay
/// left-associative.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token<'src>>,
    cursor: usize,
}

impl<'src> Parser<'src> {
    /// Tokenizes the whole input up front (two-pass design); the grammar
    /// then runs over the token list with a cursor.
    pub fn new(source: &'src str) -> ParseResult<Self> {
        let tokens = lexer::tokenize(source)?;
        Ok(Self {
            source,
            tokens,
            cursor: 0,
        })
    }

    pub fn parse(mut self) -> ParseResult<Node<'src>> {
        self.program()
    }

    // Program := StatementList End
    fn program(&mut self) -> ParseResult<Node<'src>> {
        let body = self.statement_list()?;
        let token = self.eat(TokenKind::End)?;
        Ok(Node::Program { token, body })
    }

    // StatementList := Statement+   (until End or '}')
    fn statement_list(&mut self) -> ParseResult<Vec<Node<'src>>> {
        let mut statements = vec![self.statement()?];
        while !matches!(
            self.current().kind,
            TokenKind::End | TokenKind::CloseBrace
        ) {
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    fn statement(&mut self) -> ParseResult<Node<'src>> {
        match self.current().kind {
            TokenKind::Semicolon => self.empty_statement(),
            TokenKind::OpenBrace => self.block_statement(),
            TokenKind::Var => self.variable_statement(),
            TokenKind::If => self.if_statement(),
            _ => self.expression_statement(),
        }
    }

    fn empty_statement(&mut self) -> ParseResult<Node<'src>> {
        let token = self.eat(TokenKind::Semicolon)?;
        Ok(Node::EmptyStatement { token })
    }

    // BlockStatement := '{' StatementList? '}'
    fn block_statement(&mut self) -> ParseResult<Node<'src>> {
        let token = self.eat(TokenKind::OpenBrace)?;
        let children = if self.at(TokenKind::CloseBrace) {
            Vec::new()
        } else {
            self.statement_list()?
        };
        self.eat(TokenKind::CloseBrace)?;
        Ok(Node::StatementList { token, children })
    }

    // VariableStatement := 'var' VariableDeclaration (',' VariableDeclaration)* ';'
    fn variable_statement(&mut self) -> ParseResult<Node<'src>> {
        let token = self.eat(TokenKind::Var)?;
        let mut declarations = vec![self.variable_declaration()?];
        while self.at(TokenKind::Comma) {
            self.eat(TokenKind::Comma)?;
            declarations.push(self.variable_declaration()?);
        }
        self.eat(TokenKind::Semicolon)?;
        Ok(Node::VariableStatement {
            token,
            declarations,
        })
    }

    // VariableDeclaration := Identifier ('=' AssignmentExpression)?
    fn variable_declaration(&mut self) -> ParseResult<Node<'src>> {
        let identifier = self.identifier()?;
        let token = *identifier.token();
        let initializer = if self.at(TokenKind::Assign) {
            self.eat(TokenKind::Assign)?;
            Some(Box::new(self.assignment_expression()?))
        } else {
            None
        };
        Ok(Node::VariableDeclaration {
            token,
            identifier: Box::new(identifier),
            initializer,
        })
    }

    // IfStatement := 'if' '(' Expression ')' Statement ('else' Statement)?
    // A dangling else binds to the nearest if.
    fn if_statement(&mut self) -> ParseResult<Node<'src>> {
        let token = self.eat(TokenKind::If)?;
        self.eat(TokenKind::OpenParen)?;
        let test = self.expression()?;
        self.eat(TokenKind::CloseParen)?;
        let consequent = self.statement()?;
        let alternate = if self.at(TokenKind::Else) {
            self.eat(TokenKind::Else)?;
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Node::IfStatement {
            token,
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate,
        })
    }

    // ExpressionStatement := Expression ';'
    fn expression_statement(&mut self) -> ParseResult<Node<'src>> {
        let expression = self.expression()?;
        let token = self.eat(TokenKind::Semicolon)?;
        Ok(Node::ExpressionStatement {
            token,
            expression: Box::new(expression),
        })
    }

    fn expression(&mut self) -> ParseResult<Node<'src>> {
        self.assignment_expression()
    }

    // AssignmentExpression := LogicalOrExpression (AssignOp AssignmentExpression)?
    // Right-associative; the left-hand side must already be an identifier.
    fn assignment_expression(&mut self) -> ParseResult<Node<'src>> {
        let left = self.logical_or_expression()?;
        if !matches!(
            self.current().kind,
            TokenKind::Assign | TokenKind::CompoundAssign
        ) {
            return Ok(left);
        }
        let token = self.advance();
        if !matches!(left, Node::Identifier { .. }) {
            return Err(SyntaxError::InvalidAssignmentTarget {
                src: self.source.to_string(),
                span: left.token().span.range().into(),
            });
        }
        let operator = match token.text {
            "=" => None,
            "+=" => Some(BinaryOperator::Add),
            "-=" => Some(BinaryOperator::Sub),
            "*=" => Some(BinaryOperator::Mul),
            "/=" => Some(BinaryOperator::Div),
            _ => unreachable!("assignment token text"),
        };
        let right = self.assignment_expression()?;
        Ok(Node::AssignmentExpression {
            token,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn logical_or_expression(&mut self) -> ParseResult<Node<'src>> {
        let mut left = self.logical_and_expression()?;
        while self.at(TokenKind::LogicalOr) {
            let token = self.advance();
            let right = self.logical_and_expression()?;
            left = Node::LogicalExpression {
                token,
                operator: LogicalOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn logical_and_expression(&mut self) -> ParseResult<Node<'src>> {
        let mut left = self.equality_expression()?;
        while self.at(TokenKind::LogicalAnd) {
            let token = self.advance();
            let right = self.equality_expression()?;
            left = Node::LogicalExpression {
                token,
                operator: LogicalOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn equality_expression(&mut self) -> ParseResult<Node<'src>> {
        self.binary_level(Self::relational_expression, &[TokenKind::EqualityOp])
    }

    fn relational_expression(&mut self) -> ParseResult<Node<'src>> {
        self.binary_level(
            Self::additive_expression,
            &[TokenKind::Greater, TokenKind::Less],
        )
    }

    fn additive_expression(&mut self) -> ParseResult<Node<'src>> {
        self.binary_level(Self::multiplicative_expression, &[TokenKind::AdditiveOp])
    }

    fn multiplicative_expression(&mut self) -> ParseResult<Node<'src>> {
        self.binary_level(Self::unary_expression, &[TokenKind::MultiplicativeOp])
    }

    /// One left-folding precedence tier: parses `inner (op inner)*` for the
    /// given operator token kinds.
    fn binary_level(
        &mut self,
        inner: fn(&mut Self) -> ParseResult<Node<'src>>,
        kinds: &[TokenKind],
    ) -> ParseResult<Node<'src>> {
        let mut left = inner(self)?;
        while kinds.contains(&self.current().kind) {
            let token = self.advance();
            let right = inner(self)?;
            left = Node::BinaryExpression {
                token,
                operator: Self::binary_operator(&token),
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn binary_operator(token: &Token<'_>) -> BinaryOperator {
        match (token.kind, token.text) {
            (TokenKind::AdditiveOp, "+") => BinaryOperator::Add,
            (TokenKind::AdditiveOp, "-") => BinaryOperator::Sub,
            (TokenKind::MultiplicativeOp, "*") => BinaryOperator::Mul,
            (TokenKind::MultiplicativeOp, "/") => BinaryOperator::Div,
            (TokenKind::Greater, _) => BinaryOperator::Greater,
            (TokenKind::Less, _) => BinaryOperator::Less,
            (TokenKind::EqualityOp, "==") => BinaryOperator::Equal,
            (TokenKind::EqualityOp, "!=") => BinaryOperator::NotEqual,
            _ => unreachable!("binary operator token"),
        }
    }

    // UnaryExpression := (AddOp | '!') UnaryExpression | PrimaryExpression
    fn unary_expression(&mut self) -> ParseResult<Node<'src>> {
        if !matches!(
            self.current().kind,
            TokenKind::AdditiveOp | TokenKind::LogicalNot
        ) {
            return self.primary_expression();
        }
        let token = self.advance();
        let operator = match token.text {
            "+" => UnaryOperator::Plus,
            "-" => UnaryOperator::Negate,
            "!" => UnaryOperator::Not,
            _ => unreachable!("unary operator token"),
        };
        let operand = self.unary_expression()?;
        Ok(Node::UnaryExpression {
            token,
            operator,
            operand: Box::new(operand),
        })
    }

    // PrimaryExpression := Literal | '(' Expression ')' | Identifier
    fn primary_expression(&mut self) -> ParseResult<Node<'src>> {
        match self.current().kind {
            TokenKind::Number | TokenKind::String | TokenKind::Boolean | TokenKind::Null => {
                self.literal()
            }
            TokenKind::OpenParen => {
                self.eat(TokenKind::OpenParen)?;
                let expression = self.expression()?;
                self.eat(TokenKind::CloseParen)?;
                // Grouping affects structure only; no wrapper node.
                Ok(expression)
            }
            TokenKind::Identifier => self.identifier(),
            found => Err(SyntaxError::ExpectedExpression {
                found,
                src: self.source.to_string(),
                span: self.current().span.range().into(),
            }),
        }
    }

    fn literal(&mut self) -> ParseResult<Node<'src>> {
        let token = self.advance();
        let value = match token.kind {
            TokenKind::Number => {
                let value =
                    token
                        .text
                        .parse::<i64>()
                        .map_err(|_| SyntaxError::InvalidNumberLiteral {
                            literal: token.text.to_string(),
                            src: self.source.to_string(),
                            span: token.span.range().into(),
                        })?;
                LiteralValue::Int(value)
            }
            // The lexed span includes the quotes; strip one from each side.
            TokenKind::String => LiteralValue::Str(&token.text[1..token.text.len() - 1]),
            TokenKind::Boolean => LiteralValue::Bool(token.text == "true"),
            TokenKind::Null => LiteralValue::Null,
            _ => unreachable!("literal token kind"),
        };
        Ok(Node::Literal { token, value })
    }

    fn identifier(&mut self) -> ParseResult<Node<'src>> {
        let token = self.eat(TokenKind::Identifier)?;
        Ok(Node::Identifier { token })
    }

    fn current(&self) -> &Token<'src> {
        // tokenize always appends the End sentinel, so the list is never
        // empty and the cursor clamps to it.
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn advance(&mut self) -> Token<'src> {
        let token = *self.current();
        if token.kind != TokenKind::End {
            self.cursor += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> ParseResult<Token<'src>> {
        if !self.at(kind) {
            return Err(self.unexpected(kind));
        }
        Ok(self.advance())
    }

    fn unexpected(&self, expected: TokenKind) -> SyntaxError {
        let found = self.current();
        SyntaxError::UnexpectedToken {
            expected,
            found: found.kind,
            src: self.source.to_string(),
            span: found.span.range().into(),
        }
    }
}

pub fn parse(source: &str) -> ParseResult<Node<'_>> {
    Parser::new(source)?.parse()
}
