use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    Greater,
    Equal,
    NotEqual,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Negate,
    Not,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue<'src> {
    Int(i64),
    /// String content with the surrounding quotes already stripped.
    Str(&'src str),
    Bool(bool),
    Null,
}

/// One node of the syntax tree. Every variant keeps a provenance token:
/// a leaf's own token, the operator token for expression nodes, or the
/// introducing token for statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'src> {
    Program {
        token: Token<'src>,
        body: Vec<Node<'src>>,
    },
    StatementList {
        token: Token<'src>,
        children: Vec<Node<'src>>,
    },
    ExpressionStatement {
        token: Token<'src>,
        expression: Box<Node<'src>>,
    },
    EmptyStatement {
        token: Token<'src>,
    },
    VariableStatement {
        token: Token<'src>,
        declarations: Vec<Node<'src>>,
    },
    VariableDeclaration {
        token: Token<'src>,
        identifier: Box<Node<'src>>,
        initializer: Option<Box<Node<'src>>>,
    },
    IfStatement {
        token: Token<'src>,
        test: Box<Node<'src>>,
        consequent: Box<Node<'src>>,
        alternate: Option<Box<Node<'src>>>,
    },
    Literal {
        token: Token<'src>,
        value: LiteralValue<'src>,
    },
    Identifier {
        token: Token<'src>,
    },
    BinaryExpression {
        token: Token<'src>,
        operator: BinaryOperator,
        left: Box<Node<'src>>,
        right: Box<Node<'src>>,
    },
    LogicalExpression {
        token: Token<'src>,
        operator: LogicalOperator,
        left: Box<Node<'src>>,
        right: Box<Node<'src>>,
    },
    UnaryExpression {
        token: Token<'src>,
        operator: UnaryOperator,
        operand: Box<Node<'src>>,
    },
    AssignmentExpression {
        token: Token<'src>,
        operator: Option<BinaryOperator>,
        left: Box<Node<'src>>,
        right: Box<Node<'src>>,
    },
}

impl<'src> Node<'src> {
    pub fn token(&self) -> &Token<'src> {
        match self {
            Node::Program { token, .. }
            | Node::StatementList { token, .. }
            | Node::ExpressionStatement { token, .. }
            | Node::EmptyStatement { token }
            | Node::VariableStatement { token, .. }
            | Node::VariableDeclaration { token, .. }
            | Node::IfStatement { token, .. }
            | Node::Literal { token, .. }
            | Node::Identifier { token }
            | Node::BinaryExpression { token, .. }
            | Node::LogicalExpression { token, .. }
            | Node::UnaryExpression { token, .. }
            | Node::AssignmentExpression { token, .. } => token,
        }
    }
}
