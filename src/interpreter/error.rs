use thiserror::Error;

/// Typed errors produced while executing a program.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Operation '{operation}' is not supported for type {type_name}")]
    UnsupportedOperation {
        operation: String,
        type_name: String,
    },
    #[error("Operation '{operation}' needs operands of one type, got {left} and {right}")]
    OperandTypeMismatch {
        operation: String,
        left: String,
        right: String,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Integer overflow in division")]
    DivisionOverflow,
    #[error("Stack overflow: the execution stack holds at most {capacity} values")]
    StackOverflow { capacity: usize },
    #[error("Stack underflow: popped from an empty execution stack")]
    StackUnderflow,
}

pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;
