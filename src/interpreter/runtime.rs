use std::collections::HashMap;

use crate::ast::{BinaryOperator, LiteralValue, LogicalOperator, Node, UnaryOperator};

use super::error::{RuntimeError, RuntimeResult};
use super::stack::Stack;
use super::value::{Heap, HeapRef, Value};

/// Machine state threaded through execution: the operand stack, the string
/// heap, and the variable environment.
#[derive(Debug, Default)]
pub(super) struct Runtime {
    pub(super) stack: Stack,
    pub(super) heap: Heap,
    pub(super) variables: HashMap<String, Value>,
}

impl Runtime {
    pub(super) fn exec_statement(&mut self, statement: &Node<'_>) -> RuntimeResult<()> {
        match statement {
            Node::Program { body, .. } => {
                for child in body {
                    self.exec_statement(child)?;
                }
                Ok(())
            }
            Node::StatementList { children, .. } => {
                for child in children {
                    self.exec_statement(child)?;
                }
                Ok(())
            }
            // The produced value intentionally stays on the stack; the final
            // stack is the trace of every expression statement executed.
            Node::ExpressionStatement { expression, .. } => self.eval_expression(expression),
            Node::EmptyStatement { .. } => Ok(()),
            Node::VariableStatement { declarations, .. } => {
                for declaration in declarations {
                    self.exec_statement(declaration)?;
                }
                Ok(())
            }
            Node::VariableDeclaration {
                identifier,
                initializer,
                ..
            } => {
                let value = match initializer {
                    Some(initializer) => {
                        self.eval_expression(initializer)?;
                        self.stack.pop()?
                    }
                    None => Value::Int(0),
                };
                self.variables
                    .insert(identifier.token().text.to_string(), value);
                Ok(())
            }
            Node::IfStatement {
                test,
                consequent,
                alternate,
                ..
            } => {
                self.eval_expression(test)?;
                let test_value = self.stack.pop()?;
                if self.truthy(test_value) {
                    self.exec_statement(consequent)
                } else if let Some(alternate) = alternate {
                    self.exec_statement(alternate)
                } else {
                    Ok(())
                }
            }
            Node::Literal { .. }
            | Node::Identifier { .. }
            | Node::BinaryExpression { .. }
            | Node::LogicalExpression { .. }
            | Node::UnaryExpression { .. }
            | Node::AssignmentExpression { .. } => {
                unreachable!("expression node in statement position")
            }
        }
    }

    /// Evaluates one expression, leaving exactly one value on the stack.
    fn eval_expression(&mut self, expression: &Node<'_>) -> RuntimeResult<()> {
        match expression {
            Node::Literal { value, .. } => {
                let value = match value {
                    LiteralValue::Int(value) => Value::Int(*value),
                    LiteralValue::Str(text) => Value::Str(self.heap.allocate((*text).to_string())),
                    LiteralValue::Bool(value) => Value::Int(i64::from(*value)),
                    LiteralValue::Null => Value::Int(0),
                };
                self.stack.push(value)
            }
            Node::Identifier { token } => {
                let value = self.lookup(token.text)?;
                self.stack.push(value)
            }
            Node::BinaryExpression {
                operator,
                left,
                right,
                ..
            } => {
                // Operands are evaluated right subtree first; the pops below
                // then yield left (pushed last) before right.
                self.eval_expression(right)?;
                self.eval_expression(left)?;
                let left = self.stack.pop()?;
                let right = self.stack.pop()?;
                let result = self.apply_binary(*operator, left, right)?;
                self.stack.push(result)
            }
            Node::LogicalExpression {
                operator,
                left,
                right,
                ..
            } => {
                self.eval_expression(left)?;
                let left_value = self.stack.pop()?;
                let decided = match operator {
                    LogicalOperator::And => !self.truthy(left_value),
                    LogicalOperator::Or => self.truthy(left_value),
                };
                // Short-circuit: the deciding operand is the result.
                if decided {
                    return self.stack.push(left_value);
                }
                self.eval_expression(right)
            }
            Node::UnaryExpression {
                operator, operand, ..
            } => {
                self.eval_expression(operand)?;
                let value = self.stack.pop()?;
                let result = self.apply_unary(*operator, value)?;
                self.stack.push(result)
            }
            Node::AssignmentExpression {
                operator,
                left,
                right,
                ..
            } => {
                let name = left.token().text;
                let value = if let Some(operator) = operator {
                    // Compound assignment reads the target before the
                    // right-hand side runs.
                    let current = self.lookup(name)?;
                    self.eval_expression(right)?;
                    let right_value = self.stack.pop()?;
                    self.apply_binary(*operator, current, right_value)?
                } else {
                    self.eval_expression(right)?;
                    self.stack.pop()?
                };
                self.variables.insert(name.to_string(), value);
                // Assignment is an expression; its value stays available.
                self.stack.push(value)
            }
            Node::Program { .. }
            | Node::StatementList { .. }
            | Node::ExpressionStatement { .. }
            | Node::EmptyStatement { .. }
            | Node::VariableStatement { .. }
            | Node::VariableDeclaration { .. }
            | Node::IfStatement { .. } => {
                unreachable!("statement node in expression position")
            }
        }
    }

    fn apply_binary(
        &mut self,
        operator: BinaryOperator,
        left: Value,
        right: Value,
    ) -> RuntimeResult<Value> {
        match (left, right) {
            (Value::Int(left), Value::Int(right)) => Self::int_binary(operator, left, right),
            (Value::Str(left), Value::Str(right)) => self.str_binary(operator, left, right),
            (left, right) => Err(RuntimeError::OperandTypeMismatch {
                operation: operator.symbol().to_string(),
                left: left.type_name().to_string(),
                right: right.type_name().to_string(),
            }),
        }
    }

    fn int_binary(operator: BinaryOperator, left: i64, right: i64) -> RuntimeResult<Value> {
        let value = match operator {
            BinaryOperator::Add => left + right,
            BinaryOperator::Sub => left - right,
            BinaryOperator::Mul => left * right,
            BinaryOperator::Div => match left.checked_div(right) {
                Some(quotient) => quotient,
                None if right == 0 => return Err(RuntimeError::DivisionByZero),
                // The only other failure: i64::MIN / -1.
                None => return Err(RuntimeError::DivisionOverflow),
            },
            BinaryOperator::Less => i64::from(left < right),
            BinaryOperator::Greater => i64::from(left > right),
            BinaryOperator::Equal => i64::from(left == right),
            BinaryOperator::NotEqual => i64::from(left != right),
        };
        Ok(Value::Int(value))
    }

    fn str_binary(
        &mut self,
        operator: BinaryOperator,
        left: HeapRef,
        right: HeapRef,
    ) -> RuntimeResult<Value> {
        match operator {
            BinaryOperator::Add => {
                let mut combined = self.heap.resolve(left).to_string();
                combined.push_str(self.heap.resolve(right));
                Ok(Value::Str(self.heap.allocate(combined)))
            }
            // Concatenation is the only string operation; everything else,
            // comparisons included, is rejected.
            BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::Less
            | BinaryOperator::Greater
            | BinaryOperator::Equal
            | BinaryOperator::NotEqual => Err(RuntimeError::UnsupportedOperation {
                operation: operator.symbol().to_string(),
                type_name: "string".to_string(),
            }),
        }
    }

    fn apply_unary(&self, operator: UnaryOperator, value: Value) -> RuntimeResult<Value> {
        match (operator, value) {
            (UnaryOperator::Plus, Value::Int(value)) => Ok(Value::Int(value)),
            (UnaryOperator::Negate, Value::Int(value)) => Ok(Value::Int(-value)),
            (UnaryOperator::Not, value) => Ok(Value::Int(i64::from(!self.truthy(value)))),
            (operator, value) => Err(RuntimeError::UnsupportedOperation {
                operation: operator.symbol().to_string(),
                type_name: value.type_name().to_string(),
            }),
        }
    }

    fn truthy(&self, value: Value) -> bool {
        match value {
            Value::Int(value) => value != 0,
            Value::Str(reference) => !self.heap.resolve(reference).is_empty(),
        }
    }

    fn lookup(&self, name: &str) -> RuntimeResult<Value> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })
    }
}
