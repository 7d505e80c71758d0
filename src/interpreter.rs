use std::collections::HashMap;

use crate::ast::Node;
use crate::parser::{self, SyntaxError};

mod error;
mod runtime;
mod stack;
mod value;

pub use error::{RuntimeError, RuntimeResult};
pub use stack::STACK_CAPACITY;
pub use value::{HeapRef, Value};

use runtime::Runtime;

/// Tree-walking evaluator. Owns the parsed program plus all machine state,
/// and leaves that state inspectable after a run.
#[derive(Debug)]
pub struct Interpreter<'src> {
    ast: Node<'src>,
    runtime: Runtime,
}

impl<'src> Interpreter<'src> {
    /// Parses `source` and readies an interpreter with empty machine state.
    pub fn new(source: &'src str) -> Result<Self, SyntaxError> {
        Ok(Self {
            ast: parser::parse(source)?,
            runtime: Runtime::default(),
        })
    }

    /// Walks the whole program. State mutated before a fault is kept, so a
    /// failed run leaves the stack and variables exactly as the fault saw
    /// them.
    pub fn run(&mut self) -> RuntimeResult<()> {
        let Self { ast, runtime } = self;
        runtime.exec_statement(ast)
    }

    pub fn ast(&self) -> &Node<'src> {
        &self.ast
    }

    /// Execution stack in push order; the last slot is the top.
    pub fn stack(&self) -> &[Value] {
        self.runtime.stack.values()
    }

    /// Every string the run produced, in allocation order.
    pub fn strings(&self) -> &[String] {
        self.runtime.heap.strings()
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.runtime.variables
    }

    pub fn string(&self, reference: HeapRef) -> &str {
        self.runtime.heap.resolve(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn run(source: &str) -> Interpreter<'_> {
        let mut interpreter = Interpreter::new(source).expect("parse failed");
        interpreter.run().expect("run failed");
        interpreter
    }

    fn run_err(source: &str) -> (Interpreter<'_>, RuntimeError) {
        let mut interpreter = Interpreter::new(source).expect("parse failed");
        let error = interpreter.run().expect_err("expected a runtime error");
        (interpreter, error)
    }

    fn stack_ints(interpreter: &Interpreter<'_>) -> Vec<i64> {
        interpreter
            .stack()
            .iter()
            .map(|value| match value {
                Value::Int(value) => *value,
                Value::Str(_) => panic!("expected an int on the stack"),
            })
            .collect()
    }

    fn int_variable(interpreter: &Interpreter<'_>, name: &str) -> i64 {
        match interpreter.variables().get(name) {
            Some(Value::Int(value)) => *value,
            other => panic!("expected int variable '{name}', got {other:?}"),
        }
    }

    #[test]
    fn evaluates_arithmetic_with_precedence() {
        let interpreter = run("2 + 2 * 2;");
        assert_eq!(stack_ints(&interpreter), [6]);

        let interpreter = run("(2 + 2) * 2;");
        assert_eq!(stack_ints(&interpreter), [8]);

        let interpreter = run("45 + 25 - 1;");
        assert_eq!(stack_ints(&interpreter), [69]);
    }

    #[test]
    fn expression_statements_accumulate_on_the_stack() {
        let interpreter = run("1; 2; 3;");
        assert_eq!(stack_ints(&interpreter), [1, 2, 3]);
    }

    #[test]
    fn concatenation_allocates_in_evaluation_order() {
        let interpreter = run("\"abc\" + \"def\";");
        // The right operand is evaluated first, so "def" hits the heap
        // before "abc"; the result is appended last.
        assert_eq!(interpreter.strings(), ["def", "abc", "abcdef"]);
        let [Value::Str(result)] = interpreter.stack() else {
            panic!("expected one string on the stack");
        };
        assert_eq!(interpreter.string(*result), "abcdef");
    }

    #[test]
    fn variables_round_trip_through_the_environment() {
        let interpreter = run(indoc! {"
            var a = 5;
            var b = 44 + 25;
            var c = b - a;
        "});
        assert!(interpreter.stack().is_empty());
        assert_eq!(int_variable(&interpreter, "a"), 5);
        assert_eq!(int_variable(&interpreter, "b"), 69);
        assert_eq!(int_variable(&interpreter, "c"), 64);
    }

    #[test]
    fn declaration_without_initializer_defaults_to_zero() {
        let interpreter = run("var x; x;");
        assert_eq!(stack_ints(&interpreter), [0]);
    }

    #[test]
    fn declaration_lists_bind_left_to_right() {
        let interpreter = run("var a = 1, b = a + 1; b;");
        assert_eq!(stack_ints(&interpreter), [2]);
        assert_eq!(int_variable(&interpreter, "b"), 2);
    }

    #[test]
    fn compound_assignment_reads_then_writes() {
        let interpreter = run("var a = 10; a += 5; a *= 2;");
        assert_eq!(stack_ints(&interpreter), [15, 30]);
        assert_eq!(int_variable(&interpreter, "a"), 30);
    }

    #[test]
    fn compound_assignment_concatenates_strings() {
        let interpreter = run("var s = \"ab\"; s += \"!\";");
        let [Value::Str(result)] = interpreter.stack() else {
            panic!("expected one string on the stack");
        };
        assert_eq!(interpreter.string(*result), "ab!");
    }

    #[test]
    fn compound_assignment_requires_a_declared_variable() {
        let (_, error) = run_err("a += 1;");
        assert_eq!(
            error,
            RuntimeError::UndefinedVariable {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn simple_assignment_binds_undeclared_names() {
        let interpreter = run("a = 3; a;");
        assert_eq!(stack_ints(&interpreter), [3, 3]);
        assert_eq!(int_variable(&interpreter, "a"), 3);
    }

    #[test]
    fn chained_assignment_applies_right_to_left() {
        let interpreter = run("var a; var b; a = b = 2;");
        assert_eq!(stack_ints(&interpreter), [2]);
        assert_eq!(int_variable(&interpreter, "a"), 2);
        assert_eq!(int_variable(&interpreter, "b"), 2);
    }

    #[test]
    fn reading_an_undefined_variable_fails() {
        let (_, error) = run_err("missing;");
        assert_eq!(
            error,
            RuntimeError::UndefinedVariable {
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn if_branches_follow_truthiness() {
        let interpreter = run(indoc! {r#"
            var a = 0;
            if (a) a = 1; else a = 2;
            if ("x") a = a + 10;
            if ("") a = 100;
            if (null) a = 200;
            if (true) a = a + 1;
        "#});
        assert_eq!(int_variable(&interpreter, "a"), 13);
        assert_eq!(stack_ints(&interpreter), [2, 12, 13]);
    }

    #[test]
    fn logical_operators_short_circuit() {
        // The deciding operand is the result; the other side never runs.
        let interpreter = run("0 && missing;");
        assert_eq!(stack_ints(&interpreter), [0]);

        let interpreter = run("1 || missing;");
        assert_eq!(stack_ints(&interpreter), [1]);

        let interpreter = run("2 && 3;");
        assert_eq!(stack_ints(&interpreter), [3]);

        let interpreter = run("\"\" || 5;");
        assert_eq!(stack_ints(&interpreter), [5]);
    }

    #[test]
    fn unary_operators_apply_to_the_operand_value() {
        let interpreter = run("-(2 + 3); +7; !5; !0; !\"\";");
        assert_eq!(stack_ints(&interpreter), [-5, 7, 0, 1, 1]);
    }

    #[test]
    fn integer_division_truncates() {
        let interpreter = run("7 / 2; 0 - 7 / 2;");
        assert_eq!(stack_ints(&interpreter), [3, -3]);
    }

    #[test]
    fn division_by_zero_faults_and_keeps_prior_state() {
        let (interpreter, error) = run_err("5; 1 / 0;");
        assert_eq!(error, RuntimeError::DivisionByZero);
        assert_eq!(stack_ints(&interpreter), [5]);
    }

    #[test]
    fn dividing_the_minimum_int_by_minus_one_faults() {
        let (interpreter, error) = run_err("(-9223372036854775807 - 1) / -1;");
        assert_eq!(error, RuntimeError::DivisionOverflow);
        assert!(interpreter.stack().is_empty());
    }

    #[test]
    fn mixed_operand_types_are_rejected() {
        let (_, error) = run_err("\"a\" + 1;");
        assert_eq!(
            error,
            RuntimeError::OperandTypeMismatch {
                operation: "+".to_string(),
                left: "string".to_string(),
                right: "int".to_string(),
            }
        );
    }

    #[test]
    fn strings_support_concatenation_only() {
        // Identical operands on purpose: `==` must be rejected, not answered.
        for operation in ["-", "*", "/", "<", ">", "==", "!="] {
            let source = format!("\"ab\" {operation} \"ab\";");
            let (_, error) = run_err(&source);
            assert_eq!(
                error,
                RuntimeError::UnsupportedOperation {
                    operation: operation.to_string(),
                    type_name: "string".to_string(),
                }
            );
        }

        let (_, error) = run_err("-\"a\";");
        assert_eq!(
            error,
            RuntimeError::UnsupportedOperation {
                operation: "-".to_string(),
                type_name: "string".to_string(),
            }
        );
    }

    #[test]
    fn booleans_and_null_lower_to_integers() {
        let interpreter = run("true; false; null;");
        assert_eq!(stack_ints(&interpreter), [1, 0, 0]);
    }

    #[test]
    fn running_twice_accumulates_machine_state() {
        let mut interpreter = Interpreter::new("1;").expect("parse failed");
        interpreter.run().expect("first run failed");
        interpreter.run().expect("second run failed");
        assert_eq!(stack_ints(&interpreter), [1, 1]);
    }

    #[test]
    fn the_sixty_fifth_push_overflows() {
        let full = "1; ".repeat(STACK_CAPACITY);
        let interpreter = run(&full);
        assert_eq!(interpreter.stack().len(), STACK_CAPACITY);

        let over = "1; ".repeat(STACK_CAPACITY + 1);
        let mut interpreter = Interpreter::new(&over).expect("parse failed");
        let error = interpreter.run().expect_err("expected overflow");
        assert_eq!(
            error,
            RuntimeError::StackOverflow {
                capacity: STACK_CAPACITY
            }
        );
        assert_eq!(interpreter.stack().len(), STACK_CAPACITY);
    }

    #[test]
    fn blocks_and_empty_statements_run_flat() {
        let interpreter = run("{ } ; { var q = 7; }");
        assert!(interpreter.stack().is_empty());
        // Blocks do not introduce scopes; declarations land in the one
        // environment.
        assert_eq!(int_variable(&interpreter, "q"), 7);
    }
}
