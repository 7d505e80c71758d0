use astwalk::interpreter::{Interpreter, RuntimeError, Value};
use astwalk::parser::SyntaxError;
use indoc::indoc;

fn run(source: &str) -> Interpreter<'_> {
    let mut interpreter = Interpreter::new(source).expect("parse failed");
    interpreter.run().expect("run failed");
    interpreter
}

fn stack_int(interpreter: &Interpreter<'_>, slot: usize) -> i64 {
    match interpreter.stack()[slot] {
        Value::Int(value) => value,
        Value::Str(_) => panic!("expected an int in slot {slot}"),
    }
}

fn stack_str<'a>(interpreter: &'a Interpreter<'a>, slot: usize) -> &'a str {
    match interpreter.stack()[slot] {
        Value::Str(reference) => interpreter.string(reference),
        Value::Int(_) => panic!("expected a string in slot {slot}"),
    }
}

fn str_variable<'a>(interpreter: &'a Interpreter<'a>, name: &str) -> &'a str {
    match interpreter.variables().get(name) {
        Some(Value::Str(reference)) => interpreter.string(*reference),
        other => panic!("expected string variable '{name}', got {other:?}"),
    }
}

#[test]
fn runs_a_complete_program() {
    let interpreter = run(indoc! {r#"
        var count = 3, label = "eggs";
        var summary = label + ": ";
        if (count > 2 && count < 10) {
            summary += "several";
            count *= 2;
        } else {
            summary = summary + "few";
        }
        count;
        summary;
    "#});

    assert_eq!(interpreter.stack().len(), 4);
    assert_eq!(stack_str(&interpreter, 0), "eggs: several");
    assert_eq!(stack_int(&interpreter, 1), 6);
    assert_eq!(stack_int(&interpreter, 2), 6);
    assert_eq!(stack_str(&interpreter, 3), "eggs: several");

    assert_eq!(interpreter.variables().get("count"), Some(&Value::Int(6)));
    assert_eq!(str_variable(&interpreter, "label"), "eggs");
    assert_eq!(str_variable(&interpreter, "summary"), "eggs: several");

    // The heap records every string in allocation order and frees nothing.
    assert_eq!(
        interpreter.strings(),
        ["eggs", ": ", "eggs: ", "several", "eggs: several"]
    );
}

#[test]
fn else_branch_runs_when_the_test_is_falsy() {
    let interpreter = run(indoc! {r#"
        var count = 1;
        var summary = "";
        if (count > 2) summary = "several"; else summary = "few";
        count < 2;
    "#});

    assert_eq!(interpreter.stack().len(), 2);
    assert_eq!(stack_str(&interpreter, 0), "few");
    assert_eq!(stack_int(&interpreter, 1), 1);
    assert_eq!(str_variable(&interpreter, "summary"), "few");
}

#[test]
fn nested_dangling_else_resolves_per_branch() {
    let interpreter = run(indoc! {"
        var a; var b;
        if (1) if (0) a = 1; else a = 2; else b = 3;
    "});

    assert_eq!(interpreter.variables().get("a"), Some(&Value::Int(2)));
    assert_eq!(interpreter.variables().get("b"), Some(&Value::Int(0)));
    assert_eq!(interpreter.stack().len(), 1);
    assert_eq!(stack_int(&interpreter, 0), 2);
}

#[test]
fn faults_preserve_the_state_built_so_far() {
    let mut interpreter = Interpreter::new(indoc! {"
        var progress = 0;
        progress = 1;
        10 / (progress - 1);
        progress = 2;
    "})
    .expect("parse failed");

    let error = interpreter.run().expect_err("expected division by zero");
    assert_eq!(error, RuntimeError::DivisionByZero);
    assert_eq!(
        interpreter.variables().get("progress"),
        Some(&Value::Int(1))
    );
    assert_eq!(interpreter.stack().len(), 1);
    assert_eq!(stack_int(&interpreter, 0), 1);
}

#[test]
fn each_expression_statement_leaves_one_value() {
    let interpreter = run("1 + 1; 2 * 3; \"done\";");
    assert_eq!(interpreter.stack().len(), 3);
    assert_eq!(stack_int(&interpreter, 0), 2);
    assert_eq!(stack_int(&interpreter, 1), 6);
    assert_eq!(stack_str(&interpreter, 2), "done");
}

#[test]
fn simple_assignment_binds_but_compound_does_not() {
    let interpreter = run("tally = 5; tally += 5;");
    assert_eq!(interpreter.variables().get("tally"), Some(&Value::Int(10)));
    assert_eq!(stack_int(&interpreter, 0), 5);
    assert_eq!(stack_int(&interpreter, 1), 10);

    let mut interpreter = Interpreter::new("ghost += 1;").expect("parse failed");
    assert_eq!(
        interpreter.run(),
        Err(RuntimeError::UndefinedVariable {
            name: "ghost".to_string()
        })
    );
}

#[test]
fn syntax_errors_carry_readable_messages() {
    let error = Interpreter::new("2 + ;").expect_err("expected a syntax error");
    assert!(matches!(error, SyntaxError::ExpectedExpression { .. }));
    assert_eq!(error.to_string(), "Expected an expression, found ';'");

    let error = Interpreter::new("1").expect_err("expected a syntax error");
    assert_eq!(error.to_string(), "Expected ';', found end of input");

    let error = Interpreter::new("var @;").expect_err("expected a lex error");
    assert!(matches!(error, SyntaxError::Lex(_)));
}
