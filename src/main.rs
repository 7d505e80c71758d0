use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, WrapErr};

use astwalk::interpreter::{Interpreter, STACK_CAPACITY, Value};
use astwalk::lexer;

/// Runs a script and prints the machine state it leaves behind.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Script to run; reads stdin when omitted.
    file: Option<PathBuf>,

    /// Print the token stream instead of running.
    #[arg(long)]
    tokens: bool,

    /// Print the parsed tree instead of running.
    #[arg(long)]
    ast: bool,
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    let source = match &args.file {
        Some(path) => fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("reading {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .into_diagnostic()
                .wrap_err("reading stdin")?;
            buffer
        }
    };

    if args.tokens {
        for token in lexer::tokenize(&source)? {
            println!("{token}");
        }
        return Ok(());
    }

    let mut interpreter = Interpreter::new(&source)?;
    if args.ast {
        println!("{:#?}", interpreter.ast());
        return Ok(());
    }

    interpreter.run().into_diagnostic()?;
    print_state(&interpreter);
    Ok(())
}

/// Final machine state: the stack top first, then the string heap and the
/// variables sorted by name.
fn print_state(interpreter: &Interpreter<'_>) {
    let stack = interpreter.stack();
    println!("stack ({} of {} slots):", stack.len(), STACK_CAPACITY);
    for (index, value) in stack.iter().enumerate().rev() {
        println!("  {index:>2}  {}", render(interpreter, value));
    }

    let strings = interpreter.strings();
    println!("strings ({}):", strings.len());
    for (index, string) in strings.iter().enumerate() {
        println!("  {index:>2}  {string:?}");
    }

    let mut variables: Vec<_> = interpreter.variables().iter().collect();
    variables.sort_by(|a, b| a.0.cmp(b.0));
    println!("variables ({}):", variables.len());
    for (name, value) in variables {
        println!("  {name} = {}", render(interpreter, value));
    }
}

fn render(interpreter: &Interpreter<'_>, value: &Value) -> String {
    match value {
        Value::Int(value) => value.to_string(),
        Value::Str(reference) => format!("{:?}", interpreter.string(*reference)),
    }
}
