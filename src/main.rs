use std::collections::HashMap;

use clap::Parser as ClapParser;
use numexpr::{token::Span, value::Number, Parser};

/// numexpr compiles an arithmetic expression and evaluates it against the
/// variable bindings supplied on the command line.
#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Skips the algebraic optimizer and evaluates the expression exactly as
    /// written.
    #[arg(short, long)]
    unoptimized: bool,

    /// Binds a variable for evaluation, e.g. `-b x=3 -b y=0.5`. May be
    /// repeated.
    #[arg(short, long = "bind", value_name = "NAME=VALUE")]
    bind: Vec<String>,

    expression: String,
}

fn main() {
    let args = Args::parse();

    let mut bindings = HashMap::new();
    for binding in &args.bind {
        let Some((name, value)) = parse_binding(binding) else {
            eprintln!("Invalid binding '{binding}'. Expected the form NAME=VALUE, e.g. x=3.");
            std::process::exit(1);
        };
        bindings.insert(name, value);
    }

    let parser = Parser::new();
    let parsed = if args.unoptimized {
        parser.parse_unoptimized(&args.expression)
    } else {
        parser.parse(&args.expression)
    };
    let expression = match parsed {
        Ok(expression) => expression,
        Err(error) => {
            report(&args.expression, &error.to_string(), error.span());
            std::process::exit(1);
        },
    };

    match expression.evaluate(&bindings) {
        Ok(value) => println!("{value}"),
        Err(error) => {
            report(&args.expression, &error.to_string(), error.span());
            std::process::exit(1);
        },
    }
}

fn parse_binding(binding: &str) -> Option<(String, Number)> {
    let (name, value) = binding.split_once('=')?;
    let value = if let Ok(integer) = value.parse::<i64>() {
        Number::Integer(integer)
    } else {
        Number::Real(value.parse().ok()?)
    };
    Some((name.trim().to_string(), value))
}

/// Prints the error followed by the source line and a caret pointing at the
/// offending span.
fn report(source: &str, message: &str, span: Span) {
    eprintln!("{message}");
    eprintln!("  {source}");
    let width = (span.end - span.start).max(1);
    eprintln!("  {}{}", " ".repeat(span.start), "^".repeat(width));
}
