//! A calculator built with the grammar builder.
//!
//! ```text
//! cargo run --example calc -- "2 * (3 + 4)"
//! echo "10 / 4" | cargo run --example calc
//! RUST_LOG=parse_rules=trace cargo run --example calc -- "1 + 2"
//! ```

use std::io::BufRead;

use parse_rules::{Grammar, GrammarBuilder, GrammarError, Term, Value};
use tracing_subscriber::EnvFilter;

fn binary(op: fn(f64, f64) -> f64) -> impl Fn(Vec<Value>) -> Option<f64> + Send + Sync {
    move |args| {
        let lhs = args.first()?.as_f64()?;
        let rhs = args.get(1)?.as_f64()?;
        Some(op(lhs, rhs))
    }
}

pub fn calculator() -> Result<Grammar, GrammarError> {
    let mut builder = GrammarBuilder::new();
    builder.literal_tokens(["+", "-", "*", "/", "(", ")"])?;

    builder
        .rule("expression", ["term", "+", "expression"])?
        .transform(binary(|a, b| a + b));
    builder
        .rule("expression", ["term", "-", "expression"])?
        .transform(binary(|a, b| a - b));
    builder.rule("expression", ["term"])?;

    builder
        .rule("term", ["factor", "*", "term"])?
        .transform(binary(|a, b| a * b));
    builder
        .rule("term", ["factor", "/", "term"])?
        .transform(binary(|a, b| a / b))
        .validate(|args| {
            args.first()
                .and_then(Value::as_f64)
                .is_some_and(f64::is_finite)
                .then_some(())
                .ok_or("division by zero")
        });
    builder.rule("term", ["factor"])?;

    builder.rule("factor", ["number"])?;
    builder.rule("factor", ["(", "expression", ")"])?;

    builder
        .rule("number", [Term::pattern(r"-?[0-9]+(?:\.[0-9]+)?")])?
        .transform(|args| args[0].as_str().and_then(|number| number.parse::<f64>().ok()));

    builder.finish()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let calc = calculator()?;
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let inputs = if args.is_empty() {
        std::io::stdin().lock().lines().collect::<Result<Vec<_>, _>>()?
    } else {
        vec![args.join(" ")]
    };

    for input in inputs {
        match calc.parse(&input) {
            Ok(value) => println!("{value}"),
            Err(err) => eprintln!("{input}: {err}"),
        }
    }
    Ok(())
}
