use std::time::Instant;

use miette::Error;

pub mod eval;
pub mod lex;
pub mod op;
pub mod parse;
pub mod probe;
pub mod system;

pub use eval::evaluate;
pub use lex::{Lexer, Token, TokenKind};
pub use op::Op;
pub use parse::{Parser, Rpn};
pub use probe::{NoProbe, Probe, Stage, Timings};

/// Evaluates one expression: tokenize, convert to postfix, run.
pub fn eval(input: &str) -> Result<f64, Error> {
    eval_with(input, &mut NoProbe)
}

pub fn eval_with(input: &str, probe: &mut impl Probe) -> Result<f64, Error> {
    let started = Instant::now();
    let rpn = Parser::new(input).parse()?;
    probe.record(Stage::Convert, started.elapsed());

    let started = Instant::now();
    let value = evaluate(&rpn)?;
    probe.record(Stage::Evaluate, started.elapsed());

    Ok(value)
}
