use miette::{Error, miette};

use crate::op::Op;

/// Applies `op` to its operands, given in the order they were pushed.
pub fn apply(op: Op, operands: &[f64]) -> Result<f64, Error> {
    Ok(match (op, operands) {
        (Op::Add, &[a, b]) => a + b,
        (Op::Sub, &[a, b]) => a - b,
        (Op::Mul, &[a, b]) => a * b,
        // IEEE semantics: x/0 is ±inf or NaN
        (Op::Div, &[a, b]) => a / b,
        (Op::Pow, &[a, b]) => a.powf(b),
        (Op::Sin, &[x]) => x.sin(),
        (Op::Cos, &[x]) => x.cos(),
        (Op::Tan, &[x]) => x.tan(),
        (Op::Max, &[a, b]) => max(a, b),
        (Op::Min, &[a, b]) => min(a, b),
        (Op::Neg, &[x]) => -x,
        _ => {
            return Err(miette!(
                "`{op}` takes {} operand(s), got {}",
                op.arity(),
                operands.len()
            ));
        }
    })
}

/// Keeps `b` unless `a` is strictly greater.
pub fn max(a: f64, b: f64) -> f64 {
    if a > b { a } else { b }
}

/// Keeps `a` on ties.
pub fn min(a: f64, b: f64) -> f64 {
    if a <= b { a } else { b }
}
