use miette::{Diagnostic, Error, LabeledSpan, NamedSource, SourceSpan, miette};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    lex::{SingleTokenError, TokenKind, named_source},
    op::Op,
    parse::Rpn,
    system,
};

#[derive(Error, Debug, Diagnostic)]
#[error("Missing operand for `{op}`")]
#[diagnostic(help("`{op}` takes {expected} operand(s) but only {found} were available"))]
pub struct MissingOperand {
    #[source_code]
    src: NamedSource<String>,

    #[label("this operator")]
    bad_bit: SourceSpan,

    pub op: Op,
    pub expected: usize,
    pub found: usize,
}

impl MissingOperand {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("Expression leaves {count} values instead of one")]
#[diagnostic(help("put an operator between the values"))]
pub struct TrailingValues {
    #[source_code]
    src: NamedSource<String>,

    #[label("unexpected value")]
    bad_bit: SourceSpan,

    pub count: usize,
}

impl TrailingValues {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("Unknown identifier `{name}`")]
#[diagnostic(help("the known names are pi, sin, cos, tan, max and min"))]
pub struct UnknownIdentifier {
    #[source_code]
    src: NamedSource<String>,

    #[label("not a number or function")]
    bad_bit: SourceSpan,

    pub name: String,
}

impl UnknownIdentifier {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("Empty expression")]
#[diagnostic(help("write something to evaluate, e.g. `1+2`"))]
pub struct EmptyExpression {
    #[source_code]
    src: NamedSource<String>,
}

/// Runs a postfix sequence on a value stack.
///
/// Alongside every value the stack keeps the byte range it was computed
/// from, which is what the diagnostics point at.
pub fn evaluate(rpn: &Rpn<'_>) -> Result<f64, Error> {
    let whole = rpn.whole();
    let mut values: Vec<f64> = Vec::with_capacity(rpn.len());
    let mut spans: Vec<(usize, usize)> = Vec::with_capacity(rpn.len());

    for token in rpn.tokens() {
        match token.kind {
            TokenKind::Number(n) => {
                values.push(n);
                spans.push((token.offset, token.end()));
            }
            TokenKind::Ident => {
                return Err(UnknownIdentifier {
                    src: named_source(whole),
                    bad_bit: token.span(),
                    name: token.literal.to_string(),
                }
                .into());
            }
            TokenKind::Op(op) => {
                let Some(first) = values.len().checked_sub(op.arity()) else {
                    return Err(MissingOperand {
                        src: named_source(whole),
                        bad_bit: token.span(),
                        op,
                        expected: op.arity(),
                        found: values.len(),
                    }
                    .into());
                };

                let value = system::apply(op, &values[first..])?;
                trace!(%op, operands = ?&values[first..], value, "applied");

                let start = spans[first..]
                    .iter()
                    .map(|&(start, _)| start)
                    .fold(token.offset, usize::min);
                let end = spans[first..]
                    .iter()
                    .map(|&(_, end)| end)
                    .fold(token.end(), usize::max);

                values.truncate(first);
                spans.truncate(first);
                values.push(value);
                spans.push((start, end));
            }
            TokenKind::Unknown => return Err(SingleTokenError::new(whole, token).into()),
            TokenKind::LeftParen
            | TokenKind::RightParen
            | TokenKind::Comma
            | TokenKind::EndOfStream => {
                return Err(miette!(
                    labels = vec![LabeledSpan::at(token.offset..token.end(), "here")],
                    "`{}` cannot appear in a postfix sequence",
                    token.literal
                )
                .with_source_code(whole.to_string()));
            }
        }
    }

    match (values.as_slice(), spans.as_slice()) {
        ([value], _) => {
            debug!(value, "evaluated");
            Ok(*value)
        }
        ([], _) => Err(EmptyExpression {
            src: named_source(whole),
        }
        .into()),
        (_, [_, (start, end), ..]) => Err(TrailingValues {
            src: named_source(whole),
            bad_bit: SourceSpan::from(*start..*end),
            count: values.len(),
        }
        .into()),
        _ => Err(miette!("value stack and span stack diverged")),
    }
}
