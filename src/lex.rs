use std::fmt::Display;

use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;
use tracing::trace;

use crate::op::Op;

/// Value of the `pi` identifier, kept at 13 significant digits.
pub const PI: f64 = 3.141592653589;

pub(crate) fn named_source(whole: &str) -> NamedSource<String> {
    NamedSource::new("<expr>", whole.to_string())
}

#[derive(Error, Debug, Diagnostic)]
#[error("Unexpected token '{token}'")]
#[diagnostic(help("remove or correct the token: `{token}`"))]
pub struct SingleTokenError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this character")]
    bad_bit: SourceSpan,

    pub token: char,
}

impl SingleTokenError {
    pub(crate) fn new(whole: &str, token: &Token<'_>) -> Self {
        SingleTokenError {
            src: named_source(whole),
            bad_bit: token.span(),
            token: token.literal.chars().next().unwrap_or('\0'),
        }
    }

    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

/// Why a numeric literal could not be converted. Positions are byte offsets
/// inside the literal.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralError {
    #[error("it has no digits")]
    NoDigits,
    #[error("second decimal point at position {0}")]
    SecondPoint(usize),
    #[error("sign at position {0} is not at the start")]
    MisplacedSign(usize),
    #[error("unexpected character '{1}' at position {0}")]
    Unexpected(usize, char),
}

impl LiteralError {
    fn position(self) -> Option<usize> {
        match self {
            LiteralError::NoDigits => None,
            LiteralError::SecondPoint(at)
            | LiteralError::MisplacedSign(at)
            | LiteralError::Unexpected(at, _) => Some(at),
        }
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("Malformed numeric literal `{literal}`: {reason}")]
#[diagnostic(help("numbers are digits with at most one `.`, optionally preceded by `-`"))]
pub struct MalformedLiteral {
    #[source_code]
    src: NamedSource<String>,

    #[label("this literal")]
    bad_bit: SourceSpan,

    pub literal: String,
    pub reason: LiteralError,
}

impl MalformedLiteral {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    pub offset: usize,
}

impl Token<'_> {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::from(self.offset..self.end())
    }

    pub fn end(&self) -> usize {
        self.offset + self.literal.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident,
    Op(Op),
    LeftParen,
    RightParen,
    Comma,
    EndOfStream,
    Unknown,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::Number(n) => {
                if n.is_finite() && n == n.trunc() {
                    write!(f, "NUMBER {lit} {n}.0")
                } else {
                    write!(f, "NUMBER {lit} {n}")
                }
            }
            TokenKind::Ident => write!(f, "IDENTIFIER {lit} null"),
            TokenKind::Op(Op::Add) => write!(f, "PLUS {lit} null"),
            TokenKind::Op(Op::Sub) => write!(f, "MINUS {lit} null"),
            TokenKind::Op(Op::Mul) => write!(f, "STAR {lit} null"),
            TokenKind::Op(Op::Div) => write!(f, "SLASH {lit} null"),
            TokenKind::Op(Op::Pow) => write!(f, "CARET {lit} null"),
            TokenKind::Op(Op::Sin) => write!(f, "SIN {lit} null"),
            TokenKind::Op(Op::Cos) => write!(f, "COS {lit} null"),
            TokenKind::Op(Op::Tan) => write!(f, "TAN {lit} null"),
            TokenKind::Op(Op::Max) => write!(f, "MAX {lit} null"),
            TokenKind::Op(Op::Min) => write!(f, "MIN {lit} null"),
            TokenKind::Op(Op::Neg) => write!(f, "NEGATE {lit} null"),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit} null"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit} null"),
            TokenKind::Comma => write!(f, "COMMA {lit} null"),
            TokenKind::EndOfStream => write!(f, "EOF {lit} null"),
            TokenKind::Unknown => write!(f, "UNKNOWN {lit} null"),
        }
    }
}

/// Converts a numeric literal digit by digit.
///
/// Digits accumulate into an unsigned magnitude and a decimal exponent: each
/// fractional digit lowers the exponent by one, and the result is
/// `±magnitude * 10^exponent`. Once the magnitude is full, later integer
/// digits only raise the exponent and later fractional digits are dropped.
/// A single leading `+` or `-` is accepted; a sign anywhere else is rejected
/// rather than guessed at.
pub fn number_value(literal: &str) -> Result<f64, LiteralError> {
    let mut negative = false;
    let mut magnitude = 0u64;
    let mut full = false;
    let mut exponent = 0i32;
    let mut digits = 0usize;
    let mut in_fraction = false;

    for (at, c) in literal.char_indices() {
        match c {
            '0'..='9' => {
                let digit = u64::from(c as u8 - b'0');
                digits += 1;
                let next = magnitude
                    .checked_mul(10)
                    .and_then(|m| m.checked_add(digit))
                    .filter(|_| !full);
                match next {
                    Some(m) => {
                        magnitude = m;
                        if in_fraction {
                            exponent = exponent.saturating_sub(1);
                        }
                    }
                    None => {
                        full = true;
                        if !in_fraction {
                            exponent = exponent.saturating_add(1);
                        }
                    }
                }
            }
            '.' if !in_fraction => in_fraction = true,
            '.' => return Err(LiteralError::SecondPoint(at)),
            '-' | '+' if at == 0 => negative = c == '-',
            '-' | '+' => return Err(LiteralError::MisplacedSign(at)),
            c => return Err(LiteralError::Unexpected(at, c)),
        }
    }

    if digits == 0 {
        return Err(LiteralError::NoDigits);
    }

    let value = scale(magnitude as f64, exponent);
    Ok(if negative { -value } else { value })
}

/// `value * 10^exponent`, in steps small enough that no power of ten
/// overflows or underflows on its own.
fn scale(mut value: f64, mut exponent: i32) -> f64 {
    const STEP: i32 = 300;
    while exponent != 0 && value != 0.0 && value.is_finite() {
        let step = exponent.clamp(-STEP, STEP);
        value = if step < 0 {
            value / 10f64.powi(-step)
        } else {
            value * 10f64.powi(step)
        };
        exponent -= step;
    }
    value
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0b' | '\x0c' | '\r' | '\n')
}

pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    pub byte: usize,
    previous: Option<TokenKind>,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
            previous: None,
        }
    }

    /// Returns the next token, or `EndOfStream` once the input is exhausted
    /// (and on every call after that).
    pub fn next_token(&mut self) -> Result<Token<'de>, Error> {
        let token = match self.scan() {
            Ok(token) => token,
            Err(e) => {
                // Only literals fail to scan; the next `-` still follows an operand.
                self.previous = Some(TokenKind::Number(f64::NAN));
                return Err(e);
            }
        };
        trace!(%token, offset = token.offset, "lexed");
        self.previous = Some(token.kind);
        Ok(token)
    }

    /// A `-` is unary at the start of input and after an operator, an opening
    /// parenthesis or a comma.
    fn minus_is_unary(&self) -> bool {
        matches!(
            self.previous,
            None | Some(TokenKind::Op(_) | TokenKind::LeftParen | TokenKind::Comma)
        )
    }

    fn scan(&mut self) -> Result<Token<'de>, Error> {
        let trimmed = self.rest.trim_start_matches(is_whitespace);
        self.byte += self.rest.len() - trimmed.len();
        self.rest = trimmed;

        let offset = self.byte;
        let cur = self.rest;
        let mut chars = cur.chars();
        let Some(c) = chars.next() else {
            return Ok(Token {
                kind: TokenKind::EndOfStream,
                literal: "",
                offset,
            });
        };
        let literal = &cur[..c.len_utf8()];
        self.rest = chars.as_str();
        self.byte += c.len_utf8();

        enum Start {
            Ident,
            Number,
        }

        let process = |kind: TokenKind| {
            Ok(Token {
                kind,
                literal,
                offset,
            })
        };

        let started = match c {
            '(' => return process(TokenKind::LeftParen),
            ')' => return process(TokenKind::RightParen),
            ',' => return process(TokenKind::Comma),
            '+' => return process(TokenKind::Op(Op::Add)),
            '*' => return process(TokenKind::Op(Op::Mul)),
            '/' => return process(TokenKind::Op(Op::Div)),
            '^' => return process(TokenKind::Op(Op::Pow)),
            '-' if self.minus_is_unary() => {
                if self.rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
                    Start::Number
                } else {
                    return process(TokenKind::Op(Op::Neg));
                }
            }
            '-' => return process(TokenKind::Op(Op::Sub)),
            'a'..='z' | 'A'..='Z' => Start::Ident,
            '0'..='9' | '.' => Start::Number,
            _ => return process(TokenKind::Unknown),
        };

        match started {
            Start::Ident => {
                let end = cur
                    .find(|c| !matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_'))
                    .unwrap_or(cur.len());
                let literal = &cur[..end];
                self.advance(end - c.len_utf8());

                let kind = match literal {
                    "pi" => TokenKind::Number(PI),
                    name => Op::function(name).map_or(TokenKind::Ident, TokenKind::Op),
                };

                Ok(Token {
                    kind,
                    literal,
                    offset,
                })
            }
            Start::Number => {
                let body = if c == '-' { &cur[1..] } else { cur };
                let body_end = body
                    .find(|c| !matches!(c, '0'..='9' | '.'))
                    .unwrap_or(body.len());
                let end = cur.len() - body.len() + body_end;
                let literal = &cur[..end];
                self.advance(end - c.len_utf8());

                match number_value(literal) {
                    Ok(n) => Ok(Token {
                        kind: TokenKind::Number(n),
                        literal,
                        offset,
                    }),
                    Err(reason) => {
                        let bad_bit = match reason.position() {
                            Some(at) => SourceSpan::from(offset + at..offset + at + 1),
                            None => SourceSpan::from(offset..offset + literal.len()),
                        };
                        Err(MalformedLiteral {
                            src: named_source(self.whole),
                            bad_bit,
                            literal: literal.to_string(),
                            reason,
                        }
                        .into())
                    }
                }
            }
        }
    }

    fn advance(&mut self, bytes: usize) {
        self.rest = &self.rest[bytes..];
        self.byte += bytes;
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(Token {
                kind: TokenKind::EndOfStream,
                ..
            }) => None,
            other => Some(other),
        }
    }
}
