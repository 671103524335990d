use std::fmt::Display;

use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;
use tracing::debug;

use crate::{
    Lexer,
    lex::{SingleTokenError, Token, TokenKind, named_source},
};

#[derive(Error, Debug, Diagnostic)]
#[error("Unbalanced parentheses")]
#[diagnostic(help("every `(` needs a matching `)`"))]
pub struct UnbalancedParens {
    #[source_code]
    src: NamedSource<String>,

    #[label("{reason}")]
    bad_bit: SourceSpan,

    reason: &'static str,
}

impl UnbalancedParens {
    fn unclosed(whole: &str, paren: &Token<'_>) -> Self {
        UnbalancedParens {
            src: named_source(whole),
            bad_bit: paren.span(),
            reason: "this parenthesis is never closed",
        }
    }

    fn unopened(whole: &str, paren: &Token<'_>) -> Self {
        UnbalancedParens {
            src: named_source(whole),
            bad_bit: paren.span(),
            reason: "no `(` matches this parenthesis",
        }
    }

    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("Comma outside of a function call")]
#[diagnostic(help("commas only separate the arguments of `max(a, b)` and `min(a, b)`"))]
pub struct MisplacedComma {
    #[source_code]
    src: NamedSource<String>,

    #[label("this comma")]
    bad_bit: SourceSpan,
}

/// A postfix token sequence together with the text it was converted from.
#[derive(Debug, Clone, PartialEq)]
pub struct Rpn<'de> {
    whole: &'de str,
    tokens: Vec<Token<'de>>,
}

impl<'de> Rpn<'de> {
    pub fn whole(&self) -> &'de str {
        self.whole
    }

    pub fn tokens(&self) -> &[Token<'de>] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Display for Rpn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", token.literal)?;
        }
        Ok(())
    }
}

/// Infix to postfix conversion (shunting-yard).
pub struct Parser<'de> {
    whole: &'de str,
    lexer: Lexer<'de>,
}

impl<'de> Parser<'de> {
    pub fn new(whole: &'de str) -> Self {
        Parser {
            whole,
            lexer: Lexer::new(whole),
        }
    }

    pub fn parse(mut self) -> Result<Rpn<'de>, Error> {
        // Every character yields at most one token.
        let mut output: Vec<Token<'de>> = Vec::with_capacity(self.whole.len());
        let mut operators: Vec<Token<'de>> = Vec::new();

        loop {
            let token = self.lexer.next_token()?;
            match token.kind {
                TokenKind::EndOfStream => break,
                TokenKind::Number(_) | TokenKind::Ident => output.push(token),
                TokenKind::LeftParen => operators.push(token),
                TokenKind::RightParen => loop {
                    match operators.pop() {
                        Some(Token {
                            kind: TokenKind::LeftParen,
                            ..
                        }) => break,
                        Some(op) => output.push(op),
                        None => return Err(UnbalancedParens::unopened(self.whole, &token).into()),
                    }
                },
                TokenKind::Comma => {
                    while let Some(&top) = operators.last() {
                        if top.kind == TokenKind::LeftParen {
                            break;
                        }
                        output.push(top);
                        operators.pop();
                    }
                    if operators.is_empty() {
                        return Err(MisplacedComma {
                            src: named_source(self.whole),
                            bad_bit: token.span(),
                        }
                        .into());
                    }
                }
                TokenKind::Op(op) => {
                    while let Some(&top) = operators.last() {
                        if op.is_prefix() {
                            break;
                        }
                        let TokenKind::Op(top_op) = top.kind else {
                            break;
                        };
                        if !top_op.yields_to(op) {
                            break;
                        }
                        output.push(top);
                        operators.pop();
                    }
                    operators.push(token);
                }
                TokenKind::Unknown => {
                    return Err(SingleTokenError::new(self.whole, &token).into());
                }
            }
        }

        while let Some(top) = operators.pop() {
            if top.kind == TokenKind::LeftParen {
                return Err(UnbalancedParens::unclosed(self.whole, &top).into());
            }
            output.push(top);
        }

        let rpn = Rpn {
            whole: self.whole,
            tokens: output,
        };
        debug!(input = self.whole, %rpn, "converted to postfix");
        Ok(rpn)
    }
}
