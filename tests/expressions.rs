use std::thread;

use miette::Error;
use pretty_assertions::assert_eq;
use rpn_calc::eval;
use rpn_calc::eval::{EmptyExpression, MissingOperand, TrailingValues, UnknownIdentifier};
use rpn_calc::lex::{MalformedLiteral, SingleTokenError};
use rpn_calc::parse::{MisplacedComma, UnbalancedParens};

fn value(src: &str) -> f64 {
    eval(src).unwrap_or_else(|e| panic!("`{src}` failed:\n{e:?}"))
}

fn failure(src: &str) -> Error {
    match eval(src) {
        Ok(v) => panic!("`{src}` should fail but gave {v}"),
        Err(e) => e,
    }
}

fn assert_close(src: &str, expected: f64) {
    let actual = value(src);
    assert!(
        (actual - expected).abs() < 1e-9,
        "`{src}`: {actual} != {expected}"
    );
}

#[test]
fn precedence() {
    assert_eq!(value("2+3*4"), 14.0);
    assert_eq!(value("(2+3)*4"), 20.0);
    assert_eq!(value("2*3+4*5"), 26.0);
    assert_eq!(value("10-2*3^2"), -8.0);
}

#[test]
fn power_groups_to_the_right() {
    assert_eq!(value("2^3^2"), 512.0);
    assert_eq!(value("(2^3)^2"), 64.0);
}

#[test]
fn unary_minus() {
    assert_eq!(value("3*-2"), -6.0);
    assert_eq!(value("-3+2"), -1.0);
    assert_eq!(value("max(1,-2)"), 1.0);
    assert_eq!(value("(-2)"), -2.0);
    assert_eq!(value("4--2"), 6.0);
    assert_eq!(value("4-2"), 2.0);
}

#[test]
fn negation_of_non_literals() {
    assert_eq!(value("-pi"), -3.141592653589);
    assert_eq!(value("-(2+3)"), -5.0);
    assert_eq!(value("-(1)"), -1.0);
    assert_eq!(value("2*-sin(0)"), 0.0);
    assert!(value("2*-sin(0)").is_sign_negative());
    assert_eq!(value("--2"), 2.0);
    assert_eq!(value("- 3"), -3.0);
    assert_eq!(value("max(-pi, -(4))"), -3.141592653589);
    assert_eq!(value("2^-(1)"), 0.5);
    // binds tighter than `^`, like a signed literal
    assert_eq!(value("-2^2"), 4.0);
    assert_eq!(value("-(2)^2"), 4.0);
}

#[test]
fn long_literals() {
    assert_eq!(value(&format!("1.{}", "0".repeat(309))), 1.0);
    assert_eq!(value(&format!("-1.{}+1", "0".repeat(400))), 0.0);
    assert_eq!(value(&"9".repeat(400)), f64::INFINITY);
}

#[test]
fn functions() {
    assert_eq!(value("sin(0)"), 0.0);
    assert_eq!(value("max(3,5)"), 5.0);
    assert_eq!(value("min(3,3)"), 3.0);
    assert_eq!(value("min(5,-3)"), -3.0);
    assert_close("sin(pi/2)", 1.0);
    assert_close("cos(pi)", -1.0);
    assert_close("tan(0.5)", 0.5f64.tan());
    assert_close("max(sin(0), cos(0)) * 2", 2.0);
}

#[test]
fn pi_keeps_its_declared_digits() {
    assert_eq!(value("pi"), 3.141592653589);
    assert_ne!(value("pi"), std::f64::consts::PI);
}

#[test]
fn whitespace_is_insignificant() {
    assert_eq!(value(" 1 +\t2\n*\r3 "), value("1+2*3"));
}

#[test]
fn ieee_arithmetic() {
    assert_eq!(value("1/0"), f64::INFINITY);
    assert_eq!(value("-1/0"), f64::NEG_INFINITY);
    assert!(value("0/0").is_nan());
    assert_eq!(value("0^-1"), f64::INFINITY);
}

#[test]
fn same_input_same_result() {
    let first = value("max(2.5, 1.25) ^ sin(0.3) - 7/3");
    for _ in 0..100 {
        assert_eq!(
            value("max(2.5, 1.25) ^ sin(0.3) - 7/3").to_bits(),
            first.to_bits()
        );
    }
}

#[test]
fn evaluations_do_not_share_state() {
    let inputs = ["2+3*4", "2^3^2", "min(3,3)", "-3+2", "cos(0)*10"];
    let expected: Vec<f64> = inputs.iter().map(|src| value(src)).collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(move || {
                (0..200)
                    .flat_map(|_| inputs.iter().map(|src| value(src)))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        let results = handle.join().expect("thread panicked");
        for chunk in results.chunks(inputs.len()) {
            assert_eq!(chunk, expected.as_slice());
        }
    }
}

#[test]
fn error_kinds() {
    assert!(failure("2+").downcast_ref::<MissingOperand>().is_some());
    assert!(failure("sin()").downcast_ref::<MissingOperand>().is_some());
    assert!(failure("(2+3").downcast_ref::<UnbalancedParens>().is_some());
    assert!(failure("2+3)").downcast_ref::<UnbalancedParens>().is_some());
    assert!(failure("2 3").downcast_ref::<TrailingValues>().is_some());
    assert!(failure("foo(1)").downcast_ref::<UnknownIdentifier>().is_some());
    assert!(failure("1.2.3").downcast_ref::<MalformedLiteral>().is_some());
    assert!(failure("-.").downcast_ref::<MalformedLiteral>().is_some());
    assert!(failure("-").downcast_ref::<MissingOperand>().is_some());
    assert!(failure("1,2").downcast_ref::<MisplacedComma>().is_some());
    assert!(failure("").downcast_ref::<EmptyExpression>().is_some());
}

#[test]
fn lexical_error_names_character_and_offset() {
    let e = failure("1 + 2 # 3");
    let e = e.downcast_ref::<SingleTokenError>().expect("lexical error");
    assert_eq!(e.token, '#');
    assert_eq!(e.offset(), 6);
}

#[test]
fn diagnostics_render() {
    let e = failure("max(1, 2) 3");
    let rendered = format!("{e:?}");
    assert!(rendered.contains("Expression leaves 2 values instead of one"));
    assert!(rendered.contains("unexpected value"));
}
