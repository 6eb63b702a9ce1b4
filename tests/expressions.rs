use std::collections::HashMap;

use numexpr::{
    error::ParseError,
    expression::Instruction,
    registry::{Associativity, BinaryOperator, Function},
    value::Number,
    Parser,
};
use pretty_assertions::assert_eq;

fn eval(source: &str, bindings: &[(&str, Number)]) -> Number {
    let bindings: HashMap<String, Number> =
        bindings.iter().map(|(name, value)| ((*name).to_string(), *value)).collect();
    let expression =
        numexpr::parse(source).unwrap_or_else(|e| panic!("'{source}' failed to parse: {e}"));
    expression.evaluate(&bindings)
              .unwrap_or_else(|e| panic!("'{source}' failed to evaluate: {e}"))
}

fn constant(source: &str) -> Number {
    eval(source, &[])
}

fn parse_error(source: &str) -> ParseError {
    match numexpr::parse(source) {
        Ok(_) => panic!("'{source}' parsed but was expected to fail"),
        Err(error) => error,
    }
}

#[test]
fn conventional_precedence_and_associativity() {
    assert_eq!(constant("2+3*4"), Number::Integer(14));
    assert_eq!(constant("(2+3)*4"), Number::Integer(20));
    assert_eq!(constant("10/2/5"), Number::Integer(1));
    assert_eq!(constant("2^3^2"), Number::Integer(512));
    assert_eq!(constant("2**3**2"), Number::Integer(512));
    assert_eq!(constant("7 % 4 + 1"), Number::Integer(4));
}

#[test]
fn unary_operators_bind_tighter_than_binary() {
    assert_eq!(constant("-2"), Number::Integer(-2));
    assert_eq!(constant("--2"), Number::Integer(2));
    assert_eq!(constant("-2 + 5"), Number::Integer(3));
    assert_eq!(constant("2 * -3"), Number::Integer(-6));
    assert_eq!(constant("!0 + !5"), Number::Integer(1));
}

#[test]
fn mixed_numeric_types_promote_to_real() {
    assert_eq!(constant("1 + 0.5"), Number::Real(1.5));
    assert_eq!(constant("7 / 2"), Number::Real(3.5));
    assert_eq!(constant("10 / 5"), Number::Integer(2));
}

#[test]
fn overflowing_integer_division_promotes_to_real() {
    assert_eq!(eval("x / y",
                    &[("x", Number::Integer(i64::MIN)), ("y", Number::Integer(-1))]),
               Number::Real(9.223_372_036_854_776e18));
}

#[test]
fn variables_are_bound_at_evaluation_time() {
    assert_eq!(eval("3 * x + 1", &[("x", Number::Integer(4))]), Number::Integer(13));
    assert_eq!(eval("x / y",
                    &[("x", Number::Integer(9)), ("y", Number::Integer(2))]),
               Number::Real(4.5));
}

#[test]
fn constants_need_no_bindings() {
    assert_eq!(constant("pi"), Number::Real(std::f64::consts::PI));
    assert_eq!(constant("tau / pi"), Number::Real(2.0));
}

#[test]
fn functions_evaluate_with_defaults_and_variadics() {
    assert_eq!(constant("max(1, 2, 3)"), Number::Integer(3));
    assert_eq!(constant("min(4, -1, 2.5)"), Number::Integer(-1));
    assert_eq!(constant("abs(-7)"), Number::Integer(7));
    // `round` falls back to its registered precision of zero digits.
    assert_eq!(constant("round(2.5378, 2)"), Number::Real(2.54));
    assert_eq!(constant("round(2.5378)"), Number::Real(3.0));
    assert_eq!(constant("sqrt(sqrt(16))"), Number::Real(2.0));
}

#[test]
fn optimizer_erases_multiplicative_identities() {
    let expression = numexpr::parse("x*1").unwrap();
    assert!(matches!(expression.instructions(),
                     [Instruction::Variable { name, .. }] if name == "x"));
    assert_eq!(eval("x*1", &[("x", Number::Integer(7))]), Number::Integer(7));
}

#[test]
fn optimizer_collapses_multiplication_by_zero() {
    let expression = numexpr::parse("x*0").unwrap();
    assert_eq!(expression.constant_value(), Some(Number::Integer(0)));
    // No binding for x is required once the product is gone.
    assert_eq!(expression.evaluate(&HashMap::new()), Ok(Number::Integer(0)));
}

#[test]
fn optimizer_cancels_shared_division_factors() {
    let expression = numexpr::parse("(x*y)/(y*z)").unwrap();
    let variables: Vec<&str> = expression.variables().collect();
    assert_eq!(variables, ["x", "z"]);
    let bindings = HashMap::from([("x".to_string(), Number::Integer(6)),
                                  ("z".to_string(), Number::Integer(3))]);
    assert_eq!(expression.evaluate(&bindings), Ok(Number::Integer(2)));
}

#[test]
fn optimized_and_unoptimized_forms_agree() {
    let parser = Parser::new();
    let bindings = HashMap::from([("x".to_string(), Number::Integer(5)),
                                  ("y".to_string(), Number::Real(0.25))]);
    for source in ["x*1 + 0",
                   "x**2 - x*x",
                   "(x + y) - (x + y)",
                   "x / 1 + y * 1",
                   "2 * x + 3 * y"] {
        let plain = parser.parse_unoptimized(source).unwrap().evaluate(&bindings).unwrap();
        let optimized = parser.parse(source).unwrap().evaluate(&bindings).unwrap();
        assert_eq!(plain.as_real(), optimized.as_real(), "disagreement for '{source}'");
    }
}

#[test]
fn literal_division_by_zero_is_a_parse_error() {
    assert!(matches!(parse_error("5/0"), ParseError::DivisionByZero { .. }));
    assert!(matches!(parse_error("x/0"), ParseError::DivisionByZero { .. }));
    assert!(matches!(parse_error("1/(2-2)"), ParseError::DivisionByZero { .. }));
}

#[test]
fn unbalanced_parentheses_never_parse() {
    assert!(matches!(parse_error("(2+3"), ParseError::UnmatchedLeftParenthesis { .. }));
    assert!(matches!(parse_error("2+3)"), ParseError::UnmatchedRightParenthesis { .. }));
    assert!(matches!(parse_error("((1)"), ParseError::UnmatchedLeftParenthesis { .. }));
}

#[test]
fn structural_errors_name_the_problem() {
    assert!(matches!(parse_error(""), ParseError::EmptyExpression));
    assert!(matches!(parse_error("2 +"), ParseError::MissingRightOperand { .. }));
    assert!(matches!(parse_error("* 2"), ParseError::MissingLeftOperand { .. }));
    assert!(matches!(parse_error("2 3"), ParseError::UnexpectedToken { .. }));
    assert!(matches!(parse_error("nosuch(1)"), ParseError::UnknownFunction { .. }));
    assert!(matches!(parse_error("pow(2)"), ParseError::MissingDefaultValue { .. }));
    assert!(matches!(parse_error("sqrt(1, 2)"), ParseError::TooManyArguments { .. }));
}

#[test]
fn error_spans_point_into_the_source() {
    let error = parse_error("2 + @ + 3");
    assert_eq!(error.span().slice("2 + @ + 3"), "@");

    let expression = numexpr::parse("1 + missing").unwrap();
    let error = expression.evaluate(&HashMap::new()).unwrap_err();
    assert_eq!(error.span().slice("1 + missing"), "missing");
}

#[test]
fn non_deterministic_functions_survive_optimization() {
    let mut parser = Parser::new();
    parser.register_function(Function::new("roll", vec![None], false, false, |args| Ok(args[0])))
          .unwrap();

    // Neither the zero-product identity nor self-subtraction may erase the
    // call.
    for source in ["roll(6) * 0", "roll(6) - roll(6)"] {
        let expression = parser.parse(source).unwrap();
        assert!(expression.instructions()
                          .iter()
                          .any(|instruction| matches!(instruction,
                                   Instruction::FunctionCall { name, .. } if name == "roll")),
                "'{source}' lost its non-deterministic call");
    }
}

#[test]
fn optimizing_twice_changes_nothing() {
    let parser = Parser::new();
    for source in ["x*1 + 2*3", "(a*b)/(b*c)", "x**2 + 0"] {
        let optimized = parser.parse(source).unwrap();
        let roundtrip = numexpr::optimizer::optimize(optimized.clone(),
                                                     parser.binary_operators()).unwrap();
        assert_eq!(optimized.instructions(), roundtrip.instructions(), "for '{source}'");
    }
}

#[test]
fn custom_operators_extend_the_language() {
    let mut parser = Parser::new();
    parser.register_binary_operator(BinaryOperator::new("//", 3, Associativity::Left, false,
                                                        true, |l, r| {
                                        l.div(r).map(|q| match q {
                                                    Number::Real(v) => Number::Real(v.floor()),
                                                    q => q,
                                                })
                                    }))
          .unwrap();
    let expression = parser.parse("7 // 2").unwrap();
    assert_eq!(expression.evaluate(&HashMap::new()), Ok(Number::Real(3.0)));
}
