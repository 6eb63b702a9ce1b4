//! Algebraic simplification of compiled expressions.
//!
//! Two rewrites alternate until neither changes anything: constant folding
//! collapses every all-literal call to a deterministic callable into its
//! computed value, and strength reduction applies operator identities
//! (`x*1`, `x**2`, factor cancellation in divisions, and so on) to the
//! instruction sequence. Every rewrite preserves observable behavior for
//! all bindings under which the input expression succeeds, and no rewrite
//! ever deletes or duplicates a call to a non-deterministic callable.

use std::ops::Range;

use crate::{
    error::{MathError, ParseError},
    expression::{Expression, Instruction, OperatorSource},
    registry::{BinaryOperator, BinaryOperatorRegistry},
    token::Span,
    value::Number,
};

/// Optimizes a compiled expression.
///
/// Returns the input expression untouched when no rewrite applies, so an
/// already-optimal expression costs one scan and no allocation churn.
///
/// # Errors
/// Returns [`ParseError::DivisionByZero`] when simplification exposes a
/// division by a literal zero.
pub fn optimize(expression: Expression,
                binary: &BinaryOperatorRegistry)
                -> Result<Expression, ParseError> {
    let mut instructions = expression.instructions().to_vec();
    let mut changed = false;
    loop {
        let folded = fold_constants(&mut instructions)?;
        let reduced = reduce_strength(&mut instructions, binary)?;
        if !folded && !reduced {
            break;
        }
        changed = true;
    }
    if changed {
        Ok(expression.with_instructions(instructions))
    } else {
        Ok(expression)
    }
}

/// Collapses calls whose operands are all literal into their computed
/// value, simulating the evaluation stack left-to-right.
fn fold_constants(instructions: &mut Vec<Instruction>) -> Result<bool, ParseError> {
    let mut changed = false;
    // One entry per value the run so far would leave on the stack: the
    // index where its producing subsequence starts, and its value when that
    // subsequence is a lone literal.
    let mut stack: Vec<(usize, Option<Number>)> = Vec::new();
    let mut i = 0;

    while i < instructions.len() {
        let (arity, deterministic, closure, span) = match &instructions[i] {
            Instruction::NumericLiteral { value, .. } => {
                stack.push((i, Some(*value)));
                i += 1;
                continue;
            },
            Instruction::Variable { .. } => {
                stack.push((i, None));
                i += 1;
                continue;
            },
            Instruction::FunctionCall { arity,
                                        deterministic,
                                        closure,
                                        span,
                                        .. } => {
                (*arity, *deterministic, std::sync::Arc::clone(closure), *span)
            },
        };

        assert!(stack.len() >= arity,
                "optimizer stack underflow at {span}: the instruction sequence is malformed");
        let operands = stack.split_off(stack.len() - arity);
        let start = operands.first().map_or(i, |operand| operand.0);
        let values: Option<Vec<Number>> = operands.iter().map(|(_, value)| *value).collect();

        let arguments = match values {
            Some(arguments) if deterministic => arguments,
            _ => {
                stack.push((start, None));
                i += 1;
                continue;
            },
        };
        match closure(&arguments) {
            Ok(value) => {
                let span = union_span(&instructions[start..=i]);
                instructions.splice(start..=i, [Instruction::NumericLiteral { value, span }]);
                stack.push((start, Some(value)));
                changed = true;
                i = start + 1;
            },
            Err(MathError::DivisionByZero) => {
                return Err(ParseError::DivisionByZero { span });
            },
            // Leave the call in place; the failure is the expression's
            // runtime behavior, not a compile-time defect.
            Err(MathError::InvalidArgument { .. }) => {
                stack.push((start, None));
                i += 1;
            },
        }
    }
    Ok(changed)
}

/// Applies operator identities right-to-left, restarting from the end after
/// every rewrite since a rewrite can expose new opportunities upstream.
fn reduce_strength(instructions: &mut Vec<Instruction>,
                   binary: &BinaryOperatorRegistry)
                   -> Result<bool, ParseError> {
    let mut changed = false;
    'scan: loop {
        let mut i = instructions.len();
        while i > 0 {
            i -= 1;
            let (symbol, span) = match &instructions[i] {
                Instruction::FunctionCall { arity: 2,
                                            deterministic: true,
                                            source: Some(OperatorSource::Binary(symbol)),
                                            span,
                                            .. } => (symbol.clone(), *span),
                _ => continue,
            };
            let right = operand_range(instructions, i - 1);
            let left = operand_range(instructions, right.start - 1);

            if let Some(replacement) =
                rewrite(instructions, &symbol, span, &left, &right, binary)?
            {
                instructions.splice(left.start..=i, replacement);
                changed = true;
                continue 'scan;
            }
        }
        break;
    }
    Ok(changed)
}

/// Returns the range of the operand subsequence that leaves exactly one
/// value on the stack and ends at `end` (inclusive).
fn operand_range(instructions: &[Instruction], end: usize) -> Range<usize> {
    let mut pending = 1usize;
    let mut start = end + 1;
    while pending > 0 {
        start -= 1;
        if let Instruction::FunctionCall { arity, .. } = &instructions[start] {
            pending += arity;
        }
        pending -= 1;
    }
    start..end + 1
}

fn rewrite(instructions: &[Instruction],
           symbol: &str,
           span: Span,
           left: &Range<usize>,
           right: &Range<usize>,
           binary: &BinaryOperatorRegistry)
           -> Result<Option<Vec<Instruction>>, ParseError> {
    match symbol {
        "**" | "^" => Ok(rewrite_exponent(instructions, span, left, right, binary)),
        "*" => Ok(rewrite_multiplication(instructions, left, right)),
        "/" => rewrite_division(instructions, span, left, right, binary),
        "+" => Ok(rewrite_addition(instructions, left, right)),
        "-" => Ok(rewrite_subtraction(instructions, left, right)),
        _ => Ok(None),
    }
}

fn rewrite_exponent(instructions: &[Instruction],
                    span: Span,
                    left: &Range<usize>,
                    right: &Range<usize>,
                    binary: &BinaryOperatorRegistry)
                    -> Option<Vec<Instruction>> {
    let whole = union_span(&instructions[left.start..right.end + 1]);
    if is_literal(instructions, left, 0) && deletable(instructions, right) {
        return Some(vec![literal_zero(whole)]);
    }
    if is_literal(instructions, left, 1) && deletable(instructions, right) {
        return Some(vec![literal_one(whole)]);
    }
    if is_literal(instructions, right, 0) && deletable(instructions, left) {
        return Some(vec![literal_one(whole)]);
    }
    if is_literal(instructions, right, 1) {
        return Some(instructions[left.clone()].to_vec());
    }
    if is_literal(instructions, right, 2) && deletable(instructions, left) {
        // Squaring duplicates the base, which is only sound when the base
        // is deterministic.
        let multiplication = binary.get("*")?;
        let mut replacement = instructions[left.clone()].to_vec();
        replacement.extend_from_slice(&instructions[left.clone()]);
        replacement.push(operator_instruction(multiplication, span));
        return Some(replacement);
    }
    None
}

fn rewrite_multiplication(instructions: &[Instruction],
                          left: &Range<usize>,
                          right: &Range<usize>)
                          -> Option<Vec<Instruction>> {
    let whole = union_span(&instructions[left.start..right.end + 1]);
    if is_literal(instructions, left, 1) {
        return Some(instructions[right.clone()].to_vec());
    }
    if is_literal(instructions, right, 1) {
        return Some(instructions[left.clone()].to_vec());
    }
    if is_literal(instructions, left, 0) && deletable(instructions, right) {
        return Some(vec![literal_zero(whole)]);
    }
    if is_literal(instructions, right, 0) && deletable(instructions, left) {
        return Some(vec![literal_zero(whole)]);
    }
    None
}

fn rewrite_addition(instructions: &[Instruction],
                    left: &Range<usize>,
                    right: &Range<usize>)
                    -> Option<Vec<Instruction>> {
    if is_literal(instructions, left, 0) {
        return Some(instructions[right.clone()].to_vec());
    }
    if is_literal(instructions, right, 0) {
        return Some(instructions[left.clone()].to_vec());
    }
    None
}

fn rewrite_subtraction(instructions: &[Instruction],
                       left: &Range<usize>,
                       right: &Range<usize>)
                       -> Option<Vec<Instruction>> {
    if is_literal(instructions, right, 0) {
        return Some(instructions[left.clone()].to_vec());
    }
    if equivalent(&instructions[left.clone()], &instructions[right.clone()])
       && deletable(instructions, left)
    {
        let whole = union_span(&instructions[left.start..right.end + 1]);
        return Some(vec![literal_zero(whole)]);
    }
    None
}

fn rewrite_division(instructions: &[Instruction],
                    span: Span,
                    left: &Range<usize>,
                    right: &Range<usize>,
                    binary: &BinaryOperatorRegistry)
                    -> Result<Option<Vec<Instruction>>, ParseError> {
    if is_literal(instructions, right, 0) {
        return Err(ParseError::DivisionByZero { span });
    }
    if is_literal(instructions, left, 0) && deletable(instructions, right) {
        let whole = union_span(&instructions[left.start..right.end + 1]);
        return Ok(Some(vec![literal_zero(whole)]));
    }
    if is_literal(instructions, right, 1) {
        return Ok(Some(instructions[left.clone()].to_vec()));
    }

    // Factor cancellation. Both operand trees split into multiplicative
    // factors; a factor pair that is structurally equal and wholly
    // deterministic cancels to 1 on both sides. Reordering factors across
    // the products requires a commutative multiplication.
    let Some(multiplication) = binary.get("*") else {
        return Ok(None);
    };
    if !multiplication.commutative() {
        return Ok(None);
    }

    let mut numerator = factor_sequences(instructions, left);
    let mut denominator = factor_sequences(instructions, right);
    let mut cancelled = false;
    for factor in &mut numerator {
        if is_one_factor(factor) || !factor.iter().all(Instruction::is_deterministic) {
            continue;
        }
        for other in &mut denominator {
            if is_one_factor(other) || !other.iter().all(Instruction::is_deterministic) {
                continue;
            }
            if equivalent(factor, other) {
                let factor_span = union_span(factor);
                let other_span = union_span(other);
                *factor = vec![literal_one(factor_span)];
                *other = vec![literal_one(other_span)];
                cancelled = true;
                break;
            }
        }
    }
    if !cancelled {
        return Ok(None);
    }

    let mut replacement = join_factors(numerator, multiplication, span);
    replacement.extend(join_factors(denominator, multiplication, span));
    replacement.push(instructions[right.end].clone());
    Ok(Some(replacement))
}

/// Splits an operand subsequence into its top-level multiplicative factors,
/// recursing through deterministic `*` nodes only.
fn factor_sequences(instructions: &[Instruction], range: &Range<usize>) -> Vec<Vec<Instruction>> {
    let end = range.end - 1;
    if let Instruction::FunctionCall { arity: 2,
                                       deterministic: true,
                                       source: Some(OperatorSource::Binary(symbol)),
                                       .. } = &instructions[end]
    {
        if symbol == "*" {
            let right = operand_range(instructions, end - 1);
            let left = operand_range(instructions, right.start - 1);
            let mut factors = factor_sequences(instructions, &left);
            factors.extend(factor_sequences(instructions, &right));
            return factors;
        }
    }
    vec![instructions[range.clone()].to_vec()]
}

/// Rebuilds a left-associated product over the given factors.
fn join_factors(factors: Vec<Vec<Instruction>>,
                multiplication: &BinaryOperator,
                span: Span)
                -> Vec<Instruction> {
    let mut iter = factors.into_iter();
    let mut joined = iter.next().unwrap_or_default();
    for factor in iter {
        joined.extend(factor);
        joined.push(operator_instruction(multiplication, span));
    }
    joined
}

fn operator_instruction(operator: &BinaryOperator, span: Span) -> Instruction {
    Instruction::FunctionCall { name: operator.symbol().to_string(),
                                arity: 2,
                                closure: operator.closure(),
                                deterministic: operator.deterministic(),
                                commutative: operator.commutative(),
                                source: Some(OperatorSource::Binary(operator.symbol()
                                                                            .to_string())),
                                span }
}

/// Whether the operand subsequence is a lone literal comparing equal to
/// `expected` (integers as integers, reals by numeric equality).
fn is_literal(instructions: &[Instruction], range: &Range<usize>, expected: i64) -> bool {
    if range.len() != 1 {
        return false;
    }
    match &instructions[range.start] {
        Instruction::NumericLiteral { value: Number::Integer(value), .. } => *value == expected,
        #[allow(clippy::cast_precision_loss)]
        Instruction::NumericLiteral { value: Number::Real(value), .. } => {
            *value == expected as f64
        },
        _ => false,
    }
}

fn is_one_factor(factor: &[Instruction]) -> bool {
    matches!(factor,
             [Instruction::NumericLiteral { value: Number::Integer(1), .. }])
    || matches!(factor,
                [Instruction::NumericLiteral { value: Number::Real(value), .. }] if *value == 1.0)
}

/// Whether a rewrite may delete this subsequence without changing
/// observable behavior for succeeding evaluations.
fn deletable(instructions: &[Instruction], range: &Range<usize>) -> bool {
    instructions[range.clone()].iter().all(Instruction::is_deterministic)
}

fn equivalent(a: &[Instruction], b: &[Instruction]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equivalent(y))
}

fn union_span(instructions: &[Instruction]) -> Span {
    let mut span = instructions[0].span();
    for instruction in &instructions[1..] {
        span = span.union(instruction.span());
    }
    span
}

const fn literal_zero(span: Span) -> Instruction {
    Instruction::NumericLiteral { value: Number::Integer(0), span }
}

const fn literal_one(span: Span) -> Instruction {
    Instruction::NumericLiteral { value: Number::Integer(1), span }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::parser::Parser;
    use crate::registry::Function;

    fn parse(source: &str) -> Expression {
        Parser::new().parse(source).unwrap()
    }

    #[test]
    fn all_literal_expressions_fold_to_a_constant() {
        assert_eq!(parse("2+3*4").constant_value(), Some(Number::Integer(14)));
        assert_eq!(parse("2^3^2").constant_value(), Some(Number::Integer(512)));
        assert_eq!(parse("max(1, 2, 3)").constant_value(), Some(Number::Integer(3)));
    }

    #[test]
    fn multiplicative_identity_leaves_a_bare_variable() {
        let expression = parse("x*1");
        assert_eq!(expression.instructions().len(), 1);
        assert!(matches!(expression.instructions()[0], Instruction::Variable { .. }));
    }

    #[test]
    fn multiplication_by_zero_needs_no_bindings() {
        let expression = parse("x*0");
        assert_eq!(expression.constant_value(), Some(Number::Integer(0)));
        assert_eq!(expression.evaluate(&HashMap::new()), Ok(Number::Integer(0)));
    }

    #[test]
    fn squaring_rewrites_to_self_multiplication() {
        let expression = parse("x**2");
        let bindings = HashMap::from([("x".to_string(), Number::Integer(5))]);
        assert_eq!(expression.evaluate(&bindings), Ok(Number::Integer(25)));
        // No exponent instruction remains.
        assert!(expression.instructions()
                          .iter()
                          .all(|instruction| !matches!(instruction,
                                   Instruction::FunctionCall { name, .. } if name == "**")));
    }

    #[test]
    fn shared_factors_cancel_out_of_divisions() {
        let expression = parse("(x*y)/(y*z)");
        let variables: Vec<&str> = expression.variables().collect();
        assert_eq!(variables, ["x", "z"]);
        let bindings = HashMap::from([("x".to_string(), Number::Integer(8)),
                                      ("z".to_string(), Number::Integer(2))]);
        assert_eq!(expression.evaluate(&bindings), Ok(Number::Integer(4)));
    }

    #[test]
    fn literal_zero_divisor_fails_at_parse_time() {
        assert!(matches!(Parser::new().parse("5/0"),
                         Err(ParseError::DivisionByZero { .. })));
        assert!(matches!(Parser::new().parse("x/0"),
                         Err(ParseError::DivisionByZero { .. })));
    }

    #[test]
    fn subtracting_an_expression_from_itself_cancels() {
        let expression = parse("(a+b) - (a+b)");
        assert_eq!(expression.constant_value(), Some(Number::Integer(0)));
    }

    #[test]
    fn optimization_is_idempotent() {
        let parser = Parser::new();
        let once = parser.parse("x*1 + 0 + 2*3").unwrap();
        let twice = optimize(once.clone(), parser.binary_operators()).unwrap();
        assert_eq!(once.instructions(), twice.instructions());
    }

    #[test]
    fn non_deterministic_calls_are_never_removed() {
        let mut parser = Parser::new();
        parser.register_function(Function::new("chance", vec![None], false, false, |args| {
                  Ok(args[0])
              }))
              .unwrap();
        let expression = parser.parse("chance(4) * 0").unwrap();
        assert!(expression.instructions()
                          .iter()
                          .any(|instruction| matches!(instruction,
                                   Instruction::FunctionCall { name, .. } if name == "chance")));

        let unchanged = parser.parse("chance(2) - chance(2)").unwrap();
        assert_eq!(unchanged.instructions().len(), 5);
    }
}
