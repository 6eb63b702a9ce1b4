//! # numexpr
//!
//! numexpr compiles arithmetic expressions such as `3 * x + sin(pi / 2)`
//! into a flat postfix instruction sequence that can be evaluated any
//! number of times against different variable bindings. An algebraic
//! optimizer folds constant subexpressions and applies operator identities
//! before the first evaluation, so repeatedly evaluated expressions pay for
//! parsing and simplification exactly once.
//!
//! # Example
//! ```
//! use std::collections::HashMap;
//!
//! use numexpr::{value::Number, Parser};
//!
//! let parser = Parser::new();
//! let expression = parser.parse("x ** 2 + 2 * x + 1").unwrap();
//!
//! let bindings = HashMap::from([("x".to_string(), Number::Integer(3))]);
//! assert_eq!(expression.evaluate(&bindings), Ok(Number::Integer(16)));
//! ```

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc)]

/// Provides unified error types for every stage of the pipeline.
///
/// This module defines all errors that can be raised while scanning,
/// structuring, optimizing, or evaluating an expression, plus the errors a
/// registry reports on invalid registration. Parse- and evaluation-time
/// errors carry the `[start, end)` byte span of the offending source region
/// so callers can render caret diagnostics.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexical, structural,
///   evaluation, registration).
/// - Attaches source spans and detailed messages for user feedback.
/// - Supports integration with standard error handling traits.
pub mod error;
/// Defines compiled expressions and their evaluator.
///
/// An [`Expression`](expression::Expression) is an immutable postfix
/// instruction sequence produced by the parser. Evaluation is a single pass
/// over the sequence with an explicit value stack and may run concurrently
/// from multiple threads.
pub mod expression;
/// Simplifies compiled expressions.
///
/// Alternates constant folding with operator-identity strength reduction
/// until a fixed point, preserving observable behavior and never touching
/// non-deterministic calls.
pub mod optimizer;
/// Orchestrates the compilation pipeline.
///
/// This module ties together scanning, tree building, argument resolution,
/// linearization, and compilation against the registries to turn source
/// text into evaluatable expressions.
///
/// # Responsibilities
/// - Owns the operator, function, and constant registries.
/// - Runs the grouping passes in their fixed order over the token tree.
/// - Compiles postfix tokens into instruction sequences.
pub mod parser;
/// Defines the registries expressions are compiled against.
///
/// Operators, functions, and constants all live in registries owned by a
/// [`Parser`]; registration happens up front and the tables are treated as
/// frozen once expressions are being compiled.
pub mod registry;
/// Converts source text into tokens.
///
/// The scanner rotates through a prioritized chain of recognizers, one per
/// token shape, and reports a lexical error when a full rotation fails to
/// make progress.
pub mod scanner;
/// Defines tokens, source spans, and the token tree.
pub mod token;
/// Defines the numeric value type shared by every stage.
pub mod value;

pub use error::{EvalError, ParseError};
pub use expression::Expression;
pub use parser::Parser;
pub use value::Number;

/// Compiles and optimizes an expression with the default registries.
///
/// This is a convenience wrapper that builds a throwaway [`Parser`]; hosts
/// that compile more than one expression or register their own operators
/// should construct a [`Parser`] once and reuse it.
///
/// # Errors
/// Any [`ParseError`] raised while scanning, structuring, compiling, or
/// optimizing the source.
///
/// # Examples
/// ```
/// let expression = numexpr::parse("(2 + 3) * 4").unwrap();
/// assert_eq!(expression.constant_value(), Some(numexpr::Number::Integer(20)));
/// ```
pub fn parse(source: &str) -> Result<Expression, ParseError> {
    Parser::new().parse(source)
}

/// Compiles an expression with the default registries, skipping the
/// optimizer pass.
///
/// # Errors
/// Any [`ParseError`] raised while scanning, structuring, or compiling the
/// source.
///
/// # Examples
/// ```
/// let expression = numexpr::parse_unoptimized("(2 + 3) * 4").unwrap();
/// // Nothing is folded: both operations are still performed at evaluation.
/// assert_eq!(expression.constant_value(), None);
/// assert_eq!(expression.instructions().len(), 5);
/// ```
pub fn parse_unoptimized(source: &str) -> Result<Expression, ParseError> {
    Parser::new().parse_unoptimized(source)
}
