/// Evaluation errors.
///
/// Errors raised while running a compiled expression against a set of
/// variable bindings, such as unbound variables or runtime division by zero.
pub mod eval_error;
/// Native math errors.
///
/// Span-less failures raised inside native operator and function
/// implementations; the evaluator and optimizer attach source positions
/// before surfacing them.
pub mod math_error;
/// Parsing errors.
///
/// Everything that can go wrong between source text and a compiled
/// expression: lexical errors, structural errors, and argument-resolution
/// failures. Each variant carries the span of the offending tokens.
pub mod parse_error;
/// Registration errors.
///
/// Rejected attempts to extend a registry, such as redefining an existing
/// operator symbol.
pub mod registry_error;

pub use eval_error::EvalError;
pub use math_error::MathError;
pub use parse_error::ParseError;
pub use registry_error::RegistryError;
