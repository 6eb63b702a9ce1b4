/// Represents a failure inside a native operator or function implementation.
///
/// Native callables see only their numeric arguments, so these variants carry
/// no source position. The caller (evaluator or optimizer) knows the span of
/// the instruction being applied and wraps the failure accordingly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// A divisor (or modulus) compared equal to zero.
    DivisionByZero,
    /// An argument was outside the domain of the operation.
    InvalidArgument {
        /// Details about why the argument was rejected.
        details: String,
    },
}

impl std::fmt::Display for MathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "Division by zero."),
            Self::InvalidArgument { details } => write!(f, "Invalid argument: {details}."),
        }
    }
}

impl std::error::Error for MathError {}
