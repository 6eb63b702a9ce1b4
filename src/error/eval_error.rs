use crate::{error::MathError, token::Span};

#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur while evaluating a compiled
/// expression against variable bindings.
pub enum EvalError {
    /// A variable was referenced with no binding and no matching constant.
    UnboundVariable {
        /// The variable name.
        name: String,
        /// The source region of the reference.
        span: Span,
    },
    /// A divisor compared equal to zero at runtime.
    DivisionByZero {
        /// The source region of the operator that divided.
        span: Span,
    },
    /// A native function rejected its arguments.
    InvalidArgument {
        /// Details about why the arguments were rejected.
        details: String,
        /// The source region of the call.
        span:    Span,
    },
}

impl EvalError {
    /// Returns the source span the error points at.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::UnboundVariable { span, .. }
            | Self::DivisionByZero { span }
            | Self::InvalidArgument { span, .. } => *span,
        }
    }

    /// Attaches a source position to a failure reported by a native
    /// callable.
    #[must_use]
    pub fn from_math(error: MathError, span: Span) -> Self {
        match error {
            MathError::DivisionByZero => Self::DivisionByZero { span },
            MathError::InvalidArgument { details } => Self::InvalidArgument { details, span },
        }
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnboundVariable { name, span } => {
                write!(f, "No value supplied for variable '{name}' at {span}.")
            },
            Self::DivisionByZero { span } => write!(f, "Division by zero at {span}."),
            Self::InvalidArgument { details, span } => {
                write!(f, "Invalid argument at {span}: {details}.")
            },
        }
    }
}

impl std::error::Error for EvalError {}
