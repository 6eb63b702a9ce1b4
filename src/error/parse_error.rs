use crate::token::Span;

#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur while scanning, structuring, or
/// optimizing an expression.
///
/// Every variant carries the `[start, end)` byte span of the offending
/// source region so callers can render a caret diagnostic; [`ParseError::span`]
/// exposes it uniformly.
pub enum ParseError {
    /// No recognizer claimed a token at the given offset, or a leftover token
    /// remained after the expression was fully reduced.
    UnexpectedToken {
        /// Short description of what was found (token kind or raw text).
        found: String,
        /// The source region of the unexpected input.
        span:  Span,
    },
    /// The expression contained no tokens at all (or only parentheses).
    EmptyExpression,
    /// An opening parenthesis was never closed.
    UnmatchedLeftParenthesis {
        /// The source region of the opening parenthesis.
        span: Span,
    },
    /// A closing parenthesis had no matching opening parenthesis.
    UnmatchedRightParenthesis {
        /// The source region of the closing parenthesis.
        span: Span,
    },
    /// A unary operator had nothing to its right to operate on.
    MissingUnaryOperand {
        /// The operator symbol.
        symbol: String,
        /// The source region of the operator.
        span:   Span,
    },
    /// A binary operator was missing its left operand.
    MissingLeftOperand {
        /// The operator symbol.
        symbol: String,
        /// The source region of the operator.
        span:   Span,
    },
    /// A binary operator was missing its right operand.
    MissingRightOperand {
        /// The operator symbol.
        symbol: String,
        /// The source region of the operator.
        span:   Span,
    },
    /// A call referenced a function name absent from the registry.
    UnknownFunction {
        /// The function name as written.
        name: String,
        /// The source region of the call.
        span: Span,
    },
    /// An operator symbol survived parsing but is absent from the registry.
    UnknownOperator {
        /// The operator symbol as written.
        symbol: String,
        /// The source region of the operator.
        span:   Span,
    },
    /// An omitted argument had no registered default to fall back to.
    MissingDefaultValue {
        /// The function being called.
        function:  String,
        /// One-based index of the parameter that could not be filled.
        parameter: usize,
        /// The source region of the call.
        span:      Span,
    },
    /// A non-variadic function received more arguments than it declares.
    TooManyArguments {
        /// The function being called.
        function: String,
        /// Number of parameters the function declares.
        expected: usize,
        /// Number of arguments actually supplied.
        actual:   usize,
        /// The source region of the call.
        span:     Span,
    },
    /// A division with a literal zero divisor was detected at compile time.
    DivisionByZero {
        /// The source region of the zero divisor or the division operator.
        span: Span,
    },
}

impl ParseError {
    /// Returns the source span the error points at.
    ///
    /// [`ParseError::EmptyExpression`] has no meaningful location and
    /// reports an empty span at offset zero.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::EmptyExpression => Span::new(0, 0),
            Self::UnexpectedToken { span, .. }
            | Self::UnmatchedLeftParenthesis { span }
            | Self::UnmatchedRightParenthesis { span }
            | Self::MissingUnaryOperand { span, .. }
            | Self::MissingLeftOperand { span, .. }
            | Self::MissingRightOperand { span, .. }
            | Self::UnknownFunction { span, .. }
            | Self::UnknownOperator { span, .. }
            | Self::MissingDefaultValue { span, .. }
            | Self::TooManyArguments { span, .. }
            | Self::DivisionByZero { span } => *span,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken { found, span } => {
                write!(f, "Unexpected {found} at {span}.")
            },
            Self::EmptyExpression => write!(f, "Cannot parse an empty expression."),
            Self::UnmatchedLeftParenthesis { span } => {
                write!(f, "No closing parenthesis for opening parenthesis at {span}.")
            },
            Self::UnmatchedRightParenthesis { span } => {
                write!(f, "No opening parenthesis for closing parenthesis at {span}.")
            },
            Self::MissingUnaryOperand { symbol, span } => {
                write!(f, "No operand for unary operator '{symbol}' at {span}.")
            },
            Self::MissingLeftOperand { symbol, span } => {
                write!(f, "No left operand for binary operator '{symbol}' at {span}.")
            },
            Self::MissingRightOperand { symbol, span } => {
                write!(f, "No right operand for binary operator '{symbol}' at {span}.")
            },
            Self::UnknownFunction { name, span } => {
                write!(f, "Unknown function '{name}' at {span}.")
            },
            Self::UnknownOperator { symbol, span } => {
                write!(f, "Unknown operator '{symbol}' at {span}.")
            },
            Self::MissingDefaultValue { function,
                                        parameter,
                                        span, } => {
                write!(f,
                       "Function '{function}' at {span} has no default value for parameter #{parameter}.")
            },
            Self::TooManyArguments { function,
                                     expected,
                                     actual,
                                     span, } => {
                write!(f,
                       "Too many arguments for function '{function}' at {span}: expected {expected}, got {actual}.")
            },
            Self::DivisionByZero { span } => {
                write!(f, "Division by zero at {span}.")
            },
        }
    }
}

impl std::error::Error for ParseError {}
