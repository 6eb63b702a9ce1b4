use crate::value::Number;

/// A half-open `[start, end)` byte range into the original source text.
///
/// Every token carries one so that errors can point a caret at the exact
/// offending characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character of the token.
    pub start: usize,
    /// Byte offset one past the last character of the token.
    pub end:   usize,
}

impl Span {
    /// Creates a span covering `[start, end)`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the smallest span containing both `self` and `other`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self { start: self.start.min(other.start),
               end:   self.end.max(other.end), }
    }

    /// Slices the spanned substring out of `source`.
    ///
    /// Returns an empty string when the span is out of bounds, so error
    /// rendering never panics on a malformed span.
    #[must_use]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// A classified lexical unit produced by the scanner.
///
/// Identifiers are resolved into variables or constants later, during
/// compilation; the scanner itself only distinguishes shape, not meaning.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A numeric literal such as `42` or `2.5e-3`.
    NumericLiteral {
        /// The parsed value.
        value: Number,
        /// Source location of the literal.
        span:  Span,
    },
    /// A bare name such as `x` or `pi`.
    Identifier {
        /// The identifier text.
        name: String,
        /// Source location of the name.
        span: Span,
    },
    /// An infix operator symbol such as `+` or `**`.
    BinaryOperator {
        /// The operator symbol as written.
        symbol: String,
        /// Source location of the symbol.
        span:   Span,
    },
    /// A prefix operator symbol such as the `-` in `-x`.
    UnaryOperator {
        /// The operator symbol as written.
        symbol: String,
        /// Source location of the symbol.
        span:   Span,
    },
    /// An opening parenthesis.
    LeftParenthesis {
        /// Source location of the parenthesis.
        span: Span,
    },
    /// A closing parenthesis.
    RightParenthesis {
        /// Source location of the parenthesis.
        span: Span,
    },
    /// A function name directly followed by its opening parenthesis.
    FunctionCall {
        /// The function name as written.
        name:           String,
        /// Number of arguments spelled out at the call site, derived from a
        /// balanced-parenthesis lookahead at scan time.
        argument_count: usize,
        /// Source location of the name.
        span:           Span,
    },
    /// A `,` separating function-call arguments.
    ArgumentSeparator {
        /// Source location of the separator.
        span: Span,
    },
}

impl Token {
    /// Returns the source location of the token.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::NumericLiteral { span, .. }
            | Self::Identifier { span, .. }
            | Self::BinaryOperator { span, .. }
            | Self::UnaryOperator { span, .. }
            | Self::LeftParenthesis { span }
            | Self::RightParenthesis { span }
            | Self::FunctionCall { span, .. }
            | Self::ArgumentSeparator { span } => *span,
        }
    }

    /// Returns a short human-readable name for the token kind, used in
    /// diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NumericLiteral { .. } => "numeric literal",
            Self::Identifier { .. } => "identifier",
            Self::BinaryOperator { .. } => "binary operator",
            Self::UnaryOperator { .. } => "unary operator",
            Self::LeftParenthesis { .. } => "opening parenthesis",
            Self::RightParenthesis { .. } => "closing parenthesis",
            Self::FunctionCall { .. } => "function call",
            Self::ArgumentSeparator { .. } => "argument separator",
        }
    }
}

/// A node of the token tree the parser builds between scanning and
/// linearization.
///
/// A freshly scanned expression is a flat sequence of leaves; each grouping
/// pass introduces `Group` nodes that pin down evaluation order, until
/// exactly one root remains.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A single token.
    Leaf(Token),
    /// An ordered sub-expression.
    Group(Vec<Node>),
}

impl Node {
    /// Returns the leftmost leaf token of the node, descending through
    /// nested groups.
    ///
    /// Empty groups cannot be constructed by the grouping passes, so a
    /// `Group` always has a first element.
    #[must_use]
    pub fn first_leaf(&self) -> &Token {
        let mut node = self;
        loop {
            match node {
                Self::Leaf(token) => return token,
                Self::Group(nodes) => node = &nodes[0],
            }
        }
    }

    /// Returns the contained token when the node is a leaf.
    #[must_use]
    pub const fn as_leaf(&self) -> Option<&Token> {
        match self {
            Self::Leaf(token) => Some(token),
            Self::Group(_) => None,
        }
    }
}
