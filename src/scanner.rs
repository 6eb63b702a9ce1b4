use crate::{
    error::ParseError,
    registry::{BinaryOperatorRegistry, UnaryOperatorRegistry},
    token::{Span, Token},
};

/// Binary operator recognition.
pub mod binary_op;
/// Function call and argument separator recognition.
pub mod function_call;
/// Bare identifier recognition.
pub mod identifier;
/// Numeric literal recognition.
pub mod numeric;
/// Parenthesis recognition.
pub mod paren;
/// Unary operator recognition and prefix-position retagging.
pub mod unary_op;

pub use binary_op::BinaryOperatorRecognizer;
pub use function_call::FunctionCallRecognizer;
pub use identifier::IdentifierRecognizer;
pub use numeric::NumericLiteralRecognizer;
pub use paren::ParenthesisRecognizer;
pub use unary_op::UnaryOperatorRecognizer;

/// The shared cursor state a scan threads through its recognizers.
///
/// Recognizers read the source at [`ScanState::offset`], push any tokens
/// they produce, and report how far they got; the driver owns all cursor
/// movement.
#[derive(Debug)]
pub struct ScanState<'a> {
    source: &'a str,
    offset: usize,
    tokens: Vec<Token>,
}

impl<'a> ScanState<'a> {
    fn new(source: &'a str) -> Self {
        Self { source,
               offset: 0,
               tokens: Vec::new(), }
    }

    /// Returns the full source text being scanned.
    #[must_use]
    pub const fn source(&self) -> &'a str {
        self.source
    }

    /// Returns the byte offset the next token must start at.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the source as raw bytes; token syntax is ASCII-only, so
    /// recognizers match on bytes and never split a character.
    #[must_use]
    pub const fn bytes(&self) -> &'a [u8] {
        self.source.as_bytes()
    }

    /// Returns the most recently captured token, if any.
    #[must_use]
    pub fn last_token(&self) -> Option<&Token> {
        self.tokens.last()
    }

    /// Appends a captured token.
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Grants a transform pass mutable access to the captured tokens.
    pub fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }
}

/// A sub-recognizer in the scanner's prioritized chain.
///
/// Each implementation claims one shape of token. The driver rotates
/// through the chain; a recognizer that does not match at the current
/// offset simply returns `None` and the next one is consulted.
pub trait TokenRecognizer {
    /// Attempts to recognize one or more tokens at the state's offset.
    ///
    /// On a match the recognizer pushes its tokens into the state and
    /// returns the end offset of the last one; on a miss it pushes nothing
    /// and returns `None`.
    fn recognize(&self, state: &mut ScanState<'_>) -> Option<usize>;

    /// Runs once over the completed token sequence after the scan.
    ///
    /// The default does nothing; recognizers that need pass-wide context
    /// (such as retagging operators by position) override it.
    fn transform(&self, state: &mut ScanState<'_>) {
        let _ = state;
    }
}

/// Converts source text into an ordered token sequence.
///
/// Recognizers are consulted in priority order (parenthesis, numeric
/// literal, function call, identifier, unary operator, binary operator)
/// via a rotating pointer that survives across tokens. Literal space
/// characters are skipped between tokens.
pub struct Scanner {
    recognizers: Vec<Box<dyn TokenRecognizer + Send + Sync>>,
}

impl Scanner {
    /// Builds the default recognizer chain over the given operator tables.
    #[must_use]
    pub fn from_registries(binary: &BinaryOperatorRegistry, unary: &UnaryOperatorRegistry) -> Self {
        Self { recognizers: vec![Box::new(ParenthesisRecognizer),
                                 Box::new(NumericLiteralRecognizer),
                                 Box::new(FunctionCallRecognizer),
                                 Box::new(IdentifierRecognizer),
                                 Box::new(UnaryOperatorRecognizer::new(unary)),
                                 Box::new(BinaryOperatorRecognizer::new(binary))], }
    }

    /// Scans an expression into tokens.
    ///
    /// # Errors
    /// Returns [`ParseError::UnexpectedToken`] when every recognizer has
    /// missed once at the same offset.
    ///
    /// # Example
    /// ```
    /// use numexpr::{
    ///     registry::{BinaryOperatorRegistry, UnaryOperatorRegistry},
    ///     scanner::Scanner,
    /// };
    ///
    /// let scanner = Scanner::from_registries(&BinaryOperatorRegistry::with_defaults(),
    ///                                        &UnaryOperatorRegistry::with_defaults());
    /// let tokens = scanner.scan("2 + 3").unwrap();
    /// assert_eq!(tokens.len(), 3);
    /// ```
    pub fn scan(&self, source: &str) -> Result<Vec<Token>, ParseError> {
        let mut state = ScanState::new(source);
        let mut current = 0;
        let mut misses = 0;

        while state.offset < source.len() {
            if state.bytes()[state.offset] == b' ' {
                state.offset += 1;
                continue;
            }

            let end = self.recognizers[current].recognize(&mut state);
            current = (current + 1) % self.recognizers.len();

            match end {
                Some(end) => {
                    debug_assert!(end > state.offset, "a recognizer must make progress");
                    state.offset = end;
                    misses = 0;
                },
                None => {
                    misses += 1;
                    if misses == self.recognizers.len() {
                        return Err(unexpected_character(source, state.offset));
                    }
                },
            }
        }

        for recognizer in &self.recognizers {
            recognizer.transform(&mut state);
        }

        Ok(state.tokens)
    }
}

fn unexpected_character(source: &str, offset: usize) -> ParseError {
    let (found, width) = source[offset..].chars().next().map_or(("end of input".to_string(), 0),
                                                                |c| {
                                                                    (format!("character '{c}'"),
                                                                     c.len_utf8())
                                                                });
    ParseError::UnexpectedToken { found,
                                  span: Span::new(offset, offset + width) }
}

/// Returns the end offset of the identifier starting at `start`, or `start`
/// itself when no identifier begins there.
///
/// Identifiers start with an ASCII letter or underscore and continue with
/// letters, digits, or underscores.
pub(crate) fn identifier_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() {
        let byte = bytes[end];
        let valid = if end == start {
            byte.is_ascii_alphabetic() || byte == b'_'
        } else {
            byte.is_ascii_alphanumeric() || byte == b'_'
        };
        if !valid {
            break;
        }
        end += 1;
    }
    end
}

/// Matches the longest registered symbol at `offset`, if any.
///
/// `symbols` must already be sorted longest-first.
pub(crate) fn match_symbol<'a>(source: &str,
                               offset: usize,
                               symbols: &'a [String])
                               -> Option<(&'a str, usize)> {
    symbols.iter()
           .find(|symbol| source[offset..].starts_with(symbol.as_str()))
           .map(|symbol| (symbol.as_str(), offset + symbol.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    fn scanner() -> Scanner {
        Scanner::from_registries(&BinaryOperatorRegistry::with_defaults(),
                                 &UnaryOperatorRegistry::with_defaults())
    }

    #[test]
    fn scans_simple_arithmetic() {
        let tokens = scanner().scan("2+3 * 40").unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0],
                   Token::NumericLiteral { value: Number::Integer(2),
                                           span:  Span::new(0, 1), });
        assert!(matches!(&tokens[3], Token::BinaryOperator { symbol, .. } if symbol == "*"));
        assert_eq!(tokens[4].span(), Span::new(6, 8));
    }

    #[test]
    fn classifies_function_calls_before_identifiers() {
        let tokens = scanner().scan("max(x, 2)").unwrap();
        assert!(matches!(&tokens[0],
                         Token::FunctionCall { name, argument_count: 2, .. } if name == "max"));
        assert!(matches!(&tokens[2], Token::Identifier { name, .. } if name == "x"));
        assert!(matches!(&tokens[3], Token::ArgumentSeparator { .. }));
    }

    #[test]
    fn longest_operator_symbol_wins() {
        let tokens = scanner().scan("2**3").unwrap();
        assert!(matches!(&tokens[1], Token::BinaryOperator { symbol, .. } if symbol == "**"));
    }

    #[test]
    fn chained_prefix_operators_are_retagged() {
        let tokens = scanner().scan("--2").unwrap();
        assert!(matches!(&tokens[0], Token::UnaryOperator { symbol, .. } if symbol == "-"));
        assert!(matches!(&tokens[1], Token::UnaryOperator { symbol, .. } if symbol == "-"));
    }

    #[test]
    fn minus_after_operand_stays_binary() {
        let tokens = scanner().scan("x-2").unwrap();
        assert!(matches!(&tokens[1], Token::BinaryOperator { symbol, .. } if symbol == "-"));
    }

    #[test]
    fn unknown_character_is_a_lexical_error() {
        let error = scanner().scan("2 $ 3").unwrap_err();
        assert_eq!(error,
                   ParseError::UnexpectedToken { found: "character '$'".to_string(),
                                                 span:  Span::new(2, 3), });
    }
}
