use crate::{
    registry::UnaryOperatorRegistry,
    scanner::{self, ScanState, TokenRecognizer},
    token::{Span, Token},
};

/// Recognizes prefix operators.
///
/// A symbol only reads as prefix when nothing that could serve as a left
/// operand precedes it: at the start of the expression, after another
/// operator, after `(`, or after an argument separator. Because the driver
/// rotates through recognizers, a prefix `-` is sometimes captured as a
/// binary operator first; the post-scan transform retags those by position.
pub struct UnaryOperatorRecognizer {
    symbols: Vec<String>,
}

impl UnaryOperatorRecognizer {
    /// Captures the registered symbols, longest first.
    #[must_use]
    pub fn new(registry: &UnaryOperatorRegistry) -> Self {
        Self { symbols: registry.symbols() }
    }
}

impl TokenRecognizer for UnaryOperatorRecognizer {
    fn recognize(&self, state: &mut ScanState<'_>) -> Option<usize> {
        if !prefix_position(state.last_token()) {
            return None;
        }
        let (symbol, end) = scanner::match_symbol(state.source(), state.offset(), &self.symbols)?;
        state.push(Token::UnaryOperator { symbol: symbol.to_string(),
                                          span:   Span::new(state.offset(), end), });
        Some(end)
    }

    fn transform(&self, state: &mut ScanState<'_>) {
        let mut prefix = true;
        for token in state.tokens_mut() {
            if let Token::BinaryOperator { symbol, span } = token {
                if prefix && self.symbols.contains(symbol) {
                    *token = Token::UnaryOperator { symbol: std::mem::take(symbol),
                                                    span:   *span, };
                }
            }
            prefix = prefix_position(Some(token));
        }
    }
}

/// Whether a token appearing after `last` would be in prefix position.
fn prefix_position(last: Option<&Token>) -> bool {
    match last {
        None => true,
        Some(token) => matches!(token,
                                Token::BinaryOperator { .. }
                                | Token::UnaryOperator { .. }
                                | Token::LeftParenthesis { .. }
                                | Token::ArgumentSeparator { .. }),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        registry::{BinaryOperatorRegistry, UnaryOperatorRegistry},
        scanner::Scanner,
        token::Token,
    };

    fn scan(source: &str) -> Vec<Token> {
        Scanner::from_registries(&BinaryOperatorRegistry::with_defaults(),
                                 &UnaryOperatorRegistry::with_defaults()).scan(source)
                                                                         .unwrap()
    }

    #[test]
    fn leading_minus_is_unary() {
        let tokens = scan("-2");
        assert!(matches!(&tokens[0], Token::UnaryOperator { symbol, .. } if symbol == "-"));
    }

    #[test]
    fn minus_after_open_parenthesis_is_unary() {
        let tokens = scan("2*(-3)");
        assert!(matches!(&tokens[3], Token::UnaryOperator { symbol, .. } if symbol == "-"));
    }

    #[test]
    fn minus_after_separator_is_unary() {
        let tokens = scan("max(1, -2)");
        assert!(matches!(&tokens[4], Token::UnaryOperator { symbol, .. } if symbol == "-"));
    }

    #[test]
    fn exponent_symbol_is_never_retagged() {
        let tokens = scan("2**-3");
        assert!(matches!(&tokens[1], Token::BinaryOperator { symbol, .. } if symbol == "**"));
        assert!(matches!(&tokens[2], Token::UnaryOperator { symbol, .. } if symbol == "-"));
    }
}
