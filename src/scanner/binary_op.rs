use crate::{
    registry::BinaryOperatorRegistry,
    scanner::{self, ScanState, TokenRecognizer},
    token::{Span, Token},
};

/// Recognizes infix operators by greedy longest-symbol matching.
///
/// Position is not checked here; a symbol captured as binary in prefix
/// position is retagged by [`super::UnaryOperatorRecognizer::transform`].
pub struct BinaryOperatorRecognizer {
    symbols: Vec<String>,
}

impl BinaryOperatorRecognizer {
    /// Captures the registered symbols, longest first.
    #[must_use]
    pub fn new(registry: &BinaryOperatorRegistry) -> Self {
        Self { symbols: registry.symbols() }
    }
}

impl TokenRecognizer for BinaryOperatorRecognizer {
    fn recognize(&self, state: &mut ScanState<'_>) -> Option<usize> {
        let (symbol, end) = scanner::match_symbol(state.source(), state.offset(), &self.symbols)?;
        state.push(Token::BinaryOperator { symbol: symbol.to_string(),
                                           span:   Span::new(state.offset(), end), });
        Some(end)
    }
}
