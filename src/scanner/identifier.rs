use crate::{
    scanner::{self, ScanState, TokenRecognizer},
    token::{Span, Token},
};

/// Recognizes bare identifiers: variable and constant references.
///
/// A name directly followed by `(` is declined so the function-call
/// recognizer can claim it with an argument count.
pub struct IdentifierRecognizer;

impl TokenRecognizer for IdentifierRecognizer {
    fn recognize(&self, state: &mut ScanState<'_>) -> Option<usize> {
        let bytes = state.bytes();
        let start = state.offset();
        let end = scanner::identifier_end(bytes, start);
        if end == start || bytes.get(end) == Some(&b'(') {
            return None;
        }

        state.push(Token::Identifier { name: state.source()[start..end].to_string(),
                                       span: Span::new(start, end), });
        Some(end)
    }
}
