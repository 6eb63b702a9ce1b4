use crate::{
    scanner::{ScanState, TokenRecognizer},
    token::{Span, Token},
};

/// Recognizes `(` and `)`.
pub struct ParenthesisRecognizer;

impl TokenRecognizer for ParenthesisRecognizer {
    fn recognize(&self, state: &mut ScanState<'_>) -> Option<usize> {
        let start = state.offset();
        let span = Span::new(start, start + 1);
        match state.bytes()[start] {
            b'(' => {
                state.push(Token::LeftParenthesis { span });
                Some(start + 1)
            },
            b')' => {
                state.push(Token::RightParenthesis { span });
                Some(start + 1)
            },
            _ => None,
        }
    }
}
