use crate::{
    scanner::{ScanState, TokenRecognizer},
    token::{Span, Token},
    value::Number,
};

/// Recognizes integer and real literals.
///
/// Accepted shapes: a digit run, a digit run with a fractional part
/// (`12.5`), a bare fractional part (`.5`), and any of those with a
/// trailing exponent (`1e9`, `2.5E-3`). Integer literals that overflow
/// `i64` fall back to real representation.
pub struct NumericLiteralRecognizer;

impl TokenRecognizer for NumericLiteralRecognizer {
    fn recognize(&self, state: &mut ScanState<'_>) -> Option<usize> {
        let bytes = state.bytes();
        let start = state.offset();
        let mut end = start;
        let mut is_real = false;

        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        let integer_digits = end - start;

        if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
            is_real = true;
            end += 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
        if integer_digits == 0 && !is_real {
            return None;
        }

        if let Some(after_exponent) = exponent_end(bytes, end) {
            is_real = true;
            end = after_exponent;
        }

        let text = &state.source()[start..end];
        let value = if is_real {
            Number::Real(text.parse().ok()?)
        } else {
            text.parse()
                .map(Number::Integer)
                .or_else(|_| text.parse().map(Number::Real))
                .ok()?
        };

        state.push(Token::NumericLiteral { value,
                                           span: Span::new(start, end) });
        Some(end)
    }
}

/// Returns the end of a well-formed exponent suffix starting at `from`, or
/// `None` when there is no (complete) exponent there.
fn exponent_end(bytes: &[u8], from: usize) -> Option<usize> {
    if from >= bytes.len() || !matches!(bytes[from], b'e' | b'E') {
        return None;
    }
    let mut end = from + 1;
    if end < bytes.len() && matches!(bytes[end], b'+' | b'-') {
        end += 1;
    }
    if end >= bytes.len() || !bytes[end].is_ascii_digit() {
        return None;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    Some(end)
}
