use crate::{
    scanner::{self, ScanState, TokenRecognizer},
    token::{Span, Token},
};

/// Recognizes function-call heads and argument separators.
///
/// A call head is an identifier directly followed by `(`; the recognizer
/// looks ahead through the balanced parenthesis group to count the
/// arguments the caller wrote, so argument resolution later knows how many
/// values to expect. The `(` itself is left for the parenthesis recognizer.
pub struct FunctionCallRecognizer;

impl TokenRecognizer for FunctionCallRecognizer {
    fn recognize(&self, state: &mut ScanState<'_>) -> Option<usize> {
        let bytes = state.bytes();
        let start = state.offset();

        if bytes[start] == b',' {
            state.push(Token::ArgumentSeparator { span: Span::new(start, start + 1) });
            return Some(start + 1);
        }

        let end = scanner::identifier_end(bytes, start);
        if end == start || bytes.get(end) != Some(&b'(') {
            return None;
        }

        let name = state.source()[start..end].to_string();
        let argument_count = count_arguments(bytes, end);
        state.push(Token::FunctionCall { name,
                                         argument_count,
                                         span: Span::new(start, end) });
        Some(end)
    }
}

/// Counts the top-level arguments inside the parenthesis group opening at
/// `open`.
///
/// Separators one nesting level deep split the group into slots; a group
/// with no separators holds one argument if it contains anything at all.
/// Empty slots still count, they become omitted arguments for default
/// resolution.
fn count_arguments(bytes: &[u8], open: usize) -> usize {
    let mut depth = 0usize;
    let mut separators = 0usize;
    let mut has_content = false;

    for &byte in bytes.iter().skip(open) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            },
            b',' if depth == 1 => separators += 1,
            b' ' => {},
            _ if depth >= 1 => has_content = true,
            _ => {},
        }
    }

    if separators > 0 {
        separators + 1
    } else {
        usize::from(has_content)
    }
}
