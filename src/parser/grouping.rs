use crate::{
    error::ParseError,
    registry::{Associativity, BinaryOperatorRegistry},
    token::{Node, Token},
};

/// Replaces every parenthesized region with a group node, scanning
/// right-to-left so the innermost pair is always handled first.
///
/// An empty pair disappears, a pair around a single element unwraps to that
/// element, and anything larger becomes a nested group.
///
/// # Errors
/// - [`ParseError::UnmatchedLeftParenthesis`] when an opening parenthesis is
///   never closed.
/// - [`ParseError::UnmatchedRightParenthesis`] when a closing parenthesis
///   has no opener.
pub fn deparenthesize(nodes: &mut Vec<Node>) -> Result<(), ParseError> {
    let mut i = nodes.len();
    while i > 0 {
        i -= 1;
        let Some(Token::LeftParenthesis { span }) = nodes[i].as_leaf() else {
            continue;
        };
        let open_span = *span;

        // The rightmost opener pairs with the nearest closer after it.
        let close = nodes[i + 1..].iter()
                                  .position(is_right_parenthesis)
                                  .map(|offset| i + 1 + offset)
                                  .ok_or(ParseError::UnmatchedLeftParenthesis { span: open_span })?;

        let inner_count = close - i - 1;
        let mut inner: Vec<Node> = nodes.drain(i..=close).skip(1).take(inner_count).collect();
        match inner.len() {
            0 => {},
            1 => nodes.insert(i, inner.swap_remove(0)),
            _ => nodes.insert(i, Node::Group(inner)),
        }
    }

    for node in nodes.iter() {
        if let Some(token @ Token::RightParenthesis { .. }) = node.as_leaf() {
            return Err(ParseError::UnmatchedRightParenthesis { span: token.span() });
        }
    }
    Ok(())
}

fn is_right_parenthesis(node: &Node) -> bool {
    matches!(node.as_leaf(), Some(Token::RightParenthesis { .. }))
}

/// Attaches each function-call head to its argument-list group.
///
/// A call that declared arguments absorbs the sibling to its right (wrapped
/// as a group when it is a bare token); a zero-argument call becomes a
/// singleton group around the head alone. Either way no bare call token
/// survives this pass.
///
/// # Errors
/// Returns [`ParseError::UnexpectedToken`] when a call that declared
/// arguments has nothing to its right to absorb.
pub fn group_function_calls(nodes: &mut Vec<Node>) -> Result<(), ParseError> {
    let mut i = 0;
    while i < nodes.len() {
        if let Node::Group(children) = &mut nodes[i] {
            group_function_calls(children)?;
            i += 1;
            continue;
        }
        let Some(Token::FunctionCall { argument_count, span, .. }) = nodes[i].as_leaf() else {
            i += 1;
            continue;
        };
        let (argument_count, span) = (*argument_count, *span);

        let head = std::mem::replace(&mut nodes[i], Node::Group(Vec::new()));
        if argument_count == 0 {
            nodes[i] = Node::Group(vec![head]);
        } else {
            if i + 1 >= nodes.len() {
                return Err(ParseError::UnexpectedToken { found: "function call".to_string(),
                                                         span });
            }
            let mut arguments = match nodes.remove(i + 1) {
                group @ Node::Group(_) => group,
                leaf => Node::Group(vec![leaf]),
            };
            if let Node::Group(children) = &mut arguments {
                group_function_calls(children)?;
            }
            nodes[i] = Node::Group(vec![head, arguments]);
        }
        i += 1;
    }
    Ok(())
}

/// Pairs each prefix operator with the operand to its right.
///
/// Runs right-to-left so chains such as `--2` nest naturally, and recurses
/// into nested groups first.
///
/// # Errors
/// Returns [`ParseError::MissingUnaryOperand`] when nothing usable follows
/// the operator.
pub fn group_unary(nodes: &mut Vec<Node>) -> Result<(), ParseError> {
    for node in nodes.iter_mut() {
        if let Node::Group(children) = node {
            group_unary(children)?;
        }
    }

    let mut i = nodes.len();
    while i > 0 {
        i -= 1;
        let Some(Token::UnaryOperator { symbol, span }) = nodes[i].as_leaf() else {
            continue;
        };
        let (symbol, span) = (symbol.clone(), *span);

        if i + 1 >= nodes.len() || !is_operand(&nodes[i + 1]) {
            return Err(ParseError::MissingUnaryOperand { symbol, span });
        }
        let operand = nodes.remove(i + 1);
        let operator = std::mem::replace(&mut nodes[i], Node::Group(Vec::new()));
        nodes[i] = Node::Group(vec![operator, operand]);
    }
    Ok(())
}

/// Folds infix operators into `(left, operator, right)` groups, one
/// precedence level at a time from tightest-binding to loosest.
///
/// Nested groups are folded first (post-order). Within a level,
/// left-associative operators fold repeatedly from the start and
/// right-associative operators from the end, so chains group in the
/// registered direction.
///
/// # Errors
/// Returns [`ParseError::MissingLeftOperand`] or
/// [`ParseError::MissingRightOperand`] when a fold site lacks a usable
/// operand on the named side.
pub fn group_binary(nodes: &mut Vec<Node>,
                    registry: &BinaryOperatorRegistry)
                    -> Result<(), ParseError> {
    for node in nodes.iter_mut() {
        if let Node::Group(children) = node {
            group_binary(children, registry)?;
        }
    }

    for (associativity, operators) in registry.by_precedence() {
        let symbols: Vec<&str> = operators.iter().map(|operator| operator.symbol()).collect();
        match associativity {
            Associativity::Left => fold_level_left(nodes, &symbols)?,
            Associativity::Right => fold_level_right(nodes, &symbols)?,
        }
    }
    Ok(())
}

fn fold_level_left(nodes: &mut Vec<Node>, symbols: &[&str]) -> Result<(), ParseError> {
    let mut i = 0;
    while i < nodes.len() {
        if level_operator(&nodes[i], symbols).is_none() {
            i += 1;
            continue;
        }
        fold_at(nodes, i, symbols)?;
        // The fold shifted the remainder left by two; `i` now points at the
        // element that followed the right operand.
    }
    Ok(())
}

fn fold_level_right(nodes: &mut Vec<Node>, symbols: &[&str]) -> Result<(), ParseError> {
    let mut i = nodes.len();
    while i > 0 {
        i -= 1;
        if level_operator(&nodes[i], symbols).is_none() {
            continue;
        }
        fold_at(nodes, i, symbols)?;
        // The new group sits at `i - 1`; resume scanning to its left.
        i -= 1;
    }
    Ok(())
}

fn fold_at(nodes: &mut Vec<Node>, i: usize, symbols: &[&str]) -> Result<(), ParseError> {
    // The caller has verified a level operator sits at `i`.
    let Some((symbol, span)) = level_operator(&nodes[i], symbols) else {
        return Ok(());
    };
    if i == 0 || !is_operand(&nodes[i - 1]) {
        return Err(ParseError::MissingLeftOperand { symbol, span });
    }
    if i + 1 >= nodes.len() || !is_operand(&nodes[i + 1]) {
        return Err(ParseError::MissingRightOperand { symbol, span });
    }

    let right = nodes.remove(i + 1);
    let operator = nodes.remove(i);
    let left = std::mem::replace(&mut nodes[i - 1], Node::Group(Vec::new()));
    nodes[i - 1] = Node::Group(vec![left, operator, right]);
    Ok(())
}

fn level_operator(node: &Node, symbols: &[&str]) -> Option<(String, crate::token::Span)> {
    match node.as_leaf() {
        Some(Token::BinaryOperator { symbol, span }) if symbols.contains(&symbol.as_str()) => {
            Some((symbol.clone(), *span))
        },
        _ => None,
    }
}

/// Whether a node can serve as an operand: anything except a leftover
/// operator or separator leaf.
fn is_operand(node: &Node) -> bool {
    !matches!(node.as_leaf(),
              Some(Token::BinaryOperator { .. }
                   | Token::UnaryOperator { .. }
                   | Token::ArgumentSeparator { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{registry::UnaryOperatorRegistry, scanner::Scanner, token::Span, value::Number};

    fn nodes_for(source: &str) -> Vec<Node> {
        let scanner = Scanner::from_registries(&BinaryOperatorRegistry::with_defaults(),
                                               &UnaryOperatorRegistry::with_defaults());
        scanner.scan(source).unwrap().into_iter().map(Node::Leaf).collect()
    }

    fn literal(value: i64) -> Node {
        Node::Leaf(Token::NumericLiteral { value: Number::Integer(value),
                                           span:  Span::new(0, 0), })
    }

    #[test]
    fn empty_parentheses_disappear() {
        let mut nodes = nodes_for("()");
        deparenthesize(&mut nodes).unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn single_element_groups_unwrap() {
        let mut nodes = nodes_for("((2))");
        deparenthesize(&mut nodes).unwrap();
        assert!(matches!(nodes.as_slice(), [Node::Leaf(Token::NumericLiteral { .. })]));
    }

    #[test]
    fn unmatched_parentheses_are_reported() {
        let mut nodes = nodes_for("(2+3");
        assert_eq!(deparenthesize(&mut nodes),
                   Err(ParseError::UnmatchedLeftParenthesis { span: Span::new(0, 1) }));

        let mut nodes = nodes_for("2+3)");
        assert_eq!(deparenthesize(&mut nodes),
                   Err(ParseError::UnmatchedRightParenthesis { span: Span::new(3, 4) }));
    }

    #[test]
    fn left_associative_chains_fold_from_the_start() {
        let mut nodes = nodes_for("10/2/5");
        group_binary(&mut nodes, &BinaryOperatorRegistry::with_defaults()).unwrap();
        // ((10 / 2) / 5): the outer group's left child is itself a group.
        let Node::Group(outer) = &nodes[0] else {
            panic!("expected a group, got {nodes:?}");
        };
        assert!(matches!(outer[0], Node::Group(_)));
        assert!(matches!(outer[2], Node::Leaf(Token::NumericLiteral { .. })));
    }

    #[test]
    fn right_associative_chains_fold_from_the_end() {
        let mut nodes = nodes_for("2**3**2");
        group_binary(&mut nodes, &BinaryOperatorRegistry::with_defaults()).unwrap();
        // (2 ** (3 ** 2)): the outer group's right child is the nested group.
        let Node::Group(outer) = &nodes[0] else {
            panic!("expected a group, got {nodes:?}");
        };
        assert!(matches!(outer[0], Node::Leaf(Token::NumericLiteral { .. })));
        assert!(matches!(outer[2], Node::Group(_)));
    }

    #[test]
    fn missing_operands_are_structural_errors() {
        let mut nodes = vec![Node::Leaf(Token::BinaryOperator { symbol: "*".to_string(),
                                                                span:   Span::new(0, 1), }),
                             literal(2)];
        assert!(matches!(group_binary(&mut nodes, &BinaryOperatorRegistry::with_defaults()),
                         Err(ParseError::MissingLeftOperand { .. })));

        let mut nodes = vec![literal(2),
                             Node::Leaf(Token::BinaryOperator { symbol: "*".to_string(),
                                                                span:   Span::new(1, 2), })];
        assert!(matches!(group_binary(&mut nodes, &BinaryOperatorRegistry::with_defaults()),
                         Err(ParseError::MissingRightOperand { .. })));
    }

    #[test]
    fn unary_chains_nest_right_to_left() {
        let mut nodes = nodes_for("--2");
        group_unary(&mut nodes).unwrap();
        let Node::Group(outer) = &nodes[0] else {
            panic!("expected a group, got {nodes:?}");
        };
        assert!(matches!(outer[0], Node::Leaf(Token::UnaryOperator { .. })));
        assert!(matches!(outer[1], Node::Group(_)));
    }

    #[test]
    fn trailing_unary_operator_is_rejected() {
        let mut nodes = nodes_for("-");
        assert!(matches!(group_unary(&mut nodes),
                         Err(ParseError::MissingUnaryOperand { .. })));
    }
}
