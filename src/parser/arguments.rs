use crate::{
    error::ParseError,
    registry::FunctionRegistry,
    token::{Node, Token},
};

/// Resolves the argument lists of every function-call group in the tree.
///
/// Each call group's argument-list group is split on separator tokens into
/// positional slots; an empty slot (leading, trailing, or between two
/// separators) marks an omitted argument. Omitted and missing trailing
/// slots are filled from the function's registered defaults, and the call
/// head's argument count is updated to the resolved arity. The wrapper
/// group is flattened away, leaving `(head, argument, argument, ...)` for
/// the linearizer.
///
/// # Errors
/// - [`ParseError::UnknownFunction`] when the called name is unregistered.
/// - [`ParseError::MissingDefaultValue`] when an omitted slot has no
///   registered default.
/// - [`ParseError::TooManyArguments`] when a non-variadic function receives
///   more arguments than it declares.
/// - [`ParseError::UnexpectedToken`] when a slot holds more than one
///   element after grouping.
pub fn resolve(nodes: &mut [Node], functions: &FunctionRegistry) -> Result<(), ParseError> {
    for node in nodes.iter_mut() {
        resolve_node(node, functions)?;
    }
    Ok(())
}

fn resolve_node(node: &mut Node, functions: &FunctionRegistry) -> Result<(), ParseError> {
    let Node::Group(children) = node else {
        return Ok(());
    };
    for child in children.iter_mut() {
        resolve_node(child, functions)?;
    }

    let Some(Token::FunctionCall { name, argument_count, span }) = children[0].as_leaf() else {
        return Ok(());
    };
    let (name, declared, span) = (name.clone(), *argument_count, *span);

    let function =
        functions.get(&name)
                 .ok_or_else(|| ParseError::UnknownFunction { name: name.clone(), span })?;

    let mut slots = match children.pop() {
        Some(list) if children.len() == 1 => split_slots(list)?,
        Some(head) => {
            // A zero-argument call group holds only its head.
            children.push(head);
            Vec::new()
        },
        None => Vec::new(),
    };
    debug_assert_eq!(slots.len(), declared, "scan-time argument count diverged for '{name}'");

    let parameters = function.parameters();
    while slots.len() < parameters.len() {
        slots.push(None);
    }
    if !function.variadic() && slots.len() > parameters.len() {
        return Err(ParseError::TooManyArguments { function: name,
                                                  expected: parameters.len(),
                                                  actual: slots.len(),
                                                  span });
    }

    let mut resolved = Vec::with_capacity(slots.len() + 1);
    resolved.push(Node::Leaf(Token::FunctionCall { name: name.clone(),
                                                   argument_count: slots.len(),
                                                   span }));
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(argument) => resolved.push(argument),
            None => {
                let default = parameters.get(index).copied().flatten().ok_or(
                    ParseError::MissingDefaultValue { function:  name.clone(),
                                                      parameter: index + 1,
                                                      span, },
                )?;
                resolved.push(Node::Leaf(Token::NumericLiteral { value: default, span }));
            },
        }
    }
    *children = resolved;
    Ok(())
}

/// Splits an argument-list node on separator tokens, keeping omitted slots
/// as explicit `None` entries.
fn split_slots(list: Node) -> Result<Vec<Option<Node>>, ParseError> {
    let items = match list {
        Node::Group(items) => items,
        leaf => vec![leaf],
    };
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut slots = Vec::new();
    let mut current: Vec<Node> = Vec::new();
    for item in items {
        if matches!(item.as_leaf(), Some(Token::ArgumentSeparator { .. })) {
            slots.push(take_slot(&mut current)?);
        } else {
            current.push(item);
        }
    }
    slots.push(take_slot(&mut current)?);
    Ok(slots)
}

fn take_slot(current: &mut Vec<Node>) -> Result<Option<Node>, ParseError> {
    match current.len() {
        0 => Ok(None),
        1 => Ok(current.pop()),
        _ => {
            let excess = current[1].first_leaf();
            Err(ParseError::UnexpectedToken { found: excess.kind().to_string(),
                                              span:  excess.span(), })
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parser::grouping,
        registry::{BinaryOperatorRegistry, UnaryOperatorRegistry},
        scanner::Scanner,
        token::Span,
        value::Number,
    };

    fn build(source: &str) -> Result<Vec<Node>, ParseError> {
        let scanner = Scanner::from_registries(&BinaryOperatorRegistry::with_defaults(),
                                               &UnaryOperatorRegistry::with_defaults());
        let mut nodes: Vec<Node> = scanner.scan(source)
                                          .unwrap()
                                          .into_iter()
                                          .map(Node::Leaf)
                                          .collect();
        grouping::deparenthesize(&mut nodes)?;
        grouping::group_function_calls(&mut nodes)?;
        grouping::group_unary(&mut nodes)?;
        grouping::group_binary(&mut nodes, &BinaryOperatorRegistry::with_defaults())?;
        resolve(&mut nodes, &FunctionRegistry::with_defaults())?;
        Ok(nodes)
    }

    fn call_children(nodes: &[Node]) -> &[Node] {
        match &nodes[0] {
            Node::Group(children) => children,
            other => panic!("expected a call group, got {other:?}"),
        }
    }

    #[test]
    fn omitted_trailing_argument_uses_the_default() {
        let nodes = build("round(2.5)").unwrap();
        let children = call_children(&nodes);
        assert_eq!(children.len(), 3);
        assert!(matches!(children[0].as_leaf(),
                         Some(Token::FunctionCall { argument_count: 2, .. })));
        assert!(matches!(children[2].as_leaf(),
                         Some(Token::NumericLiteral { value: Number::Integer(0), .. })));
    }

    #[test]
    fn omitted_slot_without_default_is_rejected() {
        assert!(matches!(build("pow(2)"),
                         Err(ParseError::MissingDefaultValue { parameter: 2, .. })));
    }

    #[test]
    fn variadic_calls_accept_extra_arguments() {
        let nodes = build("max(1, 2, 3, 4)").unwrap();
        assert_eq!(call_children(&nodes).len(), 5);
    }

    #[test]
    fn excess_arguments_for_fixed_arity_are_rejected() {
        assert_eq!(build("sqrt(1, 2)"),
                   Err(ParseError::TooManyArguments { function: "sqrt".to_string(),
                                                      expected: 1,
                                                      actual: 2,
                                                      span: Span::new(0, 4) }));
    }

    #[test]
    fn unknown_function_is_rejected() {
        assert!(matches!(build("frobnicate(1)"),
                         Err(ParseError::UnknownFunction { .. })));
    }

    #[test]
    fn adjacent_arguments_without_a_separator_are_rejected() {
        assert!(matches!(build("sqrt(1 2)"),
                         Err(ParseError::UnexpectedToken { .. })));
    }
}
