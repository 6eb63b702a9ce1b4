use crate::token::{Node, Token};

/// Flattens a single-rooted token tree into postfix order.
///
/// Groups are reordered so that every operator or call head follows its
/// operands: a function-call group emits its arguments then the head, a
/// 2-element unary group emits `(operand, operator)`, and a 3-element
/// binary group emits `(left, right, operator)`. The walk keeps its own
/// work stack, so call depth stays flat no matter how deeply the source
/// expression nests.
pub fn linearize(root: Node) -> Vec<Token> {
    let mut output = Vec::new();
    let mut work = vec![root];

    while let Some(node) = work.pop() {
        let mut children = match node {
            Node::Leaf(token) => {
                output.push(token);
                continue;
            },
            Node::Group(children) => children,
        };

        if matches!(children.first().and_then(Node::as_leaf), Some(Token::FunctionCall { .. })) {
            let head = children.remove(0);
            children.push(head);
        } else if children.len() == 2
                  && matches!(children[0].as_leaf(), Some(Token::UnaryOperator { .. }))
        {
            children.swap(0, 1);
        } else if children.len() == 3
                  && matches!(children[1].as_leaf(), Some(Token::BinaryOperator { .. }))
        {
            children.swap(1, 2);
        }

        // Emit order becomes pop order.
        while let Some(child) = children.pop() {
            work.push(child);
        }
    }
    output
}
