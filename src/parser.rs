use std::sync::Arc;

use crate::{
    error::{ParseError, RegistryError},
    expression::{Expression, Instruction, OperatorSource},
    optimizer,
    registry::{
        BinaryOperator, BinaryOperatorRegistry, ConstantRegistry, Function, FunctionRegistry,
        UnaryOperator, UnaryOperatorRegistry,
    },
    scanner::Scanner,
    token::{Node, Token},
    value::Number,
};

/// Argument-list splitting and default substitution.
pub mod arguments;
/// The tree-building passes between scanning and linearization.
pub mod grouping;
/// Post-order flattening of the token tree into postfix order.
pub mod postfix;

/// Compiles expression source text into evaluatable [`Expression`]s.
///
/// A parser owns the operator, function, and constant registries every
/// compilation resolves against. Registration is meant to happen once,
/// before the first `parse` call; expressions hold on to the constant table
/// they were compiled with, so a parser should be treated as frozen as soon
/// as any expression from it is alive.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use numexpr::{value::Number, Parser};
///
/// let parser = Parser::new();
/// let expression = parser.parse("x ** 2 + 1").unwrap();
/// let bindings = HashMap::from([("x".to_string(), Number::Integer(3))]);
/// assert_eq!(expression.evaluate(&bindings), Ok(Number::Integer(10)));
/// ```
pub struct Parser {
    binary:    BinaryOperatorRegistry,
    unary:     UnaryOperatorRegistry,
    functions: FunctionRegistry,
    constants: Arc<ConstantRegistry>,
    scanner:   Scanner,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Creates a parser with the default operator, function and constant
    /// tables.
    #[must_use]
    pub fn new() -> Self {
        Self::from_registries(BinaryOperatorRegistry::with_defaults(),
                              UnaryOperatorRegistry::with_defaults(),
                              FunctionRegistry::with_defaults(),
                              ConstantRegistry::with_defaults())
    }

    /// Creates a parser with empty registries; every operator, function and
    /// constant must be registered by hand.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_registries(BinaryOperatorRegistry::new(),
                              UnaryOperatorRegistry::new(),
                              FunctionRegistry::new(),
                              ConstantRegistry::new())
    }

    fn from_registries(binary: BinaryOperatorRegistry,
                       unary: UnaryOperatorRegistry,
                       functions: FunctionRegistry,
                       constants: ConstantRegistry)
                       -> Self {
        let scanner = Scanner::from_registries(&binary, &unary);
        Self { binary,
               unary,
               functions,
               constants: Arc::new(constants),
               scanner }
    }

    /// Returns the infix operator table.
    #[must_use]
    pub const fn binary_operators(&self) -> &BinaryOperatorRegistry {
        &self.binary
    }

    /// Returns the prefix operator table.
    #[must_use]
    pub const fn unary_operators(&self) -> &UnaryOperatorRegistry {
        &self.unary
    }

    /// Returns the function table.
    #[must_use]
    pub const fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Returns the constant table.
    #[must_use]
    pub fn constants(&self) -> &ConstantRegistry {
        &self.constants
    }

    /// Registers an infix operator and rebuilds the scanner's symbol table.
    ///
    /// # Errors
    /// See [`BinaryOperatorRegistry::register`].
    pub fn register_binary_operator(&mut self,
                                    operator: BinaryOperator)
                                    -> Result<(), RegistryError> {
        self.binary.register(operator)?;
        self.scanner = Scanner::from_registries(&self.binary, &self.unary);
        Ok(())
    }

    /// Registers a prefix operator and rebuilds the scanner's symbol table.
    ///
    /// # Errors
    /// See [`UnaryOperatorRegistry::register`].
    pub fn register_unary_operator(&mut self,
                                   operator: UnaryOperator)
                                   -> Result<(), RegistryError> {
        self.unary.register(operator)?;
        self.scanner = Scanner::from_registries(&self.binary, &self.unary);
        Ok(())
    }

    /// Registers a function.
    ///
    /// # Errors
    /// See [`FunctionRegistry::register`].
    pub fn register_function(&mut self, function: Function) -> Result<(), RegistryError> {
        self.functions.register(function)
    }

    /// Registers a constant.
    ///
    /// # Errors
    /// See [`ConstantRegistry::register`].
    pub fn register_constant(&mut self, name: &str, value: Number) -> Result<(), RegistryError> {
        Arc::make_mut(&mut self.constants).register(name, value)
    }

    /// Compiles and optimizes an expression.
    ///
    /// # Errors
    /// Any [`ParseError`] raised while scanning, structuring, compiling, or
    /// optimizing the source.
    pub fn parse(&self, source: &str) -> Result<Expression, ParseError> {
        let expression = self.parse_unoptimized(source)?;
        optimizer::optimize(expression, &self.binary)
    }

    /// Compiles an expression without the optimizer pass.
    ///
    /// The result evaluates identically to the optimized form wherever both
    /// are defined; it just performs every written operation literally.
    ///
    /// # Errors
    /// Any [`ParseError`] raised while scanning, structuring, or compiling
    /// the source.
    pub fn parse_unoptimized(&self, source: &str) -> Result<Expression, ParseError> {
        let tokens = self.scanner.scan(source)?;
        if tokens.is_empty() {
            return Err(ParseError::EmptyExpression);
        }

        let mut nodes: Vec<Node> = tokens.into_iter().map(Node::Leaf).collect();
        grouping::deparenthesize(&mut nodes)?;
        grouping::group_function_calls(&mut nodes)?;
        grouping::group_unary(&mut nodes)?;
        grouping::group_binary(&mut nodes, &self.binary)?;
        arguments::resolve(&mut nodes, &self.functions)?;

        if nodes.len() > 1 {
            let excess = nodes[1].first_leaf();
            return Err(ParseError::UnexpectedToken { found: excess.kind().to_string(),
                                                     span:  excess.span(), });
        }
        let Some(root) = nodes.pop() else {
            // Only parentheses were written, e.g. "()".
            return Err(ParseError::EmptyExpression);
        };

        let instructions = postfix::linearize(root).iter()
                                                   .map(|token| self.compile_token(token))
                                                   .collect::<Result<Vec<_>, _>>()?;
        Ok(Expression::new(source, Arc::clone(&self.constants), instructions))
    }

    fn compile_token(&self, token: &Token) -> Result<Instruction, ParseError> {
        match token {
            Token::NumericLiteral { value, span } => {
                Ok(Instruction::NumericLiteral { value: *value, span: *span })
            },
            Token::Identifier { name, span } => Ok(match self.constants.get(name) {
                Some(value) => Instruction::NumericLiteral { value, span: *span },
                None => Instruction::Variable { name: name.clone(), span: *span },
            }),
            Token::BinaryOperator { symbol, span } => {
                let operator = self.binary.get(symbol).ok_or_else(|| {
                                   ParseError::UnknownOperator { symbol: symbol.clone(),
                                                                 span:   *span, }
                               })?;
                Ok(Instruction::FunctionCall { name: symbol.clone(),
                                               arity: 2,
                                               closure: operator.closure(),
                                               deterministic: operator.deterministic(),
                                               commutative: operator.commutative(),
                                               source:
                                                   Some(OperatorSource::Binary(symbol.clone())),
                                               span: *span })
            },
            Token::UnaryOperator { symbol, span } => {
                let operator = self.unary.get(symbol).ok_or_else(|| {
                                   ParseError::UnknownOperator { symbol: symbol.clone(),
                                                                 span:   *span, }
                               })?;
                Ok(Instruction::FunctionCall { name: symbol.clone(),
                                               arity: 1,
                                               closure: operator.closure(),
                                               deterministic: operator.deterministic(),
                                               commutative: false,
                                               source: Some(OperatorSource::Unary(symbol.clone())),
                                               span: *span })
            },
            Token::FunctionCall { name, argument_count, span } => {
                let function = self.functions.get(name).ok_or_else(|| {
                                   ParseError::UnknownFunction { name: name.clone(),
                                                                 span: *span, }
                               })?;
                Ok(Instruction::FunctionCall { name: name.clone(),
                                               arity: *argument_count,
                                               closure: function.closure(),
                                               deterministic: function.deterministic(),
                                               commutative: false,
                                               source: None,
                                               span: *span })
            },
            Token::LeftParenthesis { span }
            | Token::RightParenthesis { span }
            | Token::ArgumentSeparator { span } => {
                Err(ParseError::UnexpectedToken { found: token.kind().to_string(),
                                                  span:  *span, })
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::registry::Associativity;

    #[test]
    fn empty_sources_are_rejected() {
        let parser = Parser::new();
        assert_eq!(parser.parse("").unwrap_err(), ParseError::EmptyExpression);
        assert_eq!(parser.parse("   ").unwrap_err(), ParseError::EmptyExpression);
        assert_eq!(parser.parse("()").unwrap_err(), ParseError::EmptyExpression);
    }

    #[test]
    fn leftover_tokens_are_rejected() {
        let parser = Parser::new();
        assert!(matches!(parser.parse("2 3"),
                         Err(ParseError::UnexpectedToken { .. })));
        assert!(matches!(parser.parse("1, 2"),
                         Err(ParseError::UnexpectedToken { .. })));
    }

    #[test]
    fn unoptimized_expressions_keep_every_instruction() {
        let parser = Parser::new();
        let expression = parser.parse_unoptimized("x * 1").unwrap();
        assert_eq!(expression.instructions().len(), 3);
    }

    #[test]
    fn custom_binary_operators_parse_after_registration() {
        let mut parser = Parser::new();
        parser.register_binary_operator(BinaryOperator::new("<>", 1, Associativity::Left, true,
                                                            true, |l, r| {
                                            Ok(if l.as_real() >= r.as_real() { l } else { r })
                                        }))
              .unwrap();
        let expression = parser.parse("2 <> 3 <> 1").unwrap();
        assert_eq!(expression.evaluate(&HashMap::new()), Ok(Number::Integer(3)));
    }

    #[test]
    fn custom_constants_compile_to_literals() {
        let mut parser = Parser::empty();
        parser.register_constant("answer", Number::Integer(42)).unwrap();
        let expression = parser.parse("answer").unwrap();
        assert_eq!(expression.constant_value(), Some(Number::Integer(42)));
    }

    #[test]
    fn operators_are_unknown_in_an_empty_parser() {
        let parser = Parser::empty();
        assert!(matches!(parser.parse("1 + 2"),
                         Err(ParseError::UnexpectedToken { .. })));
    }
}
