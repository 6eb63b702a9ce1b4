use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    error::EvalError,
    registry::{ConstantRegistry, NativeFn},
    token::Span,
    value::Number,
};

/// Identifies the operator token a call instruction was compiled from.
///
/// The optimizer only rewrites instructions that project registered
/// operators; named function calls carry no source and are left alone
/// (apart from constant folding).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorSource {
    /// Compiled from an infix operator with this symbol.
    Binary(String),
    /// Compiled from a prefix operator with this symbol.
    Unary(String),
}

/// One step of a compiled postfix program.
#[derive(Clone)]
pub enum Instruction {
    /// Pushes a literal value.
    NumericLiteral {
        /// The value to push.
        value: Number,
        /// Source location the instruction was compiled from.
        span:  Span,
    },
    /// Pushes the value bound to a name at evaluation time.
    Variable {
        /// The variable name.
        name: String,
        /// Source location the instruction was compiled from.
        span: Span,
    },
    /// Pops `arity` operands, invokes a native callable, pushes the result.
    FunctionCall {
        /// The function name or operator symbol, for diagnostics.
        name:          String,
        /// Number of operands consumed from the stack.
        arity:         usize,
        /// The native implementation.
        closure:       NativeFn,
        /// Whether identical inputs always produce identical output.
        deterministic: bool,
        /// Whether operand order is irrelevant.
        commutative:   bool,
        /// The operator this instruction projects, if any.
        source:        Option<OperatorSource>,
        /// Source location the instruction was compiled from.
        span:          Span,
    },
}

impl Instruction {
    /// Returns the source location the instruction was compiled from.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::NumericLiteral { span, .. }
            | Self::Variable { span, .. }
            | Self::FunctionCall { span, .. } => *span,
        }
    }

    /// Returns `false` only for calls to non-deterministic callables;
    /// literals and variable reads are always deterministic.
    #[must_use]
    pub const fn is_deterministic(&self) -> bool {
        match self {
            Self::FunctionCall { deterministic, .. } => *deterministic,
            Self::NumericLiteral { .. } | Self::Variable { .. } => true,
        }
    }

    /// Structural equality ignoring source positions.
    ///
    /// Two call instructions are equivalent only when they share the same
    /// underlying callable, so differently registered functions never
    /// compare equal even under the same name.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NumericLiteral { value: a, .. }, Self::NumericLiteral { value: b, .. }) => {
                a == b
            },
            (Self::Variable { name: a, .. }, Self::Variable { name: b, .. }) => a == b,
            (Self::FunctionCall { name: a, arity: arity_a, closure: closure_a, .. },
             Self::FunctionCall { name: b, arity: arity_b, closure: closure_b, .. }) => {
                a == b && arity_a == arity_b && Arc::ptr_eq(closure_a, closure_b)
            },
            _ => false,
        }
    }
}

impl std::fmt::Debug for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NumericLiteral { value, span } => f.debug_struct("NumericLiteral")
                                                     .field("value", value)
                                                     .field("span", span)
                                                     .finish(),
            Self::Variable { name, span } => f.debug_struct("Variable")
                                              .field("name", name)
                                              .field("span", span)
                                              .finish(),
            Self::FunctionCall { name,
                                 arity,
                                 deterministic,
                                 commutative,
                                 source,
                                 span,
                                 .. } => f.debug_struct("FunctionCall")
                                          .field("name", name)
                                          .field("arity", arity)
                                          .field("deterministic", deterministic)
                                          .field("commutative", commutative)
                                          .field("source", source)
                                          .field("span", span)
                                          .finish_non_exhaustive(),
        }
    }
}

impl PartialEq for Instruction {
    fn eq(&self, other: &Self) -> bool {
        self.span() == other.span() && self.equivalent(other)
    }
}

/// A compiled, immutable expression.
///
/// Evaluation is a single pass over the postfix instruction sequence with
/// an explicit value stack; no parsing happens after construction. An
/// `Expression` holds no interior mutability and may be evaluated from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct Expression {
    source:       String,
    constants:    Arc<ConstantRegistry>,
    instructions: Vec<Instruction>,
}

impl Expression {
    pub(crate) fn new(source: &str,
                      constants: Arc<ConstantRegistry>,
                      instructions: Vec<Instruction>)
                      -> Self {
        Self { source: source.to_string(),
               constants,
               instructions }
    }

    /// Replaces the instruction sequence, keeping source and constants.
    pub(crate) fn with_instructions(self, instructions: Vec<Instruction>) -> Self {
        Self { instructions, ..self }
    }

    /// Returns the original source text the expression was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the compiled postfix instruction sequence.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Returns the distinct variable names the expression reads, in first
    /// appearance order, excluding names shadowed by a registered constant.
    ///
    /// # Example
    /// ```
    /// use numexpr::Parser;
    ///
    /// let expression = Parser::new().parse_unoptimized("x + y * x + pi").unwrap();
    /// let variables: Vec<&str> = expression.variables().collect();
    /// assert_eq!(variables, ["x", "y"]);
    /// ```
    pub fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        let mut seen = HashSet::new();
        self.instructions
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Variable { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .filter(move |name| !self.constants.contains(name) && seen.insert(*name))
    }

    /// Returns the expression's value when it compiled down to a single
    /// literal and needs no bindings at all.
    #[must_use]
    pub fn constant_value(&self) -> Option<Number> {
        match self.instructions.as_slice() {
            [Instruction::NumericLiteral { value, .. }] => Some(*value),
            _ => None,
        }
    }

    /// Evaluates the expression against variable bindings.
    ///
    /// Constants registered at parse time shadow bindings of the same name.
    ///
    /// # Errors
    /// - [`EvalError::UnboundVariable`] when a variable has neither a
    ///   binding nor a matching constant.
    /// - [`EvalError::DivisionByZero`] or [`EvalError::InvalidArgument`]
    ///   when a native callable rejects its operands.
    ///
    /// # Panics
    /// Panics when the instruction sequence does not reduce to exactly one
    /// value. Compilation guarantees it does; a violation is a defect, not
    /// an input error.
    ///
    /// # Example
    /// ```
    /// use std::collections::HashMap;
    /// use numexpr::{value::Number, Parser};
    ///
    /// let expression = Parser::new().parse("2 * x + 1").unwrap();
    /// let bindings = HashMap::from([("x".to_string(), Number::Integer(3))]);
    /// assert_eq!(expression.evaluate(&bindings), Ok(Number::Integer(7)));
    /// ```
    pub fn evaluate(&self, bindings: &HashMap<String, Number>) -> Result<Number, EvalError> {
        let mut stack: Vec<Number> = Vec::with_capacity(self.instructions.len());
        for instruction in &self.instructions {
            match instruction {
                Instruction::NumericLiteral { value, .. } => stack.push(*value),
                Instruction::Variable { name, span } => {
                    let value = self.constants
                                    .get(name)
                                    .or_else(|| bindings.get(name).copied())
                                    .ok_or_else(|| EvalError::UnboundVariable { name: name.clone(),
                                                                                span: *span })?;
                    stack.push(value);
                },
                Instruction::FunctionCall { arity, closure, span, .. } => {
                    assert!(stack.len() >= *arity,
                            "evaluation stack underflow at {span}: the instruction sequence is malformed");
                    let arguments = stack.split_off(stack.len() - arity);
                    let value =
                        closure(&arguments).map_err(|error| EvalError::from_math(error, *span))?;
                    stack.push(value);
                },
            }
        }
        assert_eq!(stack.len(),
                   1,
                   "evaluation left {} values on the stack instead of one",
                   stack.len());
        Ok(stack[0])
    }
}
