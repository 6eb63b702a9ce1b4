use std::collections::HashMap;

use crate::{
    error::RegistryError,
    registry::function::NativeFn,
    value::{MathResult, Number},
};

/// A registered prefix operator.
///
/// Unary operators bind tighter than every binary operator and compile to
/// first-class arity-1 call instructions; the optimizer's constant-folding
/// pass can collapse them over literal operands.
#[derive(Clone)]
pub struct UnaryOperator {
    symbol:        String,
    deterministic: bool,
    closure:       NativeFn,
}

impl UnaryOperator {
    /// Creates an operator entry from a single-operand implementation.
    pub fn new(symbol: &str,
               deterministic: bool,
               apply: impl Fn(Number) -> MathResult<Number> + Send + Sync + 'static)
               -> Self {
        Self { symbol: symbol.to_string(),
               deterministic,
               closure: std::sync::Arc::new(move |args: &[Number]| apply(args[0])) }
    }

    /// Returns the operator symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns `true` when identical inputs always produce identical output.
    #[must_use]
    pub const fn deterministic(&self) -> bool {
        self.deterministic
    }

    /// Returns a handle to the native implementation.
    #[must_use]
    pub fn closure(&self) -> NativeFn {
        std::sync::Arc::clone(&self.closure)
    }
}

impl std::fmt::Debug for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnaryOperator")
         .field("symbol", &self.symbol)
         .field("deterministic", &self.deterministic)
         .finish_non_exhaustive()
    }
}

/// Holds every prefix operator known to a parser.
#[derive(Debug, Clone, Default)]
pub struct UnaryOperatorRegistry {
    by_symbol: HashMap<String, UnaryOperator>,
}

impl UnaryOperatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the default prefix operators: `-` (negation),
    /// `+` (identity) and `!` (logical not, producing `0` or `1`).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults = vec![
            UnaryOperator::new("-", true, |value| Ok(value.neg())),
            UnaryOperator::new("+", true, Ok),
            UnaryOperator::new("!", true, |value| Ok(value.not())),
        ];
        for operator in defaults {
            // Fresh registry and a curated table; duplicates are impossible.
            let registered = registry.register(operator);
            debug_assert!(registered.is_ok());
        }
        registry
    }

    /// Registers an operator.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateOperator`] when the symbol is taken.
    pub fn register(&mut self, operator: UnaryOperator) -> Result<(), RegistryError> {
        if self.by_symbol.contains_key(operator.symbol()) {
            return Err(RegistryError::DuplicateOperator { symbol: operator.symbol().to_string() });
        }
        self.by_symbol.insert(operator.symbol().to_string(), operator);
        Ok(())
    }

    /// Looks an operator up by symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&UnaryOperator> {
        self.by_symbol.get(symbol)
    }

    /// Returns all registered symbols, longest first, for greedy matching.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.by_symbol.keys().cloned().collect();
        symbols.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_and_not_behave() {
        let registry = UnaryOperatorRegistry::with_defaults();
        let negate = registry.get("-").unwrap().closure();
        assert_eq!(negate(&[Number::Integer(3)]).unwrap(), Number::Integer(-3));
        let not = registry.get("!").unwrap().closure();
        assert_eq!(not(&[Number::Integer(0)]).unwrap(), Number::Integer(1));
        assert_eq!(not(&[Number::Real(2.5)]).unwrap(), Number::Integer(0));
    }
}
