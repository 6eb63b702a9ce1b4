use std::collections::{BTreeMap, HashMap};

use crate::{
    error::RegistryError,
    registry::function::NativeFn,
    value::{MathResult, Number},
};

/// Tie-break direction for chained operators of equal precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `a - b - c` groups as `(a - b) - c`.
    Left,
    /// `a ** b ** c` groups as `a ** (b ** c)`.
    Right,
}

/// A registered infix operator.
///
/// Binary operators compile to the same arity-2 call instructions as
/// functions; the extra metadata here (precedence, associativity,
/// commutativity) steers the tree builder and the optimizer.
#[derive(Clone)]
pub struct BinaryOperator {
    symbol:        String,
    precedence:    u8,
    associativity: Associativity,
    commutative:   bool,
    deterministic: bool,
    closure:       NativeFn,
}

impl BinaryOperator {
    /// Creates an operator entry.
    ///
    /// # Parameters
    /// - `symbol`: The infix symbol as written in source.
    /// - `precedence`: Binding strength; larger values bind tighter.
    /// - `associativity`: Grouping direction for equal-precedence chains.
    /// - `commutative`: Whether operand order is irrelevant.
    /// - `deterministic`: Whether identical inputs always produce identical
    ///   output.
    /// - `apply`: The native implementation over `(left, right)`.
    pub fn new(symbol: &str,
               precedence: u8,
               associativity: Associativity,
               commutative: bool,
               deterministic: bool,
               apply: impl Fn(Number, Number) -> MathResult<Number> + Send + Sync + 'static)
               -> Self {
        Self { symbol: symbol.to_string(),
               precedence,
               associativity,
               commutative,
               deterministic,
               closure: std::sync::Arc::new(move |args: &[Number]| apply(args[0], args[1])) }
    }

    /// Returns the operator symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the binding strength; larger values bind tighter.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        self.precedence
    }

    /// Returns the grouping direction for equal-precedence chains.
    #[must_use]
    pub const fn associativity(&self) -> Associativity {
        self.associativity
    }

    /// Returns `true` when operand order is irrelevant.
    #[must_use]
    pub const fn commutative(&self) -> bool {
        self.commutative
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

impl std::fmt::Debug for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryOperator")
         .field("symbol", &self.symbol)
         .field("precedence", &self.precedence)
         .field("associativity", &self.associativity)
         .field("commutative", &self.commutative)
         .field("deterministic", &self.deterministic)
         .finish_non_exhaustive()
    }
}

/// Holds every infix operator known to a parser.
#[derive(Debug, Clone, Default)]
pub struct BinaryOperatorRegistry {
    by_symbol: HashMap<String, BinaryOperator>,
}

impl BinaryOperatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the conventional arithmetic table:
    ///
    /// | symbol      | precedence | associativity | commutative |
    /// |-------------|------------|---------------|-------------|
    /// | `**`, `^`   | 4          | right         | no          |
    /// | `*`         | 3          | left          | yes         |
    /// | `/`, `%`    | 3          | left          | no          |
    /// | `+`         | 2          | left          | yes         |
    /// | `-`         | 2          | left          | no          |
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults = vec![
            BinaryOperator::new("**", 4, Associativity::Right, false, true, |l, r| Ok(l.pow(r))),
            BinaryOperator::new("^", 4, Associativity::Right, false, true, |l, r| Ok(l.pow(r))),
            BinaryOperator::new("*", 3, Associativity::Left, true, true, |l, r| Ok(l.mul(r))),
            BinaryOperator::new("/", 3, Associativity::Left, false, true, Number::div),
            BinaryOperator::new("%", 3, Associativity::Left, false, true, Number::rem),
            BinaryOperator::new("+", 2, Associativity::Left, true, true, |l, r| Ok(l.add(r))),
            BinaryOperator::new("-", 2, Associativity::Left, false, true, |l, r| Ok(l.sub(r))),
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
    /// - [`RegistryError::DuplicateOperator`] when the symbol is taken.
    /// - [`RegistryError::AssociativityConflict`] when operators already
    ///   registered at the same precedence use a different associativity.
    pub fn register(&mut self, operator: BinaryOperator) -> Result<(), RegistryError> {
        if self.by_symbol.contains_key(operator.symbol()) {
            return Err(RegistryError::DuplicateOperator { symbol: operator.symbol().to_string() });
        }
        let conflicting = self.by_symbol
                              .values()
                              .any(|existing| {
                                  existing.precedence() == operator.precedence()
                                  && existing.associativity() != operator.associativity()
                              });
        if conflicting {
            return Err(RegistryError::AssociativityConflict { precedence: operator.precedence() });
        }
        self.by_symbol.insert(operator.symbol().to_string(), operator);
        Ok(())
    }

    /// Looks an operator up by symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&BinaryOperator> {
        self.by_symbol.get(symbol)
    }

    /// Returns all registered symbols, longest first, so scanners can match
    /// greedily (`**` before `*`).
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.by_symbol.keys().cloned().collect();
        symbols.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        symbols
    }

    /// Returns the registered operators grouped by precedence level,
    /// tightest-binding level first.
    ///
    /// Each level shares one associativity (enforced at registration).
    #[must_use]
    pub fn by_precedence(&self) -> Vec<(Associativity, Vec<&BinaryOperator>)> {
        let mut levels: BTreeMap<u8, Vec<&BinaryOperator>> = BTreeMap::new();
        for operator in self.by_symbol.values() {
            levels.entry(operator.precedence()).or_default().push(operator);
        }
        levels.into_iter()
              .rev()
              .map(|(_, operators)| (operators[0].associativity(), operators))
              .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_orders_levels_tightest_first() {
        let registry = BinaryOperatorRegistry::with_defaults();
        let levels = registry.by_precedence();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0].0, Associativity::Right);
        assert!(levels[0].1.iter().any(|op| op.symbol() == "**"));
        assert!(levels[2].1.iter().any(|op| op.symbol() == "+"));
    }

    #[test]
    fn symbols_are_longest_first() {
        let registry = BinaryOperatorRegistry::with_defaults();
        let symbols = registry.symbols();
        let star_star = symbols.iter().position(|s| s == "**").unwrap();
        let star = symbols.iter().position(|s| s == "*").unwrap();
        assert!(star_star < star);
    }

    #[test]
    fn mixed_associativity_at_one_level_is_rejected() {
        let mut registry = BinaryOperatorRegistry::with_defaults();
        let clash = BinaryOperator::new("@", 3, Associativity::Right, false, true, |l, _| Ok(l));
        assert_eq!(registry.register(clash),
                   Err(RegistryError::AssociativityConflict { precedence: 3 }));
    }

    #[test]
    fn duplicate_symbol_is_rejected() {
        let mut registry = BinaryOperatorRegistry::with_defaults();
        let clash = BinaryOperator::new("+", 2, Associativity::Left, true, true, |l, _| Ok(l));
        assert!(matches!(registry.register(clash),
                         Err(RegistryError::DuplicateOperator { .. })));
    }
}
