#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents a rejected attempt to extend a registry.
///
/// Registries are populated at construction time and never mutated while a
/// parse or evaluation is in flight; redefinition is always an error rather
/// than a silent overwrite.
pub enum RegistryError {
    /// An operator with this symbol is already registered.
    DuplicateOperator {
        /// The conflicting symbol.
        symbol: String,
    },
    /// A function with this name is already registered.
    DuplicateFunction {
        /// The conflicting name.
        name: String,
    },
    /// A constant with this name is already registered.
    DuplicateConstant {
        /// The conflicting name.
        name: String,
    },
    /// An operator was registered at a precedence level whose existing
    /// operators have a different associativity.
    AssociativityConflict {
        /// The precedence level in question.
        precedence: u8,
    },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateOperator { symbol } => {
                write!(f, "Operator '{symbol}' is already registered.")
            },
            Self::DuplicateFunction { name } => {
                write!(f, "Function '{name}' is already registered.")
            },
            Self::DuplicateConstant { name } => {
                write!(f, "Constant '{name}' is already registered.")
            },
            Self::AssociativityConflict { precedence } => {
                write!(f,
                       "Operators at precedence {precedence} must share one associativity.")
            },
        }
    }
}

impl std::error::Error for RegistryError {}
