use std::collections::HashMap;

use crate::{error::RegistryError, value::Number};

/// Holds every named constant known to a parser.
///
/// Identifiers matching a constant compile straight to numeric literals, so
/// evaluation never pays a lookup for them; the compiled expression also
/// keeps a handle to this registry so that constants shadow variable
/// bindings of the same name.
#[derive(Debug, Clone, Default)]
pub struct ConstantRegistry {
    by_name: HashMap<String, Number>,
}

impl ConstantRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the default constants `pi`, `e` and `tau`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults = [("pi", std::f64::consts::PI),
                        ("e", std::f64::consts::E),
                        ("tau", std::f64::consts::TAU)];
        for (name, value) in defaults {
            // Fresh registry and a curated table; duplicates are impossible.
            let registered = registry.register(name, Number::Real(value));
            debug_assert!(registered.is_ok());
        }
        registry
    }

    /// Registers a constant.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateConstant`] when the name is taken.
    pub fn register(&mut self, name: &str, value: Number) -> Result<(), RegistryError> {
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateConstant { name: name.to_string() });
        }
        self.by_name.insert(name.to_string(), value);
        Ok(())
    }

    /// Looks a constant up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Number> {
        self.by_name.get(name).copied()
    }

    /// Returns `true` when a constant with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}
