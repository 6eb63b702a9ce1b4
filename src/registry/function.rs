use std::{collections::HashMap, sync::Arc};

use crate::{
    error::{MathError, RegistryError},
    value::{MathResult, Number},
};

/// The shape shared by every native implementation: operators and functions
/// alike receive their fully evaluated arguments as a slice and produce one
/// number.
///
/// Implementations must be safe to invoke concurrently; a compiled
/// [`crate::expression::Expression`] may be evaluated from several threads
/// at once.
pub type NativeFn = Arc<dyn Fn(&[Number]) -> MathResult<Number> + Send + Sync>;

/// A registered function.
///
/// `parameters` holds one slot per declared parameter; a `Some` slot carries
/// the default substituted when the caller omits that argument. Variadic
/// functions accept any number of arguments beyond their declared slots.
#[derive(Clone)]
pub struct Function {
    name:          String,
    parameters:    Vec<Option<Number>>,
    variadic:      bool,
    deterministic: bool,
    closure:       NativeFn,
}

impl Function {
    /// Creates a function entry.
    ///
    /// # Parameters
    /// - `name`: The name callers use.
    /// - `parameters`: One `Option<Number>` per declared parameter; `Some`
    ///   values are defaults for omitted arguments.
    /// - `variadic`: Whether extra trailing arguments are accepted.
    /// - `deterministic`: Whether identical inputs always produce identical
    ///   output; non-deterministic functions are never folded or cancelled
    ///   by the optimizer.
    /// - `closure`: The native implementation.
    pub fn new(name: &str,
               parameters: Vec<Option<Number>>,
               variadic: bool,
               deterministic: bool,
               closure: impl Fn(&[Number]) -> MathResult<Number> + Send + Sync + 'static)
               -> Self {
        Self { name: name.to_string(),
               parameters,
               variadic,
               deterministic,
               closure: Arc::new(closure) }
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared parameter slots with their optional defaults.
    #[must_use]
    pub fn parameters(&self) -> &[Option<Number>] {
        &self.parameters
    }

    /// Returns `true` when the function accepts extra trailing arguments.
    #[must_use]
    pub const fn variadic(&self) -> bool {
        self.variadic
    }

    /// Returns `true` when identical inputs always produce identical output.
    #[must_use]
    pub const fn deterministic(&self) -> bool {
        self.deterministic
    }

    /// Returns a handle to the native implementation.
    #[must_use]
    pub fn closure(&self) -> NativeFn {
        Arc::clone(&self.closure)
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
         .field("name", &self.name)
         .field("parameters", &self.parameters)
         .field("variadic", &self.variadic)
         .field("deterministic", &self.deterministic)
         .finish_non_exhaustive()
    }
}

/// Holds every callable function known to a parser.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    by_name: HashMap<String, Function>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the standard mathematical
    /// functions: `abs`, `ceil`, `floor`, `sqrt`, `exp`, `sin`, `cos`,
    /// `tan`, `fmod`, `pow`, `round` (optional precision), `log` (optional
    /// base) and the variadic `min`/`max`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults = default_functions();
        for function in defaults {
            // Fresh registry and a curated list; duplicates are impossible.
            let registered = registry.register(function);
            debug_assert!(registered.is_ok());
        }
        registry
    }

    /// Registers a function.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateFunction`] when the name is taken.
    pub fn register(&mut self, function: Function) -> Result<(), RegistryError> {
        if self.by_name.contains_key(function.name()) {
            return Err(RegistryError::DuplicateFunction { name: function.name().to_string() });
        }
        self.by_name.insert(function.name().to_string(), function);
        Ok(())
    }

    /// Looks a function up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Function> {
        self.by_name.get(name)
    }
}

fn unary_real(name: &str, apply: fn(f64) -> f64) -> Function {
    Function::new(name, vec![None], false, true, move |args| {
        Ok(Number::Real(apply(args[0].as_real())))
    })
}

fn fold_extremum(args: &[Number], prefer_greater: bool) -> MathResult<Number> {
    let mut iter = args.iter().copied();
    let mut best = iter.next()
                       .ok_or_else(|| MathError::InvalidArgument { details: "at least one argument is required".to_string() })?;
    for candidate in iter {
        let replace = if prefer_greater {
            candidate.as_real() > best.as_real()
        } else {
            candidate.as_real() < best.as_real()
        };
        if replace {
            best = candidate;
        }
    }
    Ok(best)
}

#[allow(clippy::cast_possible_truncation)]
fn round_to_precision(value: Number, precision: Number) -> Number {
    let digits = precision.as_real() as i32;
    if digits >= 0 {
        if let Number::Integer(_) = value {
            return value;
        }
    }
    let factor = 10f64.powi(digits);
    Number::Real((value.as_real() * factor).round() / factor)
}

fn default_functions() -> Vec<Function> {
    vec![
        Function::new("abs", vec![None], false, true, |args| {
            Ok(match args[0] {
                Number::Integer(value) => value.checked_abs()
                                               .map_or(Number::Real(-(value as f64)), Number::Integer),
                Number::Real(value) => Number::Real(value.abs()),
            })
        }),
        Function::new("ceil", vec![None], false, true, |args| {
            Ok(match args[0] {
                Number::Integer(value) => Number::Integer(value),
                Number::Real(value) => Number::Real(value.ceil()),
            })
        }),
        Function::new("floor", vec![None], false, true, |args| {
            Ok(match args[0] {
                Number::Integer(value) => Number::Integer(value),
                Number::Real(value) => Number::Real(value.floor()),
            })
        }),
        unary_real("sqrt", f64::sqrt),
        unary_real("exp", f64::exp),
        unary_real("sin", f64::sin),
        unary_real("cos", f64::cos),
        unary_real("tan", f64::tan),
        Function::new("fmod", vec![None, None], false, true, |args| {
            if args[1].is_zero() {
                return Err(MathError::DivisionByZero);
            }
            Ok(Number::Real(args[0].as_real() % args[1].as_real()))
        }),
        Function::new("pow", vec![None, None], false, true, |args| Ok(args[0].pow(args[1]))),
        Function::new("round",
                      vec![None, Some(Number::Integer(0))],
                      false,
                      true,
                      |args| Ok(round_to_precision(args[0], args[1]))),
        Function::new("log",
                      vec![None, Some(Number::Real(std::f64::consts::E))],
                      false,
                      true,
                      |args| Ok(Number::Real(args[0].as_real().log(args[1].as_real())))),
        Function::new("min", vec![None], true, true, |args| fold_extremum(args, false)),
        Function::new("max", vec![None], true, true, |args| fold_extremum(args, true)),
    ]
}
