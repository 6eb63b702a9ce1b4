/// Binary operator registry.
///
/// Maps infix symbols to precedence, associativity, commutativity,
/// determinism, and a native implementation. The parser's binary-grouping
/// pass walks the registry's precedence levels from tightest to loosest.
pub mod binary;
/// Constant registry.
///
/// Maps identifier names to fixed numeric values. Constants are folded into
/// literals at compile time and shadow variable bindings at evaluation time.
pub mod constant;
/// Function registry.
///
/// Maps call names to parameter lists (with optional per-slot defaults),
/// variadic and determinism flags, and a native implementation.
pub mod function;
/// Unary operator registry.
///
/// Maps prefix symbols to their native implementations. Unary operators bind
/// tighter than every binary operator and compile to first-class arity-1
/// call instructions.
pub mod unary;

pub use binary::{Associativity, BinaryOperator, BinaryOperatorRegistry};
pub use constant::ConstantRegistry;
pub use function::{Function, FunctionRegistry, NativeFn};
pub use unary::{UnaryOperator, UnaryOperatorRegistry};
