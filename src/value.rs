use crate::error::MathError;

/// Result type used by native operator and function implementations.
///
/// Native callables know nothing about source positions; the evaluator and
/// the optimizer attach a [`crate::token::Span`] when surfacing a failure.
pub type MathResult<T> = Result<T, MathError>;

/// A numeric value flowing through compilation and evaluation.
///
/// Expressions operate on two numeric types only: 64-bit signed integers and
/// 64-bit floats. Integer arithmetic is checked; an operation that would
/// overflow is retried in floating point instead of wrapping. Division keeps
/// integers integral only when the division is exact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// A 64-bit signed integer value.
    Integer(i64),
    /// A 64-bit floating-point value.
    Real(f64),
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
        }
    }
}

impl Number {
    /// Returns the value as an `f64`, converting integers as needed.
    ///
    /// # Example
    /// ```
    /// use numexpr::value::Number;
    ///
    /// assert_eq!(Number::Integer(3).as_real(), 3.0);
    /// assert_eq!(Number::Real(0.5).as_real(), 0.5);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_real(self) -> f64 {
        match self {
            Self::Integer(value) => value as f64,
            Self::Real(value) => value,
        }
    }

    /// Returns `true` when the value compares equal to zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        match self {
            Self::Integer(value) => value == 0,
            Self::Real(value) => value == 0.0,
        }
    }

    /// Adds two numbers, promoting to `Real` on integer overflow.
    ///
    /// # Example
    /// ```
    /// use numexpr::value::Number;
    ///
    /// assert_eq!(Number::Integer(2).add(Number::Integer(3)), Number::Integer(5));
    /// assert_eq!(Number::Integer(2).add(Number::Real(0.5)), Number::Real(2.5));
    /// ```
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        if let (Self::Integer(a), Self::Integer(b)) = (self, other) {
            if let Some(sum) = a.checked_add(b) {
                return Self::Integer(sum);
            }
        }
        Self::Real(self.as_real() + other.as_real())
    }

    /// Subtracts `other` from `self`, promoting to `Real` on overflow.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        if let (Self::Integer(a), Self::Integer(b)) = (self, other) {
            if let Some(difference) = a.checked_sub(b) {
                return Self::Integer(difference);
            }
        }
        Self::Real(self.as_real() - other.as_real())
    }

    /// Multiplies two numbers, promoting to `Real` on overflow.
    #[must_use]
    pub fn mul(self, other: Self) -> Self {
        if let (Self::Integer(a), Self::Integer(b)) = (self, other) {
            if let Some(product) = a.checked_mul(b) {
                return Self::Integer(product);
            }
        }
        Self::Real(self.as_real() * other.as_real())
    }

    /// Divides `self` by `other`.
    ///
    /// An exact integer division stays integral; any other combination
    /// produces a `Real`. Dividing by zero (of either type) fails.
    ///
    /// # Errors
    /// Returns [`MathError::DivisionByZero`] when `other` is zero.
    ///
    /// # Example
    /// ```
    /// use numexpr::value::Number;
    ///
    /// assert_eq!(Number::Integer(10).div(Number::Integer(2)), Ok(Number::Integer(5)));
    /// assert_eq!(Number::Integer(7).div(Number::Integer(2)), Ok(Number::Real(3.5)));
    /// assert!(Number::Integer(1).div(Number::Integer(0)).is_err());
    /// ```
    pub fn div(self, other: Self) -> MathResult<Self> {
        if other.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        if let (Self::Integer(a), Self::Integer(b)) = (self, other) {
            // checked_rem: i64::MIN / -1 overflows and must promote.
            if let (Some(quotient), Some(0)) = (a.checked_div(b), a.checked_rem(b)) {
                return Ok(Self::Integer(quotient));
            }
        }
        Ok(Self::Real(self.as_real() / other.as_real()))
    }

    /// Computes the remainder of `self` divided by `other`.
    ///
    /// # Errors
    /// Returns [`MathError::DivisionByZero`] when `other` is zero.
    pub fn rem(self, other: Self) -> MathResult<Self> {
        if other.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        if let (Self::Integer(a), Self::Integer(b)) = (self, other) {
            return Ok(Self::Integer(a.wrapping_rem(b)));
        }
        Ok(Self::Real(self.as_real() % other.as_real()))
    }

    /// Raises `self` to the power `other`.
    ///
    /// Integer bases with small non-negative integer exponents stay integral
    /// when the result fits; everything else goes through `f64::powf`.
    ///
    /// # Example
    /// ```
    /// use numexpr::value::Number;
    ///
    /// assert_eq!(Number::Integer(2).pow(Number::Integer(10)), Number::Integer(1024));
    /// assert_eq!(Number::Integer(4).pow(Number::Real(0.5)), Number::Real(2.0));
    /// ```
    #[must_use]
    pub fn pow(self, other: Self) -> Self {
        if let (Self::Integer(base), Self::Integer(exponent)) = (self, other) {
            if let Ok(exponent) = u32::try_from(exponent) {
                if let Some(power) = base.checked_pow(exponent) {
                    return Self::Integer(power);
                }
            }
        }
        Self::Real(self.as_real().powf(other.as_real()))
    }

    /// Negates the value.
    #[must_use]
    pub fn neg(self) -> Self {
        match self {
            Self::Integer(value) => value.checked_neg()
                                         .map_or(Self::Real(-(value as f64)), Self::Integer),
            Self::Real(value) => Self::Real(-value),
        }
    }

    /// Logical negation: zero becomes `1`, anything else becomes `0`.
    #[must_use]
    pub fn not(self) -> Self {
        Self::Integer(i64::from(self.is_zero()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(Number::Integer(2).add(Number::Integer(3)), Number::Integer(5));
        assert_eq!(Number::Integer(10).div(Number::Integer(2)), Ok(Number::Integer(5)));
        assert_eq!(Number::Integer(2).pow(Number::Integer(9)), Number::Integer(512));
    }

    #[test]
    fn overflow_promotes_to_real() {
        let result = Number::Integer(i64::MAX).add(Number::Integer(1));
        assert!(matches!(result, Number::Real(_)));
        let result = Number::Integer(i64::MIN).neg();
        assert!(matches!(result, Number::Real(_)));
    }

    #[test]
    fn minimum_integer_division_promotes_to_real() {
        let result = Number::Integer(i64::MIN).div(Number::Integer(-1));
        assert_eq!(result, Ok(Number::Real(9.223_372_036_854_776e18)));
    }

    #[test]
    fn division_by_zero_fails_for_both_types() {
        assert_eq!(Number::Integer(1).div(Number::Integer(0)), Err(MathError::DivisionByZero));
        assert_eq!(Number::Real(1.0).div(Number::Real(0.0)), Err(MathError::DivisionByZero));
        assert_eq!(Number::Integer(5).rem(Number::Integer(0)), Err(MathError::DivisionByZero));
    }

    #[test]
    fn mixed_operands_promote() {
        assert_eq!(Number::Integer(1).add(Number::Real(0.5)), Number::Real(1.5));
        assert_eq!(Number::Integer(3).mul(Number::Real(2.0)), Number::Real(6.0));
    }
}
