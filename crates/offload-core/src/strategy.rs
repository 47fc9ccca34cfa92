// Arithmetic strategies
//
// A closed set of binary operations selected by key. Parsing goes through an
// explicit match rather than a name -> type lookup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Errors raised by the calculator and its strategies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    /// An operand was missing, not a number, or not finite
    #[error("Both arguments must be numbers")]
    InvalidOperands,

    /// The requested strategy key is not known
    #[error("Invalid operation: {0}")]
    UnknownStrategy(String),

    /// Neither the request nor the service named a strategy
    #[error("No strategy set")]
    NoStrategy,
}

/// Binary arithmetic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ArithmeticStrategy {
    Sum,
    Multiply,
}

impl ArithmeticStrategy {
    /// Every strategy, in a stable order
    pub const ALL: [ArithmeticStrategy; 2] = [ArithmeticStrategy::Sum, ArithmeticStrategy::Multiply];

    /// Apply the operation. Fails when either operand is not a finite number.
    pub fn execute(&self, a: f64, b: f64) -> Result<f64, CalculationError> {
        if !a.is_finite() || !b.is_finite() {
            return Err(CalculationError::InvalidOperands);
        }

        Ok(match self {
            ArithmeticStrategy::Sum => a + b,
            ArithmeticStrategy::Multiply => a * b,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticStrategy::Sum => "sum",
            ArithmeticStrategy::Multiply => "multiply",
        }
    }
}

impl std::fmt::Display for ArithmeticStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ArithmeticStrategy {
    type Err = CalculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(ArithmeticStrategy::Sum),
            "multiply" => Ok(ArithmeticStrategy::Multiply),
            other => Err(CalculationError::UnknownStrategy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum() {
        assert_eq!(ArithmeticStrategy::Sum.execute(2.0, 4.0).unwrap(), 6.0);
        assert_eq!(ArithmeticStrategy::Sum.execute(-1.5, 0.5).unwrap(), -1.0);
    }

    #[test]
    fn test_multiply() {
        assert_eq!(ArithmeticStrategy::Multiply.execute(3.0, 4.0).unwrap(), 12.0);
        assert_eq!(ArithmeticStrategy::Multiply.execute(0.0, 9.0).unwrap(), 0.0);
    }

    #[test]
    fn test_rejects_non_finite() {
        for strategy in ArithmeticStrategy::ALL {
            assert_eq!(
                strategy.execute(f64::NAN, 1.0),
                Err(CalculationError::InvalidOperands)
            );
            assert_eq!(
                strategy.execute(1.0, f64::INFINITY),
                Err(CalculationError::InvalidOperands)
            );
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("sum".parse::<ArithmeticStrategy>().unwrap(), ArithmeticStrategy::Sum);
        assert_eq!(
            "multiply".parse::<ArithmeticStrategy>().unwrap(),
            ArithmeticStrategy::Multiply
        );
        assert_eq!(
            "divide".parse::<ArithmeticStrategy>(),
            Err(CalculationError::UnknownStrategy("divide".into()))
        );
    }

    #[test]
    fn test_display_matches_parse() {
        for strategy in ArithmeticStrategy::ALL {
            assert_eq!(strategy.to_string().parse::<ArithmeticStrategy>().unwrap(), strategy);
        }
    }
}
