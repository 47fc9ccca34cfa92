// Calculator service
//
// Stateless apart from an optional default strategy, so one instance can be
// shared by every request without a per-request setter.

use serde_json::Value;

use crate::strategy::{ArithmeticStrategy, CalculationError};

/// Applies arithmetic strategies synchronously
#[derive(Debug, Clone, Default)]
pub struct CalculatorService {
    default_strategy: Option<ArithmeticStrategy>,
}

impl CalculatorService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy used when a request does not name one
    pub fn with_default_strategy(mut self, strategy: ArithmeticStrategy) -> Self {
        self.default_strategy = Some(strategy);
        self
    }

    pub fn default_strategy(&self) -> Option<ArithmeticStrategy> {
        self.default_strategy
    }

    /// Run `strategy` (or the default) on the two operands
    pub fn calculate(
        &self,
        strategy: Option<ArithmeticStrategy>,
        a: f64,
        b: f64,
    ) -> Result<f64, CalculationError> {
        let strategy = strategy
            .or(self.default_strategy)
            .ok_or(CalculationError::NoStrategy)?;

        let result = strategy.execute(a, b)?;
        tracing::debug!(%strategy, a, b, result, "Calculation completed");
        Ok(result)
    }
}

/// Read a JSON value as an arithmetic operand
pub fn parse_operand(value: &Value) -> Result<f64, CalculationError> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or(CalculationError::InvalidOperands)
}
