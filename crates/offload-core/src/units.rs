// Built-in computation units

use crate::error::UnitError;
use crate::unit::ComputationUnit;

/// Sum of square roots of every integer in `0..count`
///
/// Deliberately CPU-bound; this is the work the HTTP layer offloads.
/// Counts above `max_count` are rejected at dispatch so a single request
/// cannot pin a worker thread indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqrtSumUnit {
    max_count: u64,
}

impl SqrtSumUnit {
    pub const NAME: &'static str = "sqrt-sum";

    /// Largest count accepted by default
    pub const DEFAULT_MAX_COUNT: u64 = 1_000_000_000;

    pub fn new(max_count: u64) -> Self {
        Self { max_count }
    }

    pub fn max_count(&self) -> u64 {
        self.max_count
    }
}

impl Default for SqrtSumUnit {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_COUNT)
    }
}

impl ComputationUnit for SqrtSumUnit {
    const NAME: &'static str = SqrtSumUnit::NAME;
    // u64 rejects negatives, fractions and non-numbers at dispatch
    type Input = u64;
    type Output = f64;

    fn validate(&self, count: &u64) -> Result<(), UnitError> {
        if *count > self.max_count {
            return Err(UnitError::new(format!(
                "count {} exceeds the maximum of {}",
                count, self.max_count
            )));
        }
        Ok(())
    }

    fn compute(&self, count: u64) -> Result<f64, UnitError> {
        let mut result = 0.0_f64;
        for i in 0..count {
            result += (i as f64).sqrt();
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_count() {
        assert_eq!(SqrtSumUnit::default().compute(0).unwrap(), 0.0);
    }

    #[test]
    fn test_five() {
        let result = SqrtSumUnit::default().compute(5).unwrap();
        let expected = 0.0 + 1.0 + 2f64.sqrt() + 3f64.sqrt() + 2.0;
        assert!((result - expected).abs() < 1e-12);
        assert!((result - 6.146).abs() < 1e-3);
    }

    #[test]
    fn test_one() {
        let unit = SqrtSumUnit::default();
        assert_eq!(unit.compute(1).unwrap(), 0.0);
        assert_eq!(unit.compute(2).unwrap(), 1.0);
    }

    #[test]
    fn test_count_bound() {
        let unit = SqrtSumUnit::new(100);
        assert!(unit.validate(&100).is_ok());

        let err = unit.validate(&101).unwrap_err();
        assert_eq!(err.message, "count 101 exceeds the maximum of 100");
        assert!(SqrtSumUnit::default().validate(&u64::MAX).is_err());
    }
}
