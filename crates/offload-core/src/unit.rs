//! Computation unit contract
//!
//! A unit is a pure function run in isolation: one input in, one output or a
//! failure out. Units are written against typed inputs and outputs and erased
//! to JSON payloads so the pool can carry them over a task channel.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TaskError, UnitError};

/// A unit of work that can be offloaded to a worker
///
/// # Example
///
/// ```
/// use offload_core::{ComputationUnit, UnitError};
///
/// struct Double;
///
/// impl ComputationUnit for Double {
///     const NAME: &'static str = "double";
///     type Input = i64;
///     type Output = i64;
///
///     fn compute(&self, input: i64) -> Result<i64, UnitError> {
///         input
///             .checked_mul(2)
///             .ok_or_else(|| UnitError::new("overflow"))
///     }
/// }
/// ```
pub trait ComputationUnit: Send + Sync + 'static {
    /// Name used to look the unit up in the registry
    const NAME: &'static str;

    /// Input type. Decoding a payload into it is the unit's validation.
    type Input: DeserializeOwned + Send;

    /// Output type
    type Output: Serialize;

    /// Reject decoded inputs the unit will not run. Called at dispatch,
    /// before a thread is spawned.
    fn validate(&self, _input: &Self::Input) -> Result<(), UnitError> {
        Ok(())
    }

    /// Run the computation. Called on the unit's own thread.
    fn compute(&self, input: Self::Input) -> Result<Self::Output, UnitError>;
}

/// Type-erased unit interface used by the registry and the pool
pub trait AnyUnit: Send + Sync {
    /// Registered name
    fn name(&self) -> &'static str;

    /// Check that a payload decodes into the unit's input type and passes
    /// the unit's own checks
    fn validate(&self, payload: &Value) -> Result<(), TaskError>;

    /// Decode, compute, encode
    fn invoke(&self, payload: Value) -> Result<Value, UnitError>;
}

struct UnitWrapper<U: ComputationUnit> {
    inner: U,
}

impl<U: ComputationUnit> AnyUnit for UnitWrapper<U> {
    fn name(&self) -> &'static str {
        U::NAME
    }

    fn validate(&self, payload: &Value) -> Result<(), TaskError> {
        let input = <U::Input as Deserialize>::deserialize(payload)
            .map_err(|e| TaskError::invalid_input(format!("{}: {}", U::NAME, e)))?;
        self.inner
            .validate(&input)
            .map_err(|e| TaskError::invalid_input(format!("{}: {}", U::NAME, e)))
    }

    fn invoke(&self, payload: Value) -> Result<Value, UnitError> {
        let input: U::Input = serde_json::from_value(payload)?;
        self.inner.validate(&input)?;
        let output = self.inner.compute(input)?;
        Ok(serde_json::to_value(output)?)
    }
}

/// Erase a typed unit so it can be stored next to units of other types
pub fn erase<U: ComputationUnit>(unit: U) -> Arc<dyn AnyUnit> {
    Arc::new(UnitWrapper { inner: unit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Halve;

    impl ComputationUnit for Halve {
        const NAME: &'static str = "halve";
        type Input = u32;
        type Output = f64;

        fn validate(&self, input: &u32) -> Result<(), UnitError> {
            if *input > 1_000 {
                return Err(UnitError::new("too large"));
            }
            Ok(())
        }

        fn compute(&self, input: u32) -> Result<f64, UnitError> {
            if input == 7 {
                return Err(UnitError::new("seven is unlucky"));
            }
            Ok(f64::from(input) / 2.0)
        }
    }

    #[test]
    fn test_erased_name() {
        assert_eq!(erase(Halve).name(), "halve");
    }

    #[test]
    fn test_validate_accepts_matching_payload() {
        assert!(erase(Halve).validate(&json!(4)).is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_shape() {
        let unit = erase(Halve);
        for bad in [json!(-1), json!("4"), json!(null), json!(1.5), json!({"n": 4})] {
            let err = unit.validate(&bad).unwrap_err();
            assert!(err.is_validation(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_validate_applies_unit_checks() {
        let unit = erase(Halve);
        assert!(unit.validate(&json!(1_000)).is_ok());

        let err = unit.validate(&json!(1_001)).unwrap_err();
        assert_eq!(err, TaskError::invalid_input("halve: too large"));
        assert_eq!(unit.invoke(json!(1_001)).unwrap_err().message, "too large");
    }

    #[test]
    fn test_invoke_encodes_output() {
        assert_eq!(erase(Halve).invoke(json!(5)).unwrap(), json!(2.5));
    }

    #[test]
    fn test_invoke_propagates_unit_error() {
        let err = erase(Halve).invoke(json!(7)).unwrap_err();
        assert_eq!(err.message, "seven is unlucky");
    }
}
