// Unit registry
// Decision: Builder pattern for fluent registration API
// Decision: with_defaults() registers the built-in SqrtSumUnit
// Decision: Immutable once handed to the pool, so lookups need no locking

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::TaskError;
use crate::unit::{erase, AnyUnit, ComputationUnit};
use crate::units::SqrtSumUnit;

/// Registry that maps unit names to erased units.
///
/// # Example
///
/// ```
/// use offload_core::{SqrtSumUnit, UnitRegistry};
///
/// let registry = UnitRegistry::builder().unit(SqrtSumUnit::default()).build();
/// assert!(registry.has("sqrt-sum"));
/// ```
pub struct UnitRegistry {
    units: HashMap<&'static str, Arc<dyn AnyUnit>>,
}

impl UnitRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
        }
    }

    /// Create a registry with the built-in units registered
    pub fn with_defaults() -> Self {
        Self::builder().unit(SqrtSumUnit::default()).build()
    }

    /// Register a unit under its `NAME`, replacing any previous one
    pub fn register<U: ComputationUnit>(&mut self, unit: U) {
        self.units.insert(U::NAME, erase(unit));
    }

    /// Look a unit up by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn AnyUnit>> {
        self.units.get(name).cloned()
    }

    /// Look a unit up by name, failing with `UnknownUnit`
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn AnyUnit>, TaskError> {
        self.get(name)
            .ok_or_else(|| TaskError::UnknownUnit(name.to_string()))
    }

    /// Check if a unit is registered
    pub fn has(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// Registered unit names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.units.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Create a builder for fluent registration
    pub fn builder() -> UnitRegistryBuilder {
        UnitRegistryBuilder::new()
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for UnitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitRegistry")
            .field("units", &self.names())
            .finish()
    }
}

/// Builder for creating a UnitRegistry with a fluent API.
pub struct UnitRegistryBuilder {
    registry: UnitRegistry,
}

impl UnitRegistryBuilder {
    pub fn new() -> Self {
        Self {
            registry: UnitRegistry::new(),
        }
    }

    /// Register a unit
    pub fn unit<U: ComputationUnit>(mut self, unit: U) -> Self {
        self.registry.register(unit);
        self
    }

    pub fn build(self) -> UnitRegistry {
        self.registry
    }
}

impl Default for UnitRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnitError;

    struct Echo;

    impl ComputationUnit for Echo {
        const NAME: &'static str = "echo";
        type Input = serde_json::Value;
        type Output = serde_json::Value;

        fn compute(&self, input: serde_json::Value) -> Result<serde_json::Value, UnitError> {
            Ok(input)
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = UnitRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = UnitRegistry::with_defaults();
        assert!(registry.has("sqrt-sum"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_default_impl() {
        assert!(UnitRegistry::default().has("sqrt-sum"));
    }

    #[test]
    fn test_registry_builder_and_names() {
        let registry = UnitRegistry::builder()
            .unit(SqrtSumUnit::default())
            .unit(Echo)
            .build();
        assert_eq!(registry.names(), vec!["echo", "sqrt-sum"]);
    }

    #[test]
    fn test_registry_resolve_unknown() {
        let registry = UnitRegistry::with_defaults();
        let err = registry.resolve("fibonacci").err().unwrap();
        assert_eq!(err, TaskError::UnknownUnit("fibonacci".into()));
    }

    #[test]
    fn test_registry_debug() {
        let debug_str = format!("{:?}", UnitRegistry::with_defaults());
        assert!(debug_str.contains("UnitRegistry"));
        assert!(debug_str.contains("sqrt-sum"));
    }
}
