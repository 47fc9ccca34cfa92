// Service registry and application context
//
// The registry is filled once in main() and turned into a typed AppContext,
// which is what the router receives. Nothing here is global.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use offload_core::CalculatorService;
use offload_worker::WorkerPool;
use thiserror::Error;

/// Registry name of the calculator service
pub const CALCULATOR_SERVICE: &str = "CalculatorService";

/// Registry name of the worker pool
pub const WORKER_POOL: &str = "WorkerPool";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Dependency {0} not found")]
    NotFound(String),

    #[error("Dependency {name} is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },
}

/// Name -> instance map, one instance per name
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance, replacing any previous one with the same name
    pub fn register<T: Any + Send + Sync>(&mut self, name: impl Into<String>, service: T) {
        let name = name.into();
        tracing::debug!(service = %name, "Registered dependency");
        self.services.insert(name, Arc::new(service));
    }

    /// Resolve an instance by name
    pub fn resolve<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, RegistryError> {
        let service = self
            .services
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        service
            .downcast::<T>()
            .map_err(|_| RegistryError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }
}

/// Everything the HTTP handlers need, resolved once at startup
#[derive(Clone)]
pub struct AppContext {
    pub calculator: Arc<CalculatorService>,
    pub pool: Arc<WorkerPool>,
}

impl AppContext {
    pub fn from_registry(registry: &ServiceRegistry) -> Result<Self, RegistryError> {
        Ok(Self {
            calculator: registry.resolve(CALCULATOR_SERVICE)?,
            pool: registry.resolve(WORKER_POOL)?,
        })
    }
}
