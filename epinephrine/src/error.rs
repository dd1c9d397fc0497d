//! Error types for the DI container

use std::any::TypeId;
use thiserror::Error;

/// Result type alias for DI operations
pub type DiResult<T> = Result<T, DiError>;

/// Errors that can occur during registration or resolution
#[derive(Error, Debug)]
pub enum DiError {
    /// The same (contract, implementation) pair was registered twice
    #[error("Binding already registered: {contract} => {implementation}")]
    DuplicateBinding {
        contract: String,
        implementation: String,
    },

    /// Implementation is not assignable to the contract it is bound to
    #[error("{implementation} does not implement {contract}")]
    IncompatibleType {
        implementation: String,
        contract: String,
    },

    /// No binding could produce an instance of a plain request
    #[error("Service not found: {service_type}")]
    ServiceNotFound {
        service_type: String,
        type_id: TypeId,
    },

    /// Collection or generic request with nothing usable registered
    #[error("Unsupported request for {service_type}: {reason}")]
    UnsupportedRequest {
        service_type: String,
        reason: String,
    },

    /// Implementation exposes no constructor
    #[error("No constructor available for {implementation}")]
    NoConstructor { implementation: String },

    /// A binding inside a collection is not assignable to the element type
    #[error("{implementation} cannot be collected as {element}")]
    IncompatibleElement {
        implementation: String,
        element: String,
    },

    /// A resolved instance could not be cast to its contract
    #[error("Invalid cast from {implementation} to {contract}")]
    InvalidCast {
        implementation: String,
        contract: String,
    },

    /// Service creation failed
    #[error("Failed to create service: {service_type}: {reason}")]
    ServiceCreationFailed {
        service_type: String,
        reason: String,
    },

    /// Resolution nested deeper than the configured limit
    #[error("Resolution depth limit of {limit} exceeded while resolving {service_type} (circular dependency?)")]
    DepthExceeded { service_type: String, limit: usize },

    /// Configuration error
    #[cfg(feature = "config")]
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DiError {
    /// Build a [`DiError::ServiceCreationFailed`] for type `T`
    pub fn creation_failed<T: ?Sized + 'static>(reason: impl Into<String>) -> Self {
        DiError::ServiceCreationFailed {
            service_type: std::any::type_name::<T>().to_string(),
            reason: reason.into(),
        }
    }
}
