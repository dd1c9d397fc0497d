//! Service provider interfaces

use std::sync::Arc;

use crate::error::DiResult;
use crate::service::{Contract, Resolved, ServiceType, TypeKey};

/// Object-safe resolution interface, handed to factories
pub trait ServiceProvider: Send + Sync {
    /// Resolve the first instance for `service`
    fn resolve_service(&self, service: &ServiceType) -> DiResult<Resolved>;

    /// Resolve every instance for `service`
    fn resolve_services(&self, service: &ServiceType) -> DiResult<Vec<Resolved>>;

    /// Check if any binding is registered directly under `contract`
    fn has_service(&self, contract: &TypeKey) -> bool;
}

/// Typed helpers over [`ServiceProvider`]
pub trait ServiceProviderExt: ServiceProvider {
    fn resolve<C: Contract + ?Sized>(&self) -> DiResult<Arc<C>> {
        self.resolve_service(&C::service_type())?.downcast::<C>()
    }

    fn resolve_all<C: Contract + ?Sized>(&self) -> DiResult<Vec<Arc<C>>> {
        self.resolve_services(&C::service_type())?
            .into_iter()
            .map(Resolved::downcast::<C>)
            .collect()
    }

    fn has<C: Contract + ?Sized>(&self) -> bool {
        self.has_service(&TypeKey::of::<C>())
    }
}

impl<P: ServiceProvider + ?Sized> ServiceProviderExt for P {}
