//! Core container implementation

use std::cell::Cell;
use std::iter;
use std::sync::Arc;

use tracing::trace;

use crate::builder::ContainerBuilder;
use crate::cache::SingletonCache;
use crate::config::ContainerOptions;
use crate::error::{DiError, DiResult};
use crate::implementation::{ImplementationType, Instance};
use crate::provider::ServiceProvider;
use crate::registry::{Binding, BindingTable, BindingTarget, ServiceFactory};
use crate::resolvers::{collection, constructor, generic};
use crate::service::{Contract, Resolved, ServiceLifetime, ServiceType, Shape, TypeKey};

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Nesting level of the current thread's resolution, released on drop
pub(crate) struct DepthGuard {
    _private: (),
}

impl DepthGuard {
    pub(crate) fn enter(limit: usize, service: &TypeKey) -> DiResult<Self> {
        DEPTH.with(|depth| {
            let current = depth.get();
            if current >= limit {
                return Err(DiError::DepthExceeded {
                    service_type: service.name().to_string(),
                    limit,
                });
            }
            depth.set(current + 1);
            Ok(DepthGuard { _private: () })
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

struct ContainerInner {
    bindings: Arc<BindingTable>,
    singletons: SingletonCache,
    options: ContainerOptions,
}

/// Immutable service container.
///
/// Clones share the binding table and the singleton cache.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    pub(crate) fn new(bindings: BindingTable, options: ContainerOptions) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                bindings: Arc::new(bindings),
                singletons: SingletonCache::new(),
                options,
            }),
        }
    }

    /// Create a new container builder
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Resolve the first registered implementation of `C`
    pub fn resolve<C: Contract + ?Sized>(&self) -> DiResult<Arc<C>> {
        self.resolve_service(&C::service_type())?.downcast::<C>()
    }

    /// Resolve every registered implementation of `C`
    pub fn resolve_all<C: Contract + ?Sized>(&self) -> DiResult<Vec<Arc<C>>> {
        self.resolve_services(&C::service_type())?
            .into_iter()
            .map(Resolved::downcast::<C>)
            .collect()
    }

    /// Resolve the first instance for `service`.
    ///
    /// Only the first candidate binding is materialized.
    pub fn resolve_service(&self, service: &ServiceType) -> DiResult<Resolved> {
        trace!(service = %service.key(), "Resolving service");
        self.services(service).next().unwrap_or_else(|| {
            Err(DiError::ServiceNotFound {
                service_type: service.name().to_string(),
                type_id: service.key().id(),
            })
        })
    }

    /// Resolve every instance for `service`
    pub fn resolve_services(&self, service: &ServiceType) -> DiResult<Vec<Resolved>> {
        trace!(service = %service.key(), "Resolving all services");
        self.services(service).collect()
    }

    /// The frozen binding table
    pub fn bindings(&self) -> &BindingTable {
        &self.inner.bindings
    }

    pub fn singletons(&self) -> &SingletonCache {
        &self.inner.singletons
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// Lazily resolved candidates for `service`
    fn services<'a>(
        &'a self,
        service: &'a ServiceType,
    ) -> Box<dyn Iterator<Item = DiResult<Resolved>> + 'a> {
        let key = service.key();
        match service.shape() {
            Shape::Collection { element, collect } => {
                let (element, collect) = (*element, *collect);
                Box::new(iter::once_with(move || {
                    collection::resolve(self, &key, &element, collect)
                }))
            }
            Shape::Generic { .. } if self.bindings().bindings_for(&key).is_empty() => {
                Box::new(iter::once_with(move || generic::resolve(self, service)))
            }
            _ => Box::new(
                self.bindings()
                    .bindings_for(&key)
                    .iter()
                    .map(move |binding| self.resolve_binding(binding, &key)),
            ),
        }
    }

    fn resolve_binding(&self, binding: &Binding, contract: &TypeKey) -> DiResult<Resolved> {
        match binding.target() {
            BindingTarget::Implementation {
                implementation,
                factory,
            } => {
                if !implementation.is_assignable_to(contract) {
                    return Err(DiError::InvalidCast {
                        implementation: implementation.key().name().to_string(),
                        contract: contract.name().to_string(),
                    });
                }
                let instance =
                    self.materialize(implementation, binding.lifetime(), factory.as_ref())?;
                implementation.cast(instance, contract)
            }
            _ => Err(DiError::UnsupportedRequest {
                service_type: contract.name().to_string(),
                reason: format!(
                    "{} is an open generic binding and needs type arguments",
                    binding.implementation_key()
                ),
            }),
        }
    }

    /// Produce an instance of `implementation` honoring `lifetime`
    pub(crate) fn materialize(
        &self,
        implementation: &ImplementationType,
        lifetime: ServiceLifetime,
        factory: Option<&ServiceFactory>,
    ) -> DiResult<Instance> {
        let key = implementation.key();
        if lifetime == ServiceLifetime::Singleton {
            if let Some(instance) = self.inner.singletons.get(&key) {
                return Ok(instance);
            }
        }

        let _depth = DepthGuard::enter(self.inner.options.max_resolution_depth, &key)?;
        let instance = match factory {
            Some(factory) => {
                trace!(implementation = %key, "Invoking factory");
                let provider: &dyn ServiceProvider = self;
                factory(provider)?
            }
            None => constructor::construct(self, implementation)?,
        };

        Ok(match lifetime {
            ServiceLifetime::Singleton => self.inner.singletons.get_or_insert(&key, instance),
            ServiceLifetime::Transient => instance,
        })
    }
}

impl ServiceProvider for Container {
    fn resolve_service(&self, service: &ServiceType) -> DiResult<Resolved> {
        Container::resolve_service(self, service)
    }

    fn resolve_services(&self, service: &ServiceType) -> DiResult<Vec<Resolved>> {
        Container::resolve_services(self, service)
    }

    fn has_service(&self, contract: &TypeKey) -> bool {
        self.inner.bindings.contains(contract)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.inner.bindings.len())
            .field("singletons", &self.inner.singletons.len())
            .field("options", &self.inner.options)
            .finish()
    }
}
