//! Container builder for fluent configuration

use std::sync::Arc;

use tracing::debug;

use crate::config::ContainerOptions;
use crate::container::Container;
use crate::error::DiResult;
use crate::implementation::{GenericImplementation, Injectable, Instance};
use crate::provider::ServiceProvider;
use crate::registry::{Binding, BindingTable, GenericFactory, ServiceFactory};
use crate::service::{Resolved, ServiceLifetime, TypeKey};

/// Builder for constructing a service container.
///
/// Owns the binding table until [`build`](ContainerBuilder::build) freezes it.
///
/// ```
/// use epinephrine::prelude::*;
///
/// pub trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
/// contract!(dyn Clock);
///
/// pub struct FixedClock;
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 { 42 }
/// }
/// impl Injectable for FixedClock {
///     fn implementation() -> ImplementationType {
///         ImplementationType::builder::<Self>()
///             .constructor(|| FixedClock)
///             .implements::<dyn Clock>(|it| it)
///             .build()
///     }
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder.register_singleton::<dyn Clock, FixedClock>()?;
/// let container = builder.build();
/// assert_eq!(container.resolve::<dyn Clock>()?.now(), 42);
/// # Ok::<(), DiError>(())
/// ```
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    bindings: BindingTable,
    options: ContainerOptions,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder whose container uses `options`
    pub fn with_options(options: ContainerOptions) -> Self {
        Self {
            bindings: BindingTable::new(),
            options,
        }
    }

    /// Bind `I` to the contract `C`, constructed automatically
    pub fn register<C, I>(&mut self, lifetime: ServiceLifetime) -> DiResult<&mut Self>
    where
        C: ?Sized + 'static,
        I: Injectable,
    {
        self.register_binding(
            TypeKey::of::<C>(),
            Binding::new(I::implementation(), lifetime),
        )
    }

    /// Register a singleton service
    pub fn register_singleton<C, I>(&mut self) -> DiResult<&mut Self>
    where
        C: ?Sized + 'static,
        I: Injectable,
    {
        self.register::<C, I>(ServiceLifetime::Singleton)
    }

    /// Register a transient service
    pub fn register_transient<C, I>(&mut self) -> DiResult<&mut Self>
    where
        C: ?Sized + 'static,
        I: Injectable,
    {
        self.register::<C, I>(ServiceLifetime::Transient)
    }

    /// Bind `I` to `C`, built by `factory` instead of a constructor
    pub fn register_with<C, I, F>(&mut self, lifetime: ServiceLifetime, factory: F) -> DiResult<&mut Self>
    where
        C: ?Sized + 'static,
        I: Injectable,
        F: Fn(&dyn ServiceProvider) -> DiResult<I> + Send + Sync + 'static,
    {
        let factory: ServiceFactory = Arc::new(move |provider: &dyn ServiceProvider| -> DiResult<Instance> {
            Ok(Arc::new(factory(provider)?))
        });
        self.register_binding(
            TypeKey::of::<C>(),
            Binding::with_factory(I::implementation(), lifetime, factory),
        )
    }

    /// Register a singleton service with a factory
    pub fn register_singleton_with<C, I, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        C: ?Sized + 'static,
        I: Injectable,
        F: Fn(&dyn ServiceProvider) -> DiResult<I> + Send + Sync + 'static,
    {
        self.register_with::<C, I, F>(ServiceLifetime::Singleton, factory)
    }

    /// Register a transient service with a factory
    pub fn register_transient_with<C, I, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        C: ?Sized + 'static,
        I: Injectable,
        F: Fn(&dyn ServiceProvider) -> DiResult<I> + Send + Sync + 'static,
    {
        self.register_with::<C, I, F>(ServiceLifetime::Transient, factory)
    }

    /// Bind an open generic implementation to the generic contract `D`
    pub fn register_generic<D>(
        &mut self,
        lifetime: ServiceLifetime,
        implementation: GenericImplementation,
    ) -> DiResult<&mut Self>
    where
        D: ?Sized + 'static,
    {
        self.register_binding(
            TypeKey::of::<D>(),
            Binding::open_generic(implementation, lifetime),
        )
    }

    /// Serve the generic contract `D` from a factory receiving the type
    /// arguments of each request
    pub fn register_generic_with<D, F>(&mut self, lifetime: ServiceLifetime, factory: F) -> DiResult<&mut Self>
    where
        D: ?Sized + 'static,
        F: Fn(&dyn ServiceProvider, &[TypeKey]) -> DiResult<Resolved> + Send + Sync + 'static,
    {
        let definition = TypeKey::of::<D>();
        let factory: GenericFactory = Arc::new(factory);
        self.register_binding(
            definition,
            Binding::generic_factory(definition, lifetime, factory),
        )
    }

    /// Register a prepared binding under `contract`
    pub fn register_binding(&mut self, contract: TypeKey, binding: Binding) -> DiResult<&mut Self> {
        self.bindings.register(contract, binding)?;
        Ok(self)
    }

    /// Bindings registered so far
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Add services from a module
    pub fn add_module<M: Module + ?Sized>(&mut self, module: &M) -> DiResult<&mut Self> {
        module.configure(self)?;
        Ok(self)
    }

    /// Build the container
    pub fn build(self) -> Container {
        debug!(
            contracts = self.bindings.contract_count(),
            bindings = self.bindings.len(),
            max_resolution_depth = self.options.max_resolution_depth,
            "Building container"
        );
        Container::new(self.bindings, self.options)
    }
}

/// Trait for service modules
pub trait Module {
    /// Configure services for this module
    fn configure(&self, builder: &mut ContainerBuilder) -> DiResult<()>;
}
