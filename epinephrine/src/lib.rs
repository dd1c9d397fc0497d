//! Dependency injection container
//!
//! `epinephrine` maps service contracts (usually trait objects) to one or
//! more implementations and builds fully wired object graphs on demand:
//!
//! * automatic constructor injection through the widest constructor
//! * singleton and transient lifetimes
//! * multi-bindings, requested as [`Many<dyn C>`](Many)
//! * open generic bindings, e.g. one `SqlRepository<_>` registration serving
//!   `dyn Repository<Order>` and `dyn Repository<Customer>`
//!
//! Types describe themselves to the container through [`Injectable`] and
//! [`contract!`], since Rust offers no run-time reflection.
//!
//! ```
//! use epinephrine::prelude::*;
//! use std::sync::Arc;
//!
//! pub trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//! contract!(dyn Logger);
//!
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self, name: &str) -> String;
//! }
//! contract!(dyn Greeter);
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String { format!("[log] {}", message) }
//! }
//! impl Injectable for ConsoleLogger {
//!     fn implementation() -> ImplementationType {
//!         ImplementationType::builder::<Self>()
//!             .constructor(|| ConsoleLogger)
//!             .implements::<dyn Logger>(|it| it)
//!             .build()
//!     }
//! }
//!
//! struct LoggingGreeter {
//!     logger: Arc<dyn Logger>,
//! }
//! impl Greeter for LoggingGreeter {
//!     fn greet(&self, name: &str) -> String { self.logger.log(&format!("hello {}", name)) }
//! }
//! impl Injectable for LoggingGreeter {
//!     fn implementation() -> ImplementationType {
//!         ImplementationType::builder::<Self>()
//!             .constructor(|logger: Arc<dyn Logger>| LoggingGreeter { logger })
//!             .implements::<dyn Greeter>(|it| it)
//!             .build()
//!     }
//! }
//!
//! let mut builder = ContainerBuilder::new();
//! builder.register_singleton::<dyn Logger, ConsoleLogger>()?;
//! builder.register_transient::<dyn Greeter, LoggingGreeter>()?;
//! let container = builder.build();
//!
//! let greeter = container.resolve::<dyn Greeter>()?;
//! assert_eq!(greeter.greet("world"), "[log] hello world");
//! # Ok::<(), DiError>(())
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod container;
pub mod error;
pub mod implementation;
pub mod provider;
pub mod registry;
pub mod resolvers;
pub mod service;

pub use builder::{ContainerBuilder, Module};
pub use cache::SingletonCache;
pub use config::ContainerOptions;
pub use container::Container;
pub use error::{DiError, DiResult};
pub use implementation::{
    Arguments, Constructor, ConstructorFn, GenericDefinition, GenericImplementation,
    ImplementationType, Injectable, Instance,
};
pub use provider::{ServiceProvider, ServiceProviderExt};
pub use registry::{Binding, BindingTable, BindingTarget, GenericFactory, ServiceFactory};
pub use service::{Contract, Many, Resolved, ServiceLifetime, ServiceType, Shape, TypeKey};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::contract;
    pub use crate::{
        Container, ContainerBuilder, ContainerOptions, Contract, DiError, DiResult,
        GenericDefinition, GenericImplementation, ImplementationType, Injectable, Many, Module,
        Resolved, ServiceLifetime, ServiceProvider, ServiceProviderExt, TypeKey,
    };
}
