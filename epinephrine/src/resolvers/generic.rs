//! Open generic resolution
//!
//! A request such as `dyn Repository<Order>` with nothing registered under
//! that exact type is served from the bindings of its definition
//! (`RepositoryDef`). Only the first binding of the definition is consulted.

use tracing::trace;

use crate::container::{Container, DepthGuard};
use crate::error::{DiError, DiResult};
use crate::provider::ServiceProvider;
use crate::registry::BindingTarget;
use crate::service::{Resolved, ServiceType, Shape};

/// Serve a parameterized request from the first binding of its definition.
///
/// Singleton open generic bindings are cached per specialized implementation
/// (`MemoryQueue<u32>` and `MemoryQueue<String>` are separate singletons).
/// Generic factories run on every request regardless of lifetime: their
/// result carries no implementation key to cache under.
pub fn resolve(container: &Container, requested: &ServiceType) -> DiResult<Resolved> {
    let key = requested.key();
    let Shape::Generic {
        definition,
        arguments,
    } = requested.shape()
    else {
        return Err(DiError::UnsupportedRequest {
            service_type: key.name().to_string(),
            reason: "not a parameterized generic type".to_string(),
        });
    };

    let binding = container
        .bindings()
        .bindings_for(definition)
        .first()
        .ok_or_else(|| DiError::UnsupportedRequest {
            service_type: key.name().to_string(),
            reason: format!("no open generic binding registered for {}", definition),
        })?;
    trace!(
        service = %key,
        definition = %definition,
        implementation = %binding.implementation_key(),
        "Resolving open generic"
    );

    match binding.target() {
        BindingTarget::GenericFactory { factory, .. } => {
            let _depth = DepthGuard::enter(container.options().max_resolution_depth, &key)?;
            let provider: &dyn ServiceProvider = container;
            let resolved = factory(provider, arguments.as_slice())?;
            if resolved.service() != key {
                return Err(DiError::IncompatibleType {
                    implementation: resolved.service().name().to_string(),
                    contract: key.name().to_string(),
                });
            }
            Ok(resolved)
        }
        BindingTarget::OpenGeneric { implementation } => {
            let specialized = implementation
                .specialize(arguments)
                .filter(|specialized| specialized.is_assignable_to(&key))
                .ok_or_else(|| DiError::IncompatibleType {
                    implementation: implementation.definition().name().to_string(),
                    contract: key.name().to_string(),
                })?;
            let instance = container.materialize(specialized, binding.lifetime(), None)?;
            specialized.cast(instance, &key)
        }
        BindingTarget::Implementation { implementation, .. } => Err(DiError::UnsupportedRequest {
            service_type: key.name().to_string(),
            reason: format!("{} is not an open generic implementation", implementation.key()),
        }),
    }
}
