//! Multi-binding resolution

use tracing::trace;

use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::service::{CollectFn, Resolved, TypeKey};

/// Resolve every binding of `element`, in registration order, and assemble
/// them with `collect` into the `requested` collection
pub fn resolve(
    container: &Container,
    requested: &TypeKey,
    element: &TypeKey,
    collect: CollectFn,
) -> DiResult<Resolved> {
    let bindings = container.bindings().bindings_for(element);
    if bindings.is_empty() {
        return Err(DiError::UnsupportedRequest {
            service_type: requested.name().to_string(),
            reason: format!("no implementations registered for {}", element),
        });
    }
    trace!(element = %element, count = bindings.len(), "Resolving collection");

    let items = bindings
        .iter()
        .map(|binding| {
            let implementation =
                binding
                    .implementation_type()
                    .ok_or_else(|| DiError::IncompatibleElement {
                        implementation: binding.implementation_key().name().to_string(),
                        element: element.name().to_string(),
                    })?;
            if !implementation.is_assignable_to(element) {
                return Err(DiError::IncompatibleElement {
                    implementation: implementation.key().name().to_string(),
                    element: element.name().to_string(),
                });
            }
            let instance =
                container.materialize(implementation, binding.lifetime(), binding.factory())?;
            implementation.cast(instance, element)
        })
        .collect::<DiResult<Vec<_>>>()?;

    collect(items)
}
