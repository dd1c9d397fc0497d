//! Automatic constructor injection

use tracing::trace;

use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::implementation::{Arguments, Constructor, ImplementationType, Instance};

/// The widest constructor of `implementation`; ties go to the first declared
pub fn select(implementation: &ImplementationType) -> DiResult<&Constructor> {
    implementation
        .constructors()
        .iter()
        .fold(None, |widest: Option<&Constructor>, candidate| match widest {
            Some(widest) if widest.parameters().len() >= candidate.parameters().len() => {
                Some(widest)
            }
            _ => Some(candidate),
        })
        .ok_or_else(|| DiError::NoConstructor {
            implementation: implementation.key().name().to_string(),
        })
}

/// Build `implementation` with its widest constructor, resolving every
/// parameter through `container`
pub fn construct(container: &Container, implementation: &ImplementationType) -> DiResult<Instance> {
    let constructor = select(implementation)?;
    trace!(
        implementation = %implementation.key(),
        parameters = constructor.parameters().len(),
        "Selected constructor"
    );

    let arguments = constructor
        .parameters()
        .iter()
        .map(|parameter| container.resolve_service(parameter))
        .collect::<DiResult<Vec<_>>>()?;

    constructor.invoke(Arguments::new(implementation.key(), arguments))
}
