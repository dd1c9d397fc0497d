//! Binding table: contract type -> registered implementations

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{DiError, DiResult};
use crate::implementation::{GenericImplementation, ImplementationType, Instance};
use crate::provider::ServiceProvider;
use crate::service::{Resolved, ServiceLifetime, TypeKey};

/// Factory producing an implementation instance
pub type ServiceFactory = Arc<dyn Fn(&dyn ServiceProvider) -> DiResult<Instance> + Send + Sync>;

/// Factory producing an instance of a parameterized generic contract.
///
/// Receives the request's type arguments and must return an instance of the
/// requested contract.
pub type GenericFactory =
    Arc<dyn Fn(&dyn ServiceProvider, &[TypeKey]) -> DiResult<Resolved> + Send + Sync>;

/// What a binding produces
#[derive(Clone)]
pub enum BindingTarget {
    /// A concrete implementation, built by its factory or its constructors
    Implementation {
        implementation: Arc<ImplementationType>,
        factory: Option<ServiceFactory>,
    },
    /// An open generic implementation, specialized per request
    OpenGeneric {
        implementation: Arc<GenericImplementation>,
    },
    /// A factory standing in for an open generic implementation
    GenericFactory {
        definition: TypeKey,
        factory: GenericFactory,
    },
}

/// Lifetime and construction strategy of one (contract, implementation) pair
#[derive(Clone)]
pub struct Binding {
    lifetime: ServiceLifetime,
    target: BindingTarget,
}

impl Binding {
    pub fn new(implementation: ImplementationType, lifetime: ServiceLifetime) -> Self {
        Self {
            lifetime,
            target: BindingTarget::Implementation {
                implementation: Arc::new(implementation),
                factory: None,
            },
        }
    }

    pub fn with_factory(
        implementation: ImplementationType,
        lifetime: ServiceLifetime,
        factory: ServiceFactory,
    ) -> Self {
        Self {
            lifetime,
            target: BindingTarget::Implementation {
                implementation: Arc::new(implementation),
                factory: Some(factory),
            },
        }
    }

    pub fn open_generic(implementation: GenericImplementation, lifetime: ServiceLifetime) -> Self {
        Self {
            lifetime,
            target: BindingTarget::OpenGeneric {
                implementation: Arc::new(implementation),
            },
        }
    }

    pub fn generic_factory(
        definition: TypeKey,
        lifetime: ServiceLifetime,
        factory: GenericFactory,
    ) -> Self {
        Self {
            lifetime,
            target: BindingTarget::GenericFactory {
                definition,
                factory,
            },
        }
    }

    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    pub fn target(&self) -> &BindingTarget {
        &self.target
    }

    /// Key of the implementation (or implementation definition) this binds
    pub fn implementation_key(&self) -> TypeKey {
        match &self.target {
            BindingTarget::Implementation { implementation, .. } => implementation.key(),
            BindingTarget::OpenGeneric { implementation } => implementation.definition(),
            BindingTarget::GenericFactory { definition, .. } => *definition,
        }
    }

    pub fn implementation_type(&self) -> Option<&ImplementationType> {
        match &self.target {
            BindingTarget::Implementation { implementation, .. } => Some(implementation),
            _ => None,
        }
    }

    pub fn factory(&self) -> Option<&ServiceFactory> {
        match &self.target {
            BindingTarget::Implementation { factory, .. } => factory.as_ref(),
            _ => None,
        }
    }

    pub fn has_factory(&self) -> bool {
        match &self.target {
            BindingTarget::Implementation { factory, .. } => factory.is_some(),
            BindingTarget::OpenGeneric { .. } => false,
            BindingTarget::GenericFactory { .. } => true,
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("implementation", &self.implementation_key())
            .field("lifetime", &self.lifetime)
            .field("has_factory", &self.has_factory())
            .finish()
    }
}

#[derive(Clone)]
struct ContractBindings {
    contract: TypeKey,
    bindings: Vec<Binding>,
}

/// Registered bindings keyed by contract type.
///
/// Bindings of one contract are kept in registration order.
#[derive(Clone, Default)]
pub struct BindingTable {
    contracts: FxHashMap<TypeId, ContractBindings>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `binding` under `contract`
    pub fn register(&mut self, contract: TypeKey, binding: Binding) -> DiResult<()> {
        let compatible = match binding.target() {
            BindingTarget::Implementation {
                implementation,
                factory: None,
            } => implementation.is_assignable_to(&contract),
            BindingTarget::OpenGeneric { implementation } => {
                implementation.implements_definition(&contract)
            }
            _ => true,
        };
        if !compatible {
            return Err(DiError::IncompatibleType {
                implementation: binding.implementation_key().name().to_string(),
                contract: contract.name().to_string(),
            });
        }

        let entry = self
            .contracts
            .entry(contract.id())
            .or_insert_with(|| ContractBindings {
                contract,
                bindings: Vec::new(),
            });

        let implementation = binding.implementation_key();
        if entry
            .bindings
            .iter()
            .any(|existing| existing.implementation_key() == implementation)
        {
            return Err(DiError::DuplicateBinding {
                contract: contract.name().to_string(),
                implementation: implementation.name().to_string(),
            });
        }

        debug!(
            contract = %contract,
            implementation = %implementation,
            lifetime = %binding.lifetime(),
            factory = binding.has_factory(),
            "Registered binding"
        );
        entry.bindings.push(binding);
        Ok(())
    }

    /// Bindings registered for `contract`, empty when there are none
    pub fn bindings_for(&self, contract: &TypeKey) -> &[Binding] {
        self.contracts
            .get(&contract.id())
            .map(|entry| entry.bindings.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, contract: &TypeKey) -> bool {
        self.contracts.contains_key(&contract.id())
    }

    /// Registered contract types, in no particular order
    pub fn contracts(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.contracts.values().map(|entry| entry.contract)
    }

    pub fn contract_count(&self) -> usize {
        self.contracts.len()
    }

    /// Total number of bindings
    pub fn len(&self) -> usize {
        self.contracts.values().map(|entry| entry.bindings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl fmt::Debug for BindingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.contracts
                    .values()
                    .map(|entry| (entry.contract, &entry.bindings)),
            )
            .finish()
    }
}
