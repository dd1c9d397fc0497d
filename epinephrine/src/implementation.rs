//! Implementation metadata: constructors and assignability
//!
//! An [`ImplementationType`] is what the resolver knows about a concrete type:
//! which constructors it exposes (parameter list as data plus an invoker) and
//! which contracts it can be up-cast to. Types publish their metadata through
//! [`Injectable`]:
//!
//! ```
//! use epinephrine::{contract, ImplementationType, Injectable};
//! use std::sync::Arc;
//!
//! pub trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//! contract!(dyn Clock);
//!
//! pub struct FixedClock;
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 { 42 }
//! }
//!
//! impl Injectable for FixedClock {
//!     fn implementation() -> ImplementationType {
//!         ImplementationType::builder::<Self>()
//!             .constructor(|| FixedClock)
//!             .implements::<dyn Clock>(|it| it)
//!             .build()
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{DiError, DiResult};
use crate::service::{Contract, Resolved, ServiceType, TypeKey};

/// A constructed implementation object, before it is cast to a contract
pub type Instance = Arc<dyn Any + Send + Sync>;

type Invoker = Arc<dyn Fn(Arguments) -> DiResult<Instance> + Send + Sync>;
type Caster = Arc<dyn Fn(Instance) -> Option<Resolved> + Send + Sync>;

/// Resolved constructor arguments, consumed positionally
pub struct Arguments {
    implementation: TypeKey,
    values: std::vec::IntoIter<Resolved>,
}

impl Arguments {
    pub fn new(implementation: TypeKey, values: Vec<Resolved>) -> Self {
        Self {
            implementation,
            values: values.into_iter(),
        }
    }

    /// Take the next argument as an instance of `C`
    pub fn next<C: Contract + ?Sized>(&mut self) -> DiResult<Arc<C>> {
        self.values
            .next()
            .ok_or_else(|| DiError::ServiceCreationFailed {
                service_type: self.implementation.name().to_string(),
                reason: format!("missing constructor argument {}", std::any::type_name::<C>()),
            })?
            .downcast::<C>()
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

/// One way of building an implementation
#[derive(Clone)]
pub struct Constructor {
    parameters: Vec<ServiceType>,
    invoke: Invoker,
}

impl Constructor {
    /// Build a constructor from its parameter list and an invoker
    pub fn new<I, F>(parameters: Vec<ServiceType>, invoke: F) -> Self
    where
        I: Send + Sync + 'static,
        F: Fn(&mut Arguments) -> DiResult<I> + Send + Sync + 'static,
    {
        Self {
            parameters,
            invoke: Arc::new(move |mut arguments: Arguments| -> DiResult<Instance> {
                Ok(Arc::new(invoke(&mut arguments)?))
            }),
        }
    }

    /// Build a constructor from a function taking `Arc<_>` dependencies
    pub fn from_fn<I, Args, F>(constructor: F) -> Self
    where
        I: Send + Sync + 'static,
        F: ConstructorFn<I, Args>,
    {
        Self::new(F::parameters(), move |arguments| constructor.call(arguments))
    }

    pub fn parameters(&self) -> &[ServiceType] {
        &self.parameters
    }

    pub fn invoke(&self, arguments: Arguments) -> DiResult<Instance> {
        (self.invoke)(arguments)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Functions usable as constructors: every parameter is an `Arc<C>` of some
/// [`Contract`] `C` and is injected in declaration order.
pub trait ConstructorFn<I, Args>: Send + Sync + 'static {
    fn parameters() -> Vec<ServiceType>;

    fn call(&self, arguments: &mut Arguments) -> DiResult<I>;
}

macro_rules! impl_constructor_fn {
    ($($arg:ident),*) => {
        impl<F, I, $($arg),*> ConstructorFn<I, ($(Arc<$arg>,)*)> for F
        where
            F: Fn($(Arc<$arg>),*) -> I + Send + Sync + 'static,
            $($arg: Contract + ?Sized,)*
        {
            fn parameters() -> Vec<ServiceType> {
                vec![$($arg::service_type()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn call(&self, arguments: &mut Arguments) -> DiResult<I> {
                $(let $arg = arguments.next::<$arg>()?;)*
                Ok(self($($arg),*))
            }
        }
    };
}

impl_constructor_fn!();
impl_constructor_fn!(A1);
impl_constructor_fn!(A1, A2);
impl_constructor_fn!(A1, A2, A3);
impl_constructor_fn!(A1, A2, A3, A4);
impl_constructor_fn!(A1, A2, A3, A4, A5);
impl_constructor_fn!(A1, A2, A3, A4, A5, A6);
impl_constructor_fn!(A1, A2, A3, A4, A5, A6, A7);
impl_constructor_fn!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Metadata of a concrete implementation type
#[derive(Clone)]
pub struct ImplementationType {
    key: TypeKey,
    constructors: Vec<Constructor>,
    casts: FxHashMap<TypeId, Caster>,
}

impl ImplementationType {
    /// Start describing `I`; `I` is always assignable to itself
    pub fn builder<I: Send + Sync + 'static>() -> ImplementationBuilder<I> {
        ImplementationBuilder {
            implementation: ImplementationType {
                key: TypeKey::of::<I>(),
                constructors: Vec::new(),
                casts: FxHashMap::default(),
            },
            _marker: PhantomData,
        }
        .implements::<I>(|it| it)
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    pub fn is_assignable_to(&self, contract: &TypeKey) -> bool {
        self.casts.contains_key(&contract.id())
    }

    /// Up-cast an instance of this implementation to `contract`
    pub fn cast(&self, instance: Instance, contract: &TypeKey) -> DiResult<Resolved> {
        self.casts
            .get(&contract.id())
            .and_then(|cast| cast(instance))
            .ok_or_else(|| DiError::InvalidCast {
                implementation: self.key.name().to_string(),
                contract: contract.name().to_string(),
            })
    }
}

impl fmt::Debug for ImplementationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplementationType")
            .field("key", &self.key)
            .field("constructors", &self.constructors.len())
            .field("contracts", &self.casts.len())
            .finish()
    }
}

/// Typed builder for [`ImplementationType`]
pub struct ImplementationBuilder<I> {
    implementation: ImplementationType,
    _marker: PhantomData<fn() -> I>,
}

impl<I: Send + Sync + 'static> ImplementationBuilder<I> {
    /// Add a constructor; the widest one is used for automatic construction
    pub fn constructor<Args, F>(mut self, constructor: F) -> Self
    where
        F: ConstructorFn<I, Args>,
    {
        self.implementation
            .constructors
            .push(Constructor::from_fn(constructor));
        self
    }

    /// Add a hand-built constructor
    pub fn raw_constructor(mut self, constructor: Constructor) -> Self {
        self.implementation.constructors.push(constructor);
        self
    }

    /// Declare that `I` can be used as `C`. `upcast` is almost always `|it| it`.
    pub fn implements<C: ?Sized + Send + Sync + 'static>(mut self, upcast: fn(Arc<I>) -> Arc<C>) -> Self {
        let cast: Caster = Arc::new(move |instance: Instance| -> Option<Resolved> {
            instance
                .downcast::<I>()
                .ok()
                .map(|it| Resolved::new::<C>(upcast(it)))
        });
        self.implementation.casts.insert(TypeId::of::<C>(), cast);
        self
    }

    pub fn build(self) -> ImplementationType {
        self.implementation
    }
}

/// A type that publishes its own [`ImplementationType`]
pub trait Injectable: Send + Sync + Sized + 'static {
    fn implementation() -> ImplementationType;
}

/// A type family standing for an open generic implementation.
///
/// ```
/// use epinephrine::GenericDefinition;
/// use std::marker::PhantomData;
///
/// pub struct SqlRepository<A>(PhantomData<A>);
///
/// pub struct SqlRepositoryDef;
/// impl GenericDefinition for SqlRepositoryDef {
///     type Of<A: Send + Sync + 'static> = SqlRepository<A>;
/// }
/// ```
pub trait GenericDefinition: 'static {
    type Of<A: Send + Sync + 'static>: Send + Sync + 'static;
}

/// Metadata of an open generic implementation and its specializations
#[derive(Clone)]
pub struct GenericImplementation {
    definition: TypeKey,
    contracts: Vec<TypeKey>,
    specializations: FxHashMap<Vec<TypeId>, ImplementationType>,
}

impl GenericImplementation {
    pub fn builder<F: GenericDefinition>() -> GenericImplementationBuilder<F> {
        GenericImplementationBuilder {
            implementation: GenericImplementation {
                definition: TypeKey::of::<F>(),
                contracts: Vec::new(),
                specializations: FxHashMap::default(),
            },
            _marker: PhantomData,
        }
    }

    pub fn definition(&self) -> TypeKey {
        self.definition
    }

    /// Whether this implements the generic contract `definition`
    pub fn implements_definition(&self, definition: &TypeKey) -> bool {
        self.contracts.contains(definition)
    }

    /// The implementation specialized with `arguments`, if it was declared
    pub fn specialize(&self, arguments: &[TypeKey]) -> Option<&ImplementationType> {
        let key: Vec<TypeId> = arguments.iter().map(TypeKey::id).collect();
        self.specializations.get(&key)
    }
}

impl fmt::Debug for GenericImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericImplementation")
            .field("definition", &self.definition)
            .field("contracts", &self.contracts)
            .field("specializations", &self.specializations.len())
            .finish()
    }
}

/// Typed builder for [`GenericImplementation`]
pub struct GenericImplementationBuilder<F> {
    implementation: GenericImplementation,
    _marker: PhantomData<fn() -> F>,
}

impl<F: GenericDefinition> GenericImplementationBuilder<F> {
    /// Declare that the family implements the generic contract `D`
    pub fn implements<D: ?Sized + 'static>(mut self) -> Self {
        self.implementation.contracts.push(TypeKey::of::<D>());
        self
    }

    /// Make `F::Of<A>` available for requests parameterized with `A`
    pub fn specialize<A: Send + Sync + 'static>(mut self) -> Self
    where
        F::Of<A>: Injectable,
    {
        self.implementation.specializations.insert(
            vec![TypeId::of::<A>()],
            <F::Of<A> as Injectable>::implementation(),
        );
        self
    }

    pub fn build(self) -> GenericImplementation {
        self.implementation
    }
}
