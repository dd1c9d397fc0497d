//! Service contracts, type keys and lifetimes
//!
//! Rust has no run-time reflection, so every type the container deals with is
//! described by explicit data: a [`TypeKey`] identifies a type, a
//! [`ServiceType`] describes a *requested* type together with its [`Shape`],
//! and [`Resolved`] carries a contract-typed instance through the type-erased
//! resolution engine.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{DiError, DiResult};

/// Service lifetime determines how services are created and cached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLifetime {
    /// A new instance is created for each request
    Transient,
    /// A single instance is created and reused for the container lifetime
    Singleton,
}

impl fmt::Display for ServiceLifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceLifetime::Transient => write!(f, "Transient"),
            ServiceLifetime::Singleton => write!(f, "Singleton"),
        }
    }
}

/// Runtime identity of a type, usable as a registry key
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this key identifies `T`
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Assembles resolved elements into the typed sequence of a collection request
pub type CollectFn = fn(Vec<Resolved>) -> DiResult<Resolved>;

/// Classification of a requested type
#[derive(Clone)]
pub enum Shape {
    /// A single contract
    Plain,
    /// Every implementation registered under `element`
    Collection { element: TypeKey, collect: CollectFn },
    /// A parameterized instance of an open generic `definition`
    Generic {
        definition: TypeKey,
        arguments: Vec<TypeKey>,
    },
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Plain => f.write_str("Plain"),
            Shape::Collection { element, .. } => {
                f.debug_struct("Collection").field("element", element).finish()
            }
            Shape::Generic {
                definition,
                arguments,
            } => f
                .debug_struct("Generic")
                .field("definition", definition)
                .field("arguments", arguments)
                .finish(),
        }
    }
}

/// A requested type described as data
#[derive(Debug, Clone)]
pub struct ServiceType {
    key: TypeKey,
    shape: Shape,
}

impl ServiceType {
    /// Describe the contract `C`
    pub fn of<C: Contract + ?Sized>() -> Self {
        C::service_type()
    }

    pub fn plain<T: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            shape: Shape::Plain,
        }
    }

    /// `T` is an instantiation of the open generic identified by `D`
    pub fn generic<T: ?Sized + 'static, D: ?Sized + 'static>(arguments: Vec<TypeKey>) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            shape: Shape::Generic {
                definition: TypeKey::of::<D>(),
                arguments,
            },
        }
    }

    pub fn collection<T: ?Sized + 'static>(element: TypeKey, collect: CollectFn) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            shape: Shape::Collection { element, collect },
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.key.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

/// A type that can be requested from the container.
///
/// Implement it with [`contract!`](crate::contract):
///
/// ```
/// use epinephrine::contract;
///
/// pub trait Logger: Send + Sync {
///     fn log(&self, message: &str);
/// }
/// contract!(dyn Logger);
///
/// pub trait Repository<A>: Send + Sync {}
/// pub struct RepositoryDef;
/// contract!(<A> dyn Repository<A> => RepositoryDef);
/// ```
pub trait Contract: Send + Sync + 'static {
    fn service_type() -> ServiceType;
}

/// Implement [`Contract`] for a plain or a generic contract type.
///
/// The generic form names the type that stands for the unparameterized
/// definition; open generic bindings are registered under that type.
#[macro_export]
macro_rules! contract {
    (<$arg:ident> $ty:ty => $definition:ty) => {
        impl<$arg: Send + Sync + 'static> $crate::Contract for $ty {
            fn service_type() -> $crate::ServiceType {
                $crate::ServiceType::generic::<Self, $definition>(vec![$crate::TypeKey::of::<$arg>()])
            }
        }
    };
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Contract for $ty {
                fn service_type() -> $crate::ServiceType {
                    $crate::ServiceType::plain::<Self>()
                }
            }
        )+
    };
}

/// Contract-typed instance flowing through the type-erased engine
pub struct Resolved {
    service: TypeKey,
    value: Box<dyn Any + Send + Sync>,
}

impl Resolved {
    pub fn new<C: ?Sized + Send + Sync + 'static>(instance: Arc<C>) -> Self {
        Self {
            service: TypeKey::of::<C>(),
            value: Box::new(instance),
        }
    }

    /// The contract this instance was produced for
    pub fn service(&self) -> TypeKey {
        self.service
    }

    pub fn downcast<C: ?Sized + Send + Sync + 'static>(self) -> DiResult<Arc<C>> {
        let service = self.service;
        self.value
            .downcast::<Arc<C>>()
            .map(|instance| *instance)
            .map_err(|_| DiError::InvalidCast {
                implementation: service.name().to_string(),
                contract: type_name::<C>().to_string(),
            })
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

/// Every implementation registered for `C`, in registration order.
///
/// Requesting `Many<dyn C>` (or taking `Arc<Many<dyn C>>` as a constructor
/// parameter) resolves each binding of `dyn C`.
pub struct Many<C: ?Sized> {
    items: Vec<Arc<C>>,
}

impl<C: ?Sized> Many<C> {
    pub fn into_vec(self) -> Vec<Arc<C>> {
        self.items
    }
}

impl<C: Contract + ?Sized> Many<C> {
    fn collect(items: Vec<Resolved>) -> DiResult<Resolved> {
        let items = items
            .into_iter()
            .map(Resolved::downcast::<C>)
            .collect::<DiResult<Vec<_>>>()?;
        Ok(Resolved::new(Arc::new(Many { items })))
    }
}

impl<C: ?Sized> Deref for Many<C> {
    type Target = [Arc<C>];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'a, C: ?Sized> IntoIterator for &'a Many<C> {
    type Item = &'a Arc<C>;
    type IntoIter = std::slice::Iter<'a, Arc<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<C: Contract + ?Sized> Contract for Many<C> {
    fn service_type() -> ServiceType {
        ServiceType::collection::<Self>(TypeKey::of::<C>(), Self::collect)
    }
}
