//! Integration tests for the DI container

use epinephrine::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Test services
trait KeyProvider: Send + Sync {
    fn key(&self) -> String;
}
contract!(dyn KeyProvider);

trait Encryptor: Send + Sync {
    fn encrypt(&self, text: &str) -> String;
}
contract!(dyn Encryptor);

trait Vault: Send + Sync {
    fn store(&self, secret: &str) -> String;
}
contract!(dyn Vault);

trait Notifier: Send + Sync {
    fn channel(&self) -> &'static str;
}
contract!(dyn Notifier);

struct StaticKey {
    key: String,
}

impl KeyProvider for StaticKey {
    fn key(&self) -> String {
        self.key.clone()
    }
}

impl Injectable for StaticKey {
    fn implementation() -> ImplementationType {
        ImplementationType::builder::<Self>()
            .constructor(|| StaticKey {
                key: "default".to_string(),
            })
            .implements::<dyn KeyProvider>(|it| it)
            .build()
    }
}

struct XorEncryptor {
    keys: Arc<dyn KeyProvider>,
}

impl XorEncryptor {
    fn new(keys: Arc<dyn KeyProvider>) -> Self {
        Self { keys }
    }
}

impl Encryptor for XorEncryptor {
    fn encrypt(&self, text: &str) -> String {
        format!("{}:{}", self.keys.key(), text)
    }
}

impl Injectable for XorEncryptor {
    fn implementation() -> ImplementationType {
        ImplementationType::builder::<Self>()
            .constructor(XorEncryptor::new)
            .implements::<dyn Encryptor>(|it| it)
            .build()
    }
}

struct SecretVault {
    encryptor: Arc<dyn Encryptor>,
}

impl SecretVault {
    fn new(encryptor: Arc<dyn Encryptor>) -> Self {
        Self { encryptor }
    }
}

impl Vault for SecretVault {
    fn store(&self, secret: &str) -> String {
        self.encryptor.encrypt(secret)
    }
}

impl Injectable for SecretVault {
    fn implementation() -> ImplementationType {
        ImplementationType::builder::<Self>()
            .constructor(SecretVault::new)
            .implements::<dyn Vault>(|it| it)
            .build()
    }
}

struct EmailNotifier;

impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }
}

impl Injectable for EmailNotifier {
    fn implementation() -> ImplementationType {
        ImplementationType::builder::<Self>()
            .constructor(|| EmailNotifier)
            .implements::<dyn Notifier>(|it| it)
            .build()
    }
}

struct SmsNotifier;

impl Notifier for SmsNotifier {
    fn channel(&self) -> &'static str {
        "sms"
    }
}

impl Injectable for SmsNotifier {
    fn implementation() -> ImplementationType {
        ImplementationType::builder::<Self>()
            .constructor(|| SmsNotifier)
            .implements::<dyn Notifier>(|it| it)
            .build()
    }
}

struct Broadcaster {
    notifiers: Arc<Many<dyn Notifier>>,
}
contract!(Broadcaster);

impl Injectable for Broadcaster {
    fn implementation() -> ImplementationType {
        ImplementationType::builder::<Self>()
            .constructor(|notifiers: Arc<Many<dyn Notifier>>| Broadcaster { notifiers })
            .build()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_no_parameter_constructor() {
    init_tracing();
    let mut builder = ContainerBuilder::new();
    builder.register_transient::<dyn KeyProvider, StaticKey>().unwrap();

    let container = builder.build();
    assert_eq!(container.resolve::<dyn KeyProvider>().unwrap().key(), "default");
}

#[test]
fn test_factory_with_key() {
    let mut builder = ContainerBuilder::new();
    builder
        .register_transient_with::<dyn KeyProvider, StaticKey, _>(|_| {
            Ok(StaticKey {
                key: "s3cr3t".to_string(),
            })
        })
        .unwrap();

    let container = builder.build();
    assert_eq!(container.resolve::<dyn KeyProvider>().unwrap().key(), "s3cr3t");
}

#[test]
fn test_dependency_chain() {
    init_tracing();
    let mut builder = ContainerBuilder::new();
    builder
        .register_singleton_with::<dyn KeyProvider, StaticKey, _>(|_| {
            Ok(StaticKey {
                key: "abc".to_string(),
            })
        })
        .unwrap();
    builder.register_transient::<dyn Encryptor, XorEncryptor>().unwrap();
    builder.register_transient::<dyn Vault, SecretVault>().unwrap();

    let container = builder.build();
    let vault = container.resolve::<dyn Vault>().unwrap();
    assert_eq!(vault.store("pin"), "abc:pin");
}

#[test]
fn test_factory_resolves_dependencies() {
    let mut builder = ContainerBuilder::new();
    builder.register_singleton::<dyn KeyProvider, StaticKey>().unwrap();
    builder
        .register_transient_with::<dyn Encryptor, XorEncryptor, _>(|provider| {
            Ok(XorEncryptor::new(provider.resolve::<dyn KeyProvider>()?))
        })
        .unwrap();

    let container = builder.build();
    assert_eq!(container.resolve::<dyn Encryptor>().unwrap().encrypt("x"), "default:x");
}

#[test]
fn test_missing_dependency_propagates() {
    let mut builder = ContainerBuilder::new();
    builder.register_transient::<dyn Vault, SecretVault>().unwrap();

    let container = builder.build();
    match container.resolve::<dyn Vault>() {
        Err(DiError::ServiceNotFound { service_type, .. }) => {
            assert!(service_type.contains("Encryptor"))
        }
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("resolution should fail"),
    }
}

#[test]
fn test_collection_constructor_parameter() {
    let mut builder = ContainerBuilder::new();
    builder.register_transient::<dyn Notifier, EmailNotifier>().unwrap();
    builder.register_transient::<dyn Notifier, SmsNotifier>().unwrap();
    builder.register_transient::<Broadcaster, Broadcaster>().unwrap();

    let container = builder.build();
    let broadcaster = container.resolve::<Broadcaster>().unwrap();
    let channels: Vec<_> = broadcaster.notifiers.iter().map(|n| n.channel()).collect();
    assert_eq!(channels, vec!["email", "sms"]);
}

#[test]
fn test_resolve_many_and_all() {
    let mut builder = ContainerBuilder::new();
    builder.register_transient::<dyn Notifier, EmailNotifier>().unwrap();
    builder.register_transient::<dyn Notifier, SmsNotifier>().unwrap();

    let container = builder.build();
    assert_eq!(container.resolve::<Many<dyn Notifier>>().unwrap().len(), 2);
    assert_eq!(container.resolve_all::<dyn Notifier>().unwrap().len(), 2);
    assert_eq!(container.resolve::<dyn Notifier>().unwrap().channel(), "email");
}

#[test]
fn test_singleton_equality() {
    let mut builder = ContainerBuilder::new();
    builder.register_singleton::<dyn KeyProvider, StaticKey>().unwrap();

    let container = builder.build();
    let first = container.resolve::<dyn KeyProvider>().unwrap();
    let second = container.resolve::<dyn KeyProvider>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // Clones share the cache
    let third = container.clone().resolve::<dyn KeyProvider>().unwrap();
    assert!(Arc::ptr_eq(&first, &third));
}

#[test]
fn test_transient_inequality() {
    let mut builder = ContainerBuilder::new();
    builder.register_transient::<dyn KeyProvider, StaticKey>().unwrap();

    let container = builder.build();
    let first = container.resolve::<dyn KeyProvider>().unwrap();
    let second = container.resolve::<dyn KeyProvider>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_separate_containers_do_not_share_singletons() {
    let build = || {
        let mut builder = ContainerBuilder::new();
        builder.register_singleton::<dyn KeyProvider, StaticKey>().unwrap();
        builder.build()
    };

    let first = build().resolve::<dyn KeyProvider>().unwrap();
    let second = build().resolve::<dyn KeyProvider>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_singleton_factory_runs_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut builder = ContainerBuilder::new();
    builder
        .register_singleton_with::<dyn KeyProvider, StaticKey, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(StaticKey {
                key: "once".to_string(),
            })
        })
        .unwrap();

    let container = builder.build();
    for _ in 0..5 {
        container.resolve::<dyn KeyProvider>().unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_factory_error_propagates() {
    let mut builder = ContainerBuilder::new();
    builder
        .register_transient_with::<dyn KeyProvider, StaticKey, _>(|_| {
            Err(DiError::creation_failed::<StaticKey>("key store offline"))
        })
        .unwrap();

    let container = builder.build();
    assert!(matches!(
        container.resolve::<dyn KeyProvider>(),
        Err(DiError::ServiceCreationFailed { .. })
    ));
}

#[test]
fn test_register_inspects_table() {
    let mut builder = ContainerBuilder::new();
    builder.register_singleton::<dyn Notifier, EmailNotifier>().unwrap();
    builder.register_transient::<dyn Notifier, SmsNotifier>().unwrap();

    let notifier = TypeKey::of::<dyn Notifier>();
    let bindings = builder.bindings().bindings_for(&notifier);
    assert_eq!(bindings.len(), 2);
    assert!(bindings[0].implementation_key().is::<EmailNotifier>());
    assert_eq!(bindings[0].lifetime(), ServiceLifetime::Singleton);
    assert!(bindings[1].implementation_key().is::<SmsNotifier>());
    assert_eq!(bindings[1].lifetime(), ServiceLifetime::Transient);
}

#[test]
fn test_duplicate_registration_fails() {
    let mut builder = ContainerBuilder::new();
    builder.register_transient::<dyn Notifier, EmailNotifier>().unwrap();

    match builder.register_singleton::<dyn Notifier, EmailNotifier>() {
        Err(DiError::DuplicateBinding {
            contract,
            implementation,
        }) => {
            assert!(contract.contains("Notifier"));
            assert!(implementation.contains("EmailNotifier"));
        }
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("duplicate registration should fail"),
    }
}

#[test]
fn test_incompatible_registration_fails() {
    let mut builder = ContainerBuilder::new();
    assert!(matches!(
        builder.register_transient::<dyn Vault, EmailNotifier>(),
        Err(DiError::IncompatibleType { .. })
    ));
    assert!(builder.bindings().is_empty());
}

#[test]
fn test_unregistered_contract() {
    let container = ContainerBuilder::new().build();
    assert!(container.resolve::<dyn Notifier>().is_err());
    assert!(container.resolve_all::<dyn Notifier>().unwrap().is_empty());
}
