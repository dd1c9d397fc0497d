//! Configuration loading for container options

#![cfg(feature = "config")]

use epinephrine::prelude::*;

trait Node: Send + Sync {}
contract!(dyn Node);

struct Recursive;
impl Node for Recursive {}

impl Injectable for Recursive {
    fn implementation() -> ImplementationType {
        ImplementationType::builder::<Self>()
            .constructor(|_child: std::sync::Arc<dyn Node>| Recursive)
            .implements::<dyn Node>(|it| it)
            .build()
    }
}

#[test]
fn test_options_from_toml() {
    let options = ContainerOptions::from_toml("max_resolution_depth = 8").unwrap();
    assert_eq!(options.max_resolution_depth, 8);
}

#[test]
fn test_options_from_json() {
    let options = ContainerOptions::from_json(r#"{ "max_resolution_depth": 32 }"#).unwrap();
    assert_eq!(options.max_resolution_depth, 32);
}

#[test]
fn test_missing_fields_use_defaults() {
    let options = ContainerOptions::from_toml("").unwrap();
    assert_eq!(options, ContainerOptions::default());
}

#[test]
fn test_invalid_config() {
    assert!(matches!(
        ContainerOptions::from_toml("max_resolution_depth = \"deep\""),
        Err(DiError::ConfigError(_))
    ));
    assert!(matches!(
        ContainerOptions::from_json("{"),
        Err(DiError::ConfigError(_))
    ));
}

#[test]
fn test_loaded_depth_limit_applies() {
    let options = ContainerOptions::from_toml("max_resolution_depth = 8").unwrap();
    let mut builder = ContainerBuilder::with_options(options);
    builder.register_transient::<dyn Node, Recursive>().unwrap();
    let container = builder.build();

    match container.resolve::<dyn Node>() {
        Err(DiError::DepthExceeded { limit, .. }) => assert_eq!(limit, 8),
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("recursive resolution should fail"),
    }
}
