//! Configuration schema, discovery, and validation for the flock engine.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{discover_and_load, load_config},
    schema::{FlockConfig, SessionSettings, StoreSettings},
    validate::validate,
};
