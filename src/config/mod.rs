//! Configuration for resunpack runs
//!
//! Provides types and parsing for `resunpack.toml` configuration.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
