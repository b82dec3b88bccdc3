//! Concrete lint rules built on the core engine.
//!
//! Each rule is a [`gradlint_core::Rule`] implementation plus a serde-backed
//! configuration struct, so rule settings can be loaded from TOML.

mod required_plugin;

pub use required_plugin::{RequiredPluginConfig, RequiredPluginRule};
