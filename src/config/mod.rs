// src/config/mod.rs

//! Configuration: model, TOML loading, validation.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{BuildConfig, ToolsConfig, VendorConfig};
pub use validate::validate;
