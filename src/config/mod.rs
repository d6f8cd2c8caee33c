// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - `model.rs`: the TOML-backed data model with defaults.
//! - `loader.rs`: reading files and the default-path fallback.
//! - `validate.rs`: turning a raw tree into a validated [`AppConfig`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    AppConfig, DownloadSection, PathsSection, PitchSection, RawConfigFile, SeparationSection,
    ToolsSection, UiSection,
};
pub use validate::validate_raw_config;
