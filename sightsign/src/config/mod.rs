//! Settings file loading and saving
//!
//! Settings are TOML on disk, parsed with the `toml` crate into the core
//! settings types.

pub mod loader;

pub use loader::{load_settings, settings_sink, DEFAULT_SETTINGS_PATH};
