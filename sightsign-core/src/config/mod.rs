//! Configuration types
//!
//! Operator settings shared by the controller, playback and the binary's
//! settings file.

pub mod settings;

pub use settings::*;
