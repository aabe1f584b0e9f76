//! Arm backends
//!
//! Each backend implements [`sightsign_core::Arm`] and owns the unit
//! conversion from normalised workspace coordinates to its firmware's
//! fields.

pub mod brief;
pub mod swift;

pub use brief::BriefArm;
pub use swift::SwiftArm;
