//! Seams between the core and its collaborators
//!
//! These traits define the interface between the motion/playback logic
//! and arm backends, the controller, and timer implementations.

pub mod arm;
pub mod plotter;
pub mod tick;

pub use arm::{Arm, ArmError};
pub use plotter::Plotter;
pub use tick::TickSource;
