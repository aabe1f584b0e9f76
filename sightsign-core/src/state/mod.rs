//! Arm connection state
//!
//! The controller's link to the arm is explicit, finite and
//! deterministic. Pen state is tracked separately and survives
//! reconnects.

pub mod events;
pub mod machine;

pub use events::{ArmEvent, ConnectionEvent};
pub use machine::ConnectionState;
