//! Arm driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in sightsign-core for the supported arms:
//!
//! - Framed serial transport with asynchronous firmware error reports
//! - uArm Metal backend (Brief bytecode, open-loop pacing)
//! - uArm Swift Pro backend (G-code lines)
//! - Loopback serial link for dry runs and tests
//! - Thread-sleep delay

#![deny(unsafe_code)]

pub mod arm;
pub mod delay;
pub mod loopback;
pub mod transport;

pub use arm::{BriefArm, SwiftArm};
pub use delay::StdDelay;
pub use loopback::Loopback;
pub use transport::{FramedTransport, TransportError};
