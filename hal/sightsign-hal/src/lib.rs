//! SightSign Hardware Abstraction Layer
//!
//! This crate defines the serial traits the arm drivers are written
//! against. Concrete links (a host serial port, a test double) implement
//! them, so the same driver code runs against real hardware and in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  sightsign-drivers (transport, arms)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sightsign-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ sightsign-hal-│       │  in-memory    │
//! │  serialport   │       │  test links   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`uart::SerialOpen`] - Opening a named port into a tx/rx pair

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

// Re-export key traits at crate root for convenience
pub use uart::{SerialOpen, UartConfig, UartRx, UartTx};
