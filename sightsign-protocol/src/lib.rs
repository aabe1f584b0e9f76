//! SightSign arm wire protocols
//!
//! This crate defines everything that crosses the serial link between the
//! host and a uArm. It holds no I/O of its own.
//!
//! # Brief over Reflecta (uArm Metal)
//!
//! Symbolic programs such as `"22000 1800 5000 3000 rtz!!"` are compiled by
//! [`brief::Compiler`] into Brief bytecode. The host appends one control
//! byte and ships the result as the payload of a Reflecta-style frame:
//! ```text
//! ┌───────┬─────┬────────┬──────────────────────┬──────────┐
//! │ START │ SEQ │ LENGTH │ PAYLOAD              │ CHECKSUM │
//! │ 1B    │ 1B  │ 1B     │ bytecode + control   │ 1B       │
//! └───────┴─────┴────────┴──────────────────────┴──────────┘
//! ```
//! A control byte of `0` executes the program immediately, anything else
//! appends it to the firmware-side dictionary.
//!
//! # G-code lines (uArm Swift Pro)
//!
//! The Swift firmware takes numbered text commands, built by [`gcode`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod brief;
pub mod frame;
pub mod gcode;
pub mod messages;

pub use brief::{Compiler, CompileError, Control, Op, Program};
pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_PAYLOAD_SIZE};
pub use gcode::{SwiftCommand, SwiftMode};
pub use messages::{FirmwareError, FirmwareReport};
