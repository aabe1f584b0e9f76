//! Arm-agnostic core logic for SightSign
//!
//! This crate contains everything between the stroke source and the arm
//! backends that does not depend on a particular serial link:
//!
//! - Stroke geometry (points, strokes, bounds)
//! - Screen to arm workspace transform and polar re-parameterization
//! - Open-loop pacing math
//! - Arm, plotter and tick source traits
//! - Connection state machine
//! - Arm controller facade
//! - Calibration routines
//! - Playback state machine
//! - Settings types

#![deny(unsafe_code)]

pub mod calibration;
pub mod config;
pub mod controller;
pub mod ink;
pub mod motion;
pub mod playback;
pub mod state;
pub mod traits;

pub use controller::{ArmController, SettingsSink};
pub use ink::{Bounds, Point2D, PointArityError, Stroke};
pub use traits::{Arm, ArmError, Plotter, TickSource};
