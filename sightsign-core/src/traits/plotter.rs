//! Screen-space drawing surface
//!
//! Playback and calibration drive anything that can move a pen to a
//! screen point and raise or lower it. The arm controller is the real
//! implementation; tests use recorders.

use crate::ink::Point2D;
use crate::traits::ArmError;

/// A pen that moves in screen coordinates
pub trait Plotter {
    /// Move to `point` with the current pen state
    fn move_to(&mut self, point: Point2D) -> Result<(), ArmError>;

    /// Raise or lower the pen at the last visited point
    fn set_pen_down(&mut self, down: bool) -> Result<(), ArmError>;
}
