//! Calibration routines
//!
//! Thin callers of the plotter API used to check the arm against the
//! screen: a double circle that makes backlash visible, and a dot at each
//! corner of a signature's bounding box.

use core::f64::consts::PI;

use tracing::info;

use crate::ink::{Bounds, Point2D};
use crate::traits::{ArmError, Plotter};

/// Circle radius in pixels
pub const CIRCLE_RADIUS: f64 = 300.0;
/// Circle centre in pixels
pub const CIRCLE_CENTRE: Point2D = Point2D::new(450.0, 350.0);
/// Angle step between circle points in radians
pub const CIRCLE_STEP: f64 = 0.1;

/// Points of the calibration circle, two full turns
pub fn circle_points() -> impl Iterator<Item = Point2D> {
    // Accumulated angle, so rounding drift sets the final point count
    core::iter::successors(Some(0.0f64), |a| Some(a + CIRCLE_STEP))
        .take_while(|a| *a < PI * 4.0)
        .map(|a| {
            Point2D::new(
                a.cos() * CIRCLE_RADIUS + CIRCLE_CENTRE.x,
                a.sin() * CIRCLE_RADIUS + CIRCLE_CENTRE.y,
            )
        })
}

/// Trace the calibration circle twice
///
/// The first point is reached with the pen up, then the pen is lowered
/// for the rest of the path and lifted at the end.
pub fn circle_test<P: Plotter>(plotter: &mut P) -> Result<(), ArmError> {
    info!("circle test");
    plotter.set_pen_down(false)?;
    let mut pen_down = false;
    for point in circle_points() {
        if !pen_down {
            plotter.move_to(point)?;
            plotter.set_pen_down(true)?;
            pen_down = true;
        }
        plotter.move_to(point)?;
    }
    plotter.set_pen_down(false)
}

/// Dot each corner of `bounds`, clockwise from top-left
pub fn show_corners<P: Plotter>(plotter: &mut P, bounds: &Bounds) -> Result<(), ArmError> {
    info!(
        "showing corners {}x{} at ({}, {})",
        bounds.width(),
        bounds.height(),
        bounds.left,
        bounds.top
    );
    for corner in bounds.corners() {
        plotter.set_pen_down(false)?;
        plotter.move_to(corner)?;
        plotter.set_pen_down(true)?;
    }
    plotter.set_pen_down(false)
}
