//! Screen to arm workspace transform
//!
//! Screen points are centred on the screen, normalised by half the
//! smaller screen dimension, and swapped onto the arm's axes (screen Y
//! drives arm X). Every move is then routed through polar form so the arm
//! always approaches a point along the same rotation/extension path,
//! which keeps joint backlash consistent.

/// Arm X gain relative to arm Y
pub const SCALE_X: f64 = 1.2;
/// Arm Y gain
pub const SCALE_Y: f64 = 1.0;

/// Normalised height with the pen lowered
pub const PEN_DOWN_Z: f64 = 0.0;
/// Normalised height with the pen lifted
pub const PEN_UP_Z: f64 = 0.4;

/// Screen to workspace mapping
///
/// Fixed for the session once the controller is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkspaceTransform {
    /// Screen X that maps to arm Y = 0
    pub x_shift: f64,
    /// Screen Y that maps to arm X = 0
    pub y_shift: f64,
    /// Pixels per normalised workspace unit
    pub min_dimension_half: f64,
}

impl WorkspaceTransform {
    /// Transform centred on a screen of the given size
    pub fn for_screen(width: f64, height: f64) -> Self {
        Self {
            x_shift: width / 2.0,
            y_shift: height / 2.0,
            min_dimension_half: width.min(height) / 2.0,
        }
    }

    /// Map a screen point to workspace `(x, y)`
    pub fn to_workspace(&self, point: crate::Point2D, scale: f64) -> (f64, f64) {
        let x = (point.y - self.y_shift) / self.min_dimension_half * scale * SCALE_X;
        let y = (point.x - self.x_shift) / self.min_dimension_half * scale * SCALE_Y;
        (x, y)
    }

    /// Map a screen point straight to its polar command
    pub fn to_polar(&self, point: crate::Point2D, scale: f64) -> PolarCommand {
        let (x, y) = self.to_workspace(point, scale);
        PolarCommand::from_cartesian(x, y)
    }
}

/// Backlash-aware move target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarCommand {
    /// Extension, never negative
    pub r: f64,
    /// Rotation in radians, `atan2(x, y)`
    pub t: f64,
}

impl PolarCommand {
    /// Polar form of workspace `(x, y)`
    ///
    /// The angle is measured from the arm's Y axis (`atan2(x, y)`), which
    /// matches the arm's right-handed mount.
    pub fn from_cartesian(x: f64, y: f64) -> Self {
        Self {
            r: (x * x + y * y).sqrt(),
            t: x.atan2(y),
        }
    }

    /// Back to workspace `(x, y)`
    pub fn to_cartesian(&self) -> (f64, f64) {
        (self.r * self.t.sin(), self.r * self.t.cos())
    }
}

/// Arm height for a pen state, trimmed by `z_shift`
pub fn z_for(pen_down: bool, z_shift: f64) -> f64 {
    let z = if pen_down { PEN_DOWN_Z } else { PEN_UP_Z };
    z - z_shift
}
