//! Arm motion math
//!
//! Screen to workspace mapping, polar re-parameterization and open-loop
//! pacing.

pub mod pacing;
pub mod workspace;

pub use pacing::{distance_units, pacing_delay_ms, Position3D, DISTANCE_SCALE, UNITS_PER_MS};
pub use workspace::{z_for, PolarCommand, WorkspaceTransform, PEN_DOWN_Z, PEN_UP_Z};
