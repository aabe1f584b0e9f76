//! Open-loop move pacing
//!
//! The arm never reports when a move finishes. After each move the host
//! sleeps for a dead-reckoned travel time proportional to the distance
//! from the previous target.

/// Workspace units to distance units
pub const DISTANCE_SCALE: f64 = 10000.0;

/// Distance units the arm covers per millisecond
pub const UNITS_PER_MS: f64 = 5.0;

/// A commanded arm target in normalised workspace units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3D {
    pub const ORIGIN: Position3D = Position3D {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`
    pub fn distance(&self, other: &Position3D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Distance between two targets in whole distance units (truncated)
pub fn distance_units(from: &Position3D, to: &Position3D) -> u32 {
    // float to int casts saturate, NaN becomes 0
    (from.distance(to) * DISTANCE_SCALE) as u32
}

/// Sleep owed after a move covering `units`, in whole milliseconds
pub fn pacing_delay_ms(units: u32) -> u32 {
    (f64::from(units) / UNITS_PER_MS) as u32
}
