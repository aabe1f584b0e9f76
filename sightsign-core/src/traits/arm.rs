//! Arm backend trait
//!
//! This trait abstracts over the arm protocols (Brief bytecode over
//! Reflecta frames, Swift Pro G-code). Each backend owns its own unit
//! conversion from normalised workspace coordinates.

use sightsign_protocol::CompileError;

/// Errors raised by arm backends
///
/// Only [`ArmError::Compile`] should reach the playback layer. The others
/// are caught at the connect boundary or logged by the backend.
#[derive(Debug, thiserror::Error)]
pub enum ArmError {
    /// No device could be found or opened
    #[error("arm port unavailable: {0}")]
    PortUnavailable(String),
    /// The port opened but the handshake failed
    #[error("arm handshake failed: {0}")]
    ConnectFailure(String),
    /// A move program did not compile
    #[error("move program rejected: {0}")]
    Compile(#[from] CompileError),
    /// Write or read failure on an open link
    #[error("arm link failed: {0}")]
    Transport(String),
}

/// A robot arm that accepts workspace moves
pub trait Arm {
    /// Open the link and run the attach handshake
    fn connect(&mut self) -> Result<(), ArmError>;

    /// Release the joints and close the link
    fn disconnect(&mut self) -> Result<(), ArmError>;

    /// Move to normalised workspace `(x, y, z)`
    ///
    /// Blocks for the estimated travel time. Link failures are logged by
    /// the backend and the move is treated as done. `scara` selects the
    /// rotation/elevation encoding where the backend supports it.
    fn move_to(&mut self, x: f64, y: f64, z: f64, scara: bool) -> Result<(), ArmError>;

    /// Whether the link is open
    fn is_connected(&self) -> bool;
}
