//! Background threads
//!
//! Each thread feeds the session loop through one rendezvous channel of
//! [`Input`]s. The loop handles one input at a time.

pub mod stdin;
pub mod tick;

pub use stdin::spawn_stdin;
pub use tick::ThreadTicker;

/// Z trim change per `+`/`-` key
pub const Z_SHIFT_STEP: f64 = 0.02;

/// Something for the session loop to handle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// Playback timer fired
    Tick,
    /// Operator clicked the dot
    Click,
    /// Operator trimmed the pen height
    ZShift(f64),
    /// Operator asked to stop
    Quit,
    /// No more operator input will arrive
    EndOfInput,
}
