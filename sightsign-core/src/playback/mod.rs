//! Signature playback
//!
//! Walks a dot, and the arm with it, through an ordered set of strokes
//! one tick at a time. Two modes:
//!
//! - Stamp: every stroke is written back to back without interaction
//! - Write: playback pauses at the end of each stroke until the operator
//!   clicks the dot
//!
//! Short strokes (fewer than three points traversed) never wait for a
//! click.

pub mod player;

pub use player::{Playback, PlaybackState, COALESCE_THRESHOLD, SHORT_STROKE_POINTS};
