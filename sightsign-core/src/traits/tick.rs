//! Periodic tick source

use core::time::Duration;

/// Timer that drives playback
///
/// Implementations deliver ticks to the playback owner. A tick that would
/// fire while the previous one is still being handled is dropped.
pub trait TickSource {
    /// Start (or restart) ticking every `interval`
    fn start(&mut self, interval: Duration);

    /// Stop ticking. Idempotent.
    fn stop(&mut self);

    /// Whether ticks are currently being delivered
    fn is_running(&self) -> bool;
}
