//! Playback state machine
//!
//! Tracks the stroke and point being animated, drives the plotter and the
//! tick source, and keeps the animated output for the renderer.

use core::time::Duration;

use tracing::{debug, info};

use crate::ink::{Point2D, Stroke};
use crate::traits::{ArmError, Plotter, TickSource};

/// Points closer than this on both axes are coalesced (pixels)
pub const COALESCE_THRESHOLD: f64 = 1.0;

/// Strokes finishing with fewer points traversed never wait for a click
pub const SHORT_STROKE_POINTS: usize = 3;

/// Playback phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing loaded or playback finished
    #[default]
    Idle,
    /// Pen up at a stroke start, next tick lowers it
    MovingToStrokeStart,
    /// Pen down, one point per tick
    AnimatingPoint,
    /// Stroke finished, ticks stopped until the dot is clicked
    WaitingForClick,
    /// Lifting and travelling to the next stroke
    AdvancingStroke,
}

impl PlaybackState {
    /// Check if ticks should advance the animation
    pub fn accepts_ticks(&self) -> bool {
        matches!(
            self,
            PlaybackState::MovingToStrokeStart | PlaybackState::AnimatingPoint
        )
    }
}

/// Playback over a tick source
#[derive(Debug)]
pub struct Playback<T: TickSource> {
    /// Timer driving `tick`
    ticker: T,
    /// Tick period
    interval: Duration,
    /// Strokes being written (never empty ones)
    strokes: Vec<Stroke>,
    /// Write every stroke without waiting for clicks
    stamp: bool,
    /// Current phase
    state: PlaybackState,
    /// Stroke being written
    stroke_index: usize,
    /// Last point index visited in the current stroke
    point_index: usize,
    /// Output strokes for the renderer
    animated: Vec<Stroke>,
    /// An output stroke is open for the current stroke
    animating: bool,
    /// Where the dot is
    dot: Option<Point2D>,
}

impl<T: TickSource> Playback<T> {
    /// Create an idle playback
    pub fn new(ticker: T, interval: Duration) -> Self {
        Self {
            ticker,
            interval,
            strokes: Vec::new(),
            stamp: false,
            state: PlaybackState::Idle,
            stroke_index: 0,
            point_index: 0,
            animated: Vec::new(),
            animating: false,
            dot: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// True from `start` until the last stroke is written or `reset`
    pub fn is_running(&self) -> bool {
        self.state != PlaybackState::Idle
    }

    pub fn is_stamp(&self) -> bool {
        self.stamp
    }

    /// Current dot position
    pub fn dot(&self) -> Option<Point2D> {
        self.dot
    }

    /// Strokes drawn so far, in order
    pub fn animated_strokes(&self) -> &[Stroke] {
        &self.animated
    }

    /// Index of the stroke being written
    pub fn stroke_index(&self) -> usize {
        self.stroke_index
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the tick period, restarting a running ticker
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
        if self.ticker.is_running() {
            self.ticker.start(interval);
        }
    }

    /// Lift the pen, move to the first stroke and start ticking
    ///
    /// Empty strokes are dropped. Ignored while already running.
    pub fn start<P: Plotter>(
        &mut self,
        strokes: Vec<Stroke>,
        stamp: bool,
        plotter: &mut P,
    ) -> Result<(), ArmError> {
        if self.is_running() {
            debug!("playback already running");
            return Ok(());
        }

        let strokes: Vec<Stroke> = strokes.into_iter().filter(|s| !s.is_empty()).collect();
        let Some(first) = strokes.first().and_then(Stroke::first) else {
            debug!("nothing to play");
            return Ok(());
        };

        info!(
            "playing {} strokes ({})",
            strokes.len(),
            if stamp { "stamp" } else { "write" }
        );
        self.strokes = strokes;
        self.stamp = stamp;
        self.stroke_index = 0;
        self.point_index = 0;
        self.animated.clear();
        self.animating = false;
        self.state = PlaybackState::MovingToStrokeStart;

        let result = plotter
            .set_pen_down(false)
            .and_then(|_| self.visit(plotter, first));
        if result.is_ok() {
            self.ticker.start(self.interval);
        } else {
            self.reset();
        }
        result
    }

    /// Advance the animation by one tick
    ///
    /// An error aborts playback.
    pub fn tick<P: Plotter>(&mut self, plotter: &mut P) -> Result<(), ArmError> {
        if !self.state.accepts_ticks() {
            return Ok(());
        }
        let result = self.step(plotter);
        if result.is_err() {
            self.reset();
        }
        result
    }

    /// Operator click on the dot
    ///
    /// When waiting at the end of a stroke, travel to the next stroke and
    /// resume ticking. Ignored otherwise.
    pub fn advance<P: Plotter>(&mut self, plotter: &mut P) -> Result<(), ArmError> {
        if self.state != PlaybackState::WaitingForClick {
            return Ok(());
        }
        let result = self.next_stroke(plotter);
        match result {
            Ok(()) => self.ticker.start(self.interval),
            Err(_) => self.reset(),
        }
        result
    }

    /// Stop ticking and clear the animated output
    ///
    /// The pen is left where it is.
    pub fn reset(&mut self) {
        self.ticker.stop();
        self.strokes.clear();
        self.state = PlaybackState::Idle;
        self.stroke_index = 0;
        self.point_index = 0;
        self.animated.clear();
        self.animating = false;
        self.dot = None;
    }

    fn step<P: Plotter>(&mut self, plotter: &mut P) -> Result<(), ArmError> {
        let stroke_len = self.strokes[self.stroke_index].len();

        if !self.animating {
            plotter.set_pen_down(true)?;
            let first = self.strokes[self.stroke_index].points[0];
            self.animated.push(Stroke::new(vec![first]));
            self.animating = true;
            self.state = PlaybackState::AnimatingPoint;
        }

        self.point_index += 1;
        if self.point_index >= stroke_len {
            return self.finish_stroke(plotter);
        }

        let stroke = &self.strokes[self.stroke_index];
        let previous = stroke.points[self.point_index - 1];
        let mut point = stroke.points[self.point_index];
        while point.within(&previous, COALESCE_THRESHOLD) {
            self.point_index += 1;
            match stroke.point(self.point_index) {
                Some(next) => point = next,
                None => break,
            }
        }

        self.visit(plotter, point)?;
        if let Some(output) = self.animated.last_mut() {
            output.points.push(point);
        }
        Ok(())
    }

    fn finish_stroke<P: Plotter>(&mut self, plotter: &mut P) -> Result<(), ArmError> {
        let short = self.point_index < SHORT_STROKE_POINTS;
        let last = self.stroke_index + 1 >= self.strokes.len();
        self.animating = false;

        if last {
            self.ticker.stop();
            plotter.set_pen_down(false)?;
            self.state = PlaybackState::Idle;
            info!("playback finished");
            return Ok(());
        }

        if self.stamp || short {
            self.next_stroke(plotter)
        } else {
            self.ticker.stop();
            plotter.set_pen_down(false)?;
            self.state = PlaybackState::WaitingForClick;
            debug!("waiting for click after stroke {}", self.stroke_index);
            Ok(())
        }
    }

    fn next_stroke<P: Plotter>(&mut self, plotter: &mut P) -> Result<(), ArmError> {
        self.state = PlaybackState::AdvancingStroke;
        self.stroke_index += 1;
        self.point_index = 0;
        self.animating = false;

        plotter.set_pen_down(false)?;
        let start = self.strokes[self.stroke_index].points[0];
        self.visit(plotter, start)?;
        self.state = PlaybackState::MovingToStrokeStart;
        Ok(())
    }

    fn visit<P: Plotter>(&mut self, plotter: &mut P, point: Point2D) -> Result<(), ArmError> {
        plotter.move_to(point)?;
        self.dot = Some(point);
        Ok(())
    }
}
