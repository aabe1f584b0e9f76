//! Operator session
//!
//! Owns the arm controller and the playback, and runs the loop that
//! handles ticks and operator input one at a time.

use std::sync::mpsc::{Receiver, SyncSender};

use anyhow::bail;
use sightsign_core::calibration;
use sightsign_core::playback::{Playback, PlaybackState};
use sightsign_core::{Arm, ArmController, Bounds, Stroke};
use tracing::{debug, info};

use crate::tasks::{Input, ThreadTicker};

/// One operator session over one arm
pub struct Session<A: Arm> {
    controller: ArmController<A>,
    playback: Playback<ThreadTicker>,
    inputs: Receiver<Input>,
}

impl<A: Arm> Session<A> {
    /// `tx` feeds `inputs`; the tick thread sends through it
    pub fn new(controller: ArmController<A>, tx: SyncSender<Input>, inputs: Receiver<Input>) -> Self {
        let interval = controller.animation_interval();
        Self {
            controller,
            playback: Playback::new(ThreadTicker::new(tx), interval),
            inputs,
        }
    }

    pub fn controller(&self) -> &ArmController<A> {
        &self.controller
    }

    pub fn playback(&self) -> &Playback<ThreadTicker> {
        &self.playback
    }

    /// Play `strokes` until the last one is written or the operator quits
    ///
    /// In write mode (`stamp == false`) each finished stroke waits for a
    /// click. Once operator input has ended, a wait for a click stops
    /// playback instead; stamp mode never waits and runs to the end.
    pub fn play(&mut self, strokes: Vec<Stroke>, stamp: bool) -> anyhow::Result<()> {
        self.playback.start(strokes, stamp, &mut self.controller)?;
        if !self.playback.is_running() {
            info!("signature has no points");
            return Ok(());
        }

        let mut input_closed = false;
        let mut state = self.playback.state();
        while self.playback.is_running() {
            let Ok(input) = self.inputs.recv() else {
                debug!("input channel closed");
                self.playback.reset();
                break;
            };
            match input {
                Input::EndOfInput => input_closed = true,
                input => self.handle(input)?,
            }

            let now = self.playback.state();
            if now == PlaybackState::WaitingForClick {
                if input_closed {
                    info!("operator input ended, stopping playback");
                    self.playback.reset();
                    break;
                }
                if state != now {
                    info!(
                        "stroke {} written, press Enter to continue",
                        self.playback.stroke_index() + 1
                    );
                }
            }
            state = now;
        }
        Ok(())
    }

    fn handle(&mut self, input: Input) -> anyhow::Result<()> {
        match input {
            Input::Tick => self.playback.tick(&mut self.controller)?,
            Input::Click => self.playback.advance(&mut self.controller)?,
            Input::ZShift(delta) => self.controller.adjust_z_shift(delta)?,
            Input::Quit => {
                info!("playback stopped by operator");
                self.playback.reset();
            }
            Input::EndOfInput => {}
        }
        Ok(())
    }

    /// Draw the calibration circle
    pub fn circle(&mut self) -> anyhow::Result<()> {
        info!("drawing calibration circle");
        calibration::circle_test(&mut self.controller)?;
        Ok(())
    }

    /// Dot the corners of the strokes' bounding box
    pub fn corners(&mut self, strokes: &[Stroke]) -> anyhow::Result<()> {
        let Some(bounds) = Bounds::of(strokes) else {
            bail!("signature has no points");
        };
        info!(
            "showing corners of {:.0}x{:.0} px box",
            bounds.width(),
            bounds.height()
        );
        calibration::show_corners(&mut self.controller, &bounds)?;
        Ok(())
    }

    /// Lift the pen and park
    pub fn home(&mut self) -> anyhow::Result<()> {
        self.controller.home()?;
        Ok(())
    }

    /// Stop playback and release the arm, pen first
    pub fn close(mut self) {
        self.playback.reset();
        self.controller.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;
    use sightsign_core::config::Settings;
    use sightsign_core::Point2D;
    use sightsign_drivers::{BriefArm, Loopback};
    use sightsign_protocol::brief::opcode;
    use std::sync::mpsc;
    use std::thread;

    #[derive(Debug, Default)]
    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    type TestArm = BriefArm<Loopback, NoDelay>;

    fn session(link: &Loopback) -> (Session<TestArm>, SyncSender<Input>) {
        let mut settings = Settings::default();
        settings.playback.animation_interval_ms = 1;
        let arm = BriefArm::new(link.clone(), Some("loop".into()), NoDelay);
        let mut controller = ArmController::new(arm, settings);
        assert!(controller.connect());

        let (tx, rx) = mpsc::sync_channel(0);
        (Session::new(controller, tx.clone(), rx), tx)
    }

    /// Two four-point strokes, points 10 px apart
    fn signature() -> Vec<Stroke> {
        let stroke = |y: f64| {
            (0..4)
                .map(|i| Point2D::new(500.0 + 10.0 * f64::from(i), y))
                .collect::<Stroke>()
        };
        vec![stroke(400.0), stroke(450.0)]
    }

    fn rtz_frames(link: &Loopback) -> usize {
        link.frames()
            .iter()
            .filter(|f| f.payload.len() >= 2 && f.payload[f.payload.len() - 2] == opcode::RTZ)
            .count()
    }

    #[test]
    fn test_stamp_runs_to_completion() {
        let link = Loopback::new();
        let (mut s, _tx) = session(&link);
        s.play(signature(), true).unwrap();

        assert_eq!(s.playback().state(), PlaybackState::Idle);
        assert!(!s.controller().is_pen_down());
        // lift + travel, 4 per stroke, lift + travel between, final lift
        assert_eq!(rtz_frames(&link), 2 + 4 + 2 + 4 + 1);
    }

    #[test]
    fn test_write_waits_for_clicks() {
        let link = Loopback::new();
        let (mut s, tx) = session(&link);
        let clicker = thread::spawn(move || while tx.send(Input::Click).is_ok() {});

        s.play(signature(), false).unwrap();
        assert_eq!(s.playback().state(), PlaybackState::Idle);
        drop(s);
        clicker.join().unwrap();

        // The pause adds a lift before the click's own lift + travel
        assert_eq!(rtz_frames(&link), 2 + 4 + 1 + 2 + 4 + 1);
    }

    #[test]
    fn test_quit_stops_playback() {
        let link = Loopback::new();
        let (mut s, tx) = session(&link);
        let quitter = thread::spawn(move || {
            let _ = tx.send(Input::Quit);
        });

        s.play(signature(), false).unwrap();
        quitter.join().unwrap();
        assert!(!s.playback().is_running());
        assert!(s.playback().animated_strokes().is_empty());
    }

    #[test]
    fn test_stamp_ignores_end_of_input() {
        let link = Loopback::new();
        let (mut s, tx) = session(&link);
        let closer = thread::spawn(move || {
            let _ = tx.send(Input::EndOfInput);
        });

        s.play(signature(), true).unwrap();
        assert_eq!(s.playback().state(), PlaybackState::Idle);
        assert_eq!(s.playback().animated_strokes().len(), 2);
        assert_eq!(rtz_frames(&link), 2 + 4 + 2 + 4 + 1);
        // The end-of-input send may still be pending if playback won the race
        drop(s);
        closer.join().unwrap();
    }

    #[test]
    fn test_write_stops_at_pause_after_end_of_input() {
        let link = Loopback::new();
        let (mut s, tx) = session(&link);
        let closer = thread::spawn(move || {
            let _ = tx.send(Input::EndOfInput);
        });

        s.play(signature(), false).unwrap();
        closer.join().unwrap();
        assert!(!s.playback().is_running());
        // First stroke written and the pen lifted, second never started
        assert_eq!(rtz_frames(&link), 2 + 4 + 1);
    }

    #[test]
    fn test_empty_signature() {
        let link = Loopback::new();
        let (mut s, _tx) = session(&link);
        s.play(vec![Stroke::default()], false).unwrap();
        assert!(!s.playback().is_running());
        assert_eq!(rtz_frames(&link), 0);
        assert!(s.corners(&[]).is_err());
    }

    #[test]
    fn test_close_lifts_pen_before_detach() {
        let link = Loopback::new();
        let (mut s, _tx) = session(&link);
        s.circle().unwrap();
        s.close();

        let codes: Vec<u8> = link
            .frames()
            .iter()
            .map(|f| f.payload[f.payload.len() - 2])
            .collect();
        assert_eq!(codes.last(), Some(&opcode::DETACH));
        assert_eq!(codes[codes.len() - 2], opcode::RTZ);
    }
}
