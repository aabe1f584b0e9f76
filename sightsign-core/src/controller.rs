//! Arm controller
//!
//! Owns the pen state, the last visited screen point and the height trim,
//! and turns screen moves into workspace moves on the arm backend. All
//! arm traffic from playback and calibration goes through here.
//!
//! When the arm is not connected (robot control off, or connect failed)
//! moves and pen changes still update local state and notify observers,
//! but nothing is sent.

use core::time::Duration;

use tracing::{debug, info, warn};

use crate::config::settings::is_positive;
use crate::config::Settings;
use crate::ink::Point2D;
use crate::motion::{z_for, WorkspaceTransform};
use crate::state::{ArmEvent, ConnectionEvent, ConnectionState};
use crate::traits::{Arm, ArmError, Plotter};

/// Callback that persists changed settings
pub type SettingsSink = Box<dyn FnMut(&Settings) + Send>;

type Observer = Box<dyn FnMut(ArmEvent) + Send>;

/// Facade over one arm backend
pub struct ArmController<A: Arm> {
    arm: A,
    state: ConnectionState,
    pen_down: bool,
    last_point: Point2D,
    transform: WorkspaceTransform,
    settings: Settings,
    observers: Vec<Observer>,
    sink: Option<SettingsSink>,
}

impl<A: Arm> ArmController<A> {
    /// Create a controller; does not connect
    pub fn new(arm: A, settings: Settings) -> Self {
        Self {
            arm,
            state: ConnectionState::Disconnected,
            pen_down: false,
            last_point: Point2D::ORIGIN,
            transform: settings.screen.transform(),
            settings,
            observers: Vec::new(),
            sink: None,
        }
    }

    /// Route settings changes to `sink`
    pub fn with_settings_sink(mut self, sink: SettingsSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Register an observer for connection and pen changes
    pub fn subscribe(&mut self, observer: impl FnMut(ArmEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_pen_down(&self) -> bool {
        self.pen_down
    }

    pub fn last_point(&self) -> Point2D {
        self.last_point
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn animation_interval(&self) -> Duration {
        self.settings.playback.interval()
    }

    /// The backend, for inspection
    pub fn arm(&self) -> &A {
        &self.arm
    }

    /// Connect to the arm
    ///
    /// Failures are logged and leave the controller disconnected. Returns
    /// whether the arm is connected afterwards.
    pub fn connect(&mut self) -> bool {
        if self.state.is_connected() {
            return true;
        }

        let event = match self.arm.connect() {
            Ok(()) => {
                info!("arm connected");
                ConnectionEvent::ConnectSucceeded
            }
            Err(e) => {
                warn!("could not connect to arm: {}", e);
                ConnectionEvent::ConnectFailed
            }
        };
        self.apply(event);
        self.state.is_connected()
    }

    /// Lift the pen, then release the arm
    ///
    /// Does nothing when not connected.
    pub fn disconnect(&mut self) {
        if !self.state.is_connected() {
            return;
        }

        if let Err(e) = self.set_pen_down(false) {
            warn!("pen lift before disconnect failed: {}", e);
        }
        if let Err(e) = self.arm.disconnect() {
            warn!("arm disconnect failed: {}", e);
        }
        info!("arm disconnected");
        self.apply(ConnectionEvent::Disconnect);
    }

    /// Shut down; the pen is lifted before the link closes
    pub fn close(&mut self) {
        self.disconnect();
    }

    /// Raise or lower the pen, re-issuing a move to the last point
    pub fn set_pen_down(&mut self, down: bool) -> Result<(), ArmError> {
        debug!("pen {}", if down { "down" } else { "up" });
        if self.pen_down != down {
            self.pen_down = down;
            self.notify(ArmEvent::PenChanged(down));
        }
        self.move_to(self.last_point)
    }

    /// Move to a screen point with the current pen state
    pub fn move_to(&mut self, point: Point2D) -> Result<(), ArmError> {
        self.last_point = point;
        if !self.state.is_connected() {
            return Ok(());
        }

        let cfg = &self.settings.arm;
        let polar = self.transform.to_polar(point, cfg.workspace_scale);
        let (x, y) = polar.to_cartesian();
        let z = z_for(self.pen_down, cfg.z_shift);

        match self.arm.move_to(x, y, z, cfg.scara_mode) {
            Err(ArmError::Compile(e)) => Err(ArmError::Compile(e)),
            Err(e) => {
                warn!("move to ({}, {}) not delivered: {}", point.x, point.y, e);
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    /// Set the height trim and show it at the last point
    pub fn set_z_shift(&mut self, z_shift: f64) -> Result<(), ArmError> {
        if !z_shift.is_finite() {
            warn!("ignoring z_shift {}", z_shift);
            return Ok(());
        }
        self.settings.arm.z_shift = z_shift;
        info!("z_shift {}", z_shift);
        self.persist();
        self.move_to(self.last_point)
    }

    /// Nudge the height trim by `delta`
    pub fn adjust_z_shift(&mut self, delta: f64) -> Result<(), ArmError> {
        self.set_z_shift(self.settings.arm.z_shift + delta)
    }

    /// Set the workspace gain; takes effect on the next move
    pub fn set_workspace_scale(&mut self, scale: f64) {
        if !is_positive(scale) {
            warn!("ignoring workspace scale {}", scale);
            return;
        }
        self.settings.arm.workspace_scale = scale;
        self.persist();
    }

    /// Set the playback tick period (clamped to at least 1 ms)
    pub fn set_animation_interval(&mut self, interval_ms: u32) {
        self.settings.playback.animation_interval_ms = interval_ms.max(1);
        self.persist();
    }

    /// Switch between rotation/elevation and cartesian move encoding
    pub fn set_scara_mode(&mut self, scara: bool) {
        self.settings.arm.scara_mode = scara;
        self.persist();
    }

    /// Enable or disable arm control, connecting or disconnecting
    pub fn set_robot_control(&mut self, enabled: bool) {
        self.settings.arm.robot_control = enabled;
        self.persist();
        if enabled {
            self.connect();
        } else {
            self.disconnect();
        }
    }

    /// Lift the pen and park at the screen origin
    pub fn home(&mut self) -> Result<(), ArmError> {
        self.set_pen_down(false)?;
        self.move_to(Point2D::ORIGIN)
    }

    fn apply(&mut self, event: ConnectionEvent) {
        let was = self.state.is_connected();
        self.state = self.state.transition(event);
        let now = self.state.is_connected();
        if was != now {
            self.notify(ArmEvent::ConnectedChanged(now));
        }
    }

    fn notify(&mut self, event: ArmEvent) {
        for observer in self.observers.iter_mut() {
            observer(event);
        }
    }

    fn persist(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink(&self.settings);
        }
    }
}

impl<A: Arm> Plotter for ArmController<A> {
    fn move_to(&mut self, point: Point2D) -> Result<(), ArmError> {
        ArmController::move_to(self, point)
    }

    fn set_pen_down(&mut self, down: bool) -> Result<(), ArmError> {
        ArmController::set_pen_down(self, down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{PEN_DOWN_Z, PEN_UP_Z};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Connect,
        Disconnect,
        Move { x: f64, y: f64, z: f64, scara: bool },
    }

    #[derive(Default)]
    struct RecordingArm {
        calls: Vec<Call>,
        connected: bool,
        fail_connect: bool,
        fail_moves: Option<Failure>,
    }

    #[derive(Debug, Clone, Copy)]
    enum Failure {
        Transport,
        Compile,
    }

    impl RecordingArm {
        fn moves(&self) -> Vec<(f64, f64, f64, bool)> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Move { x, y, z, scara } => Some((*x, *y, *z, *scara)),
                    _ => None,
                })
                .collect()
        }
    }

    impl Arm for RecordingArm {
        fn connect(&mut self) -> Result<(), ArmError> {
            self.calls.push(Call::Connect);
            if self.fail_connect {
                return Err(ArmError::PortUnavailable("no arm".into()));
            }
            self.connected = true;
            Ok(())
        }

        fn disconnect(&mut self) -> Result<(), ArmError> {
            self.calls.push(Call::Disconnect);
            self.connected = false;
            Ok(())
        }

        fn move_to(&mut self, x: f64, y: f64, z: f64, scara: bool) -> Result<(), ArmError> {
            self.calls.push(Call::Move { x, y, z, scara });
            match self.fail_moves {
                Some(Failure::Transport) => Err(ArmError::Transport("unplugged".into())),
                Some(Failure::Compile) => Err(ArmError::Compile(
                    sightsign_protocol::CompileError::ProgramTooLarge,
                )),
                None => Ok(()),
            }
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    fn controller() -> ArmController<RecordingArm> {
        ArmController::new(RecordingArm::default(), Settings::default())
    }

    fn connected() -> ArmController<RecordingArm> {
        let mut c = controller();
        assert!(c.connect());
        c
    }

    #[test]
    fn test_connect_notifies() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let mut c = controller();
        c.subscribe(move |e| sink.lock().unwrap().push(e));

        assert!(c.connect());
        assert!(c.is_connected());
        // Second connect is a no-op
        assert!(c.connect());
        assert_eq!(c.arm().calls, vec![Call::Connect]);
        assert_eq!(*events.lock().unwrap(), vec![ArmEvent::ConnectedChanged(true)]);
    }

    #[test]
    fn test_connect_failure_stays_disconnected() {
        let arm = RecordingArm {
            fail_connect: true,
            ..Default::default()
        };
        let mut c = ArmController::new(arm, Settings::default());
        assert!(!c.connect());
        assert_eq!(c.connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_moves_not_sent_while_disconnected() {
        let mut c = controller();
        c.move_to(Point2D::new(100.0, 100.0)).unwrap();
        c.set_pen_down(true).unwrap();
        assert!(c.arm().calls.is_empty());
        assert_eq!(c.last_point(), Point2D::new(100.0, 100.0));
        assert!(c.is_pen_down());
    }

    #[test]
    fn test_move_goes_through_polar_transform() {
        let mut c = connected();
        // Right of centre by one half-dimension: workspace (0, 1)
        c.move_to(Point2D::new(1500.0, 540.0)).unwrap();
        let (x, y, z, scara) = c.arm().moves()[0];
        assert!(x.abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
        assert_eq!(z, PEN_UP_Z);
        assert!(scara);
    }

    #[test]
    fn test_pen_toggle_repeats_last_point() {
        let mut c = connected();
        c.move_to(Point2D::new(100.0, 100.0)).unwrap();
        c.set_pen_down(true).unwrap();
        c.set_pen_down(false).unwrap();

        let moves = c.arm().moves();
        assert_eq!(moves.len(), 3);
        for m in &moves[1..] {
            assert_eq!(m.0, moves[0].0);
            assert_eq!(m.1, moves[0].1);
        }
        assert_eq!(moves[0].2, PEN_UP_Z);
        assert_eq!(moves[1].2, PEN_DOWN_Z);
        assert_eq!(moves[2].2, PEN_UP_Z);
    }

    #[test]
    fn test_pen_events_only_on_change() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let mut c = controller();
        c.subscribe(move |e| sink.lock().unwrap().push(e));

        c.set_pen_down(false).unwrap();
        c.set_pen_down(true).unwrap();
        c.set_pen_down(true).unwrap();
        assert_eq!(*events.lock().unwrap(), vec![ArmEvent::PenChanged(true)]);
    }

    #[test]
    fn test_disconnect_lifts_pen_first() {
        let mut c = connected();
        c.move_to(Point2D::new(10.0, 10.0)).unwrap();
        c.set_pen_down(true).unwrap();
        c.disconnect();

        let calls = &c.arm().calls;
        let n = calls.len();
        assert_eq!(calls[n - 1], Call::Disconnect);
        assert!(matches!(calls[n - 2], Call::Move { z, .. } if z == PEN_UP_Z));
        assert!(!c.is_connected());
        assert!(!c.is_pen_down());
    }

    #[test]
    fn test_disconnect_when_disconnected_is_noop() {
        let mut c = controller();
        c.disconnect();
        c.close();
        assert!(c.arm().calls.is_empty());
    }

    #[test]
    fn test_z_shift_persists_and_moves() {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let sink = saved.clone();
        let mut c = connected().with_settings_sink(Box::new(move |s: &Settings| {
            sink.lock().unwrap().push(s.arm.z_shift)
        }));

        c.set_z_shift(0.1).unwrap();
        c.adjust_z_shift(0.02).unwrap();

        let z = saved.lock().unwrap().clone();
        assert_eq!(z.len(), 2);
        assert!((z[1] - 0.12).abs() < 1e-12);
        let moves = c.arm().moves();
        assert_eq!(moves.len(), 2);
        assert!((moves[1].2 - (PEN_UP_Z - 0.12)).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_scale() {
        let mut c = controller();
        c.set_workspace_scale(-1.0);
        c.set_workspace_scale(f64::NAN);
        assert_eq!(c.settings().arm.workspace_scale, 1.0);
        c.set_workspace_scale(0.5);
        assert_eq!(c.settings().arm.workspace_scale, 0.5);
    }

    #[test]
    fn test_animation_interval_clamped() {
        let mut c = controller();
        c.set_animation_interval(0);
        assert_eq!(c.animation_interval(), Duration::from_millis(1));
        c.set_animation_interval(25);
        assert_eq!(c.animation_interval(), Duration::from_millis(25));
    }

    #[test]
    fn test_robot_control_toggles_connection() {
        let mut c = controller();
        c.set_robot_control(true);
        assert!(c.is_connected());
        c.set_robot_control(false);
        assert!(!c.is_connected());
        assert!(!c.settings().arm.robot_control);
    }

    #[test]
    fn test_home_lifts_then_parks() {
        let mut c = connected();
        c.move_to(Point2D::new(300.0, 300.0)).unwrap();
        c.set_pen_down(true).unwrap();
        c.home().unwrap();
        assert!(!c.is_pen_down());
        assert_eq!(c.last_point(), Point2D::ORIGIN);
        let moves = c.arm().moves();
        assert_eq!(moves.len(), 4);
        assert_eq!(moves[3].2, PEN_UP_Z);
    }

    #[test]
    fn test_transport_errors_are_swallowed() {
        let arm = RecordingArm {
            fail_moves: Some(Failure::Transport),
            ..Default::default()
        };
        let mut c = ArmController::new(arm, Settings::default());
        c.connect();
        assert!(c.move_to(Point2D::new(1.0, 1.0)).is_ok());
    }

    #[test]
    fn test_compile_errors_propagate() {
        let arm = RecordingArm {
            fail_moves: Some(Failure::Compile),
            ..Default::default()
        };
        let mut c = ArmController::new(arm, Settings::default());
        c.connect();
        assert!(matches!(
            c.move_to(Point2D::new(1.0, 1.0)),
            Err(ArmError::Compile(_))
        ));
    }
}
