//! uArm Metal backend (Brief over Reflecta frames)
//!
//! # Handshake
//!
//! On connect the compiler's symbol table is rebuilt with the arm's four
//! instructions, then `(reset)` and `attach` are executed, each followed
//! by a settle delay.
//!
//! # Moves
//!
//! Every move compiles to a five-token program: three scaled, offset
//! integer fields, a speed literal and either `rtz!!` (rotation/elevation)
//! or `xyz!!` (cartesian). The firmware never reports completion, so the
//! caller is blocked for a dead-reckoned travel time afterwards.

use embedded_hal::delay::DelayNs;
use sightsign_core::motion::{distance_units, pacing_delay_ms, Position3D};
use sightsign_core::{Arm, ArmError};
use sightsign_hal::{SerialOpen, UartConfig};
use sightsign_protocol::brief::opcode;
use sightsign_protocol::{Compiler, Control};
use tracing::{debug, info, warn};

use crate::transport::{FramedTransport, TransportError};

/// Instructions registered on every connect
pub const INSTRUCTIONS: [(&str, u8); 4] = [
    ("attach", opcode::ATTACH),
    ("detach", opcode::DETACH),
    ("xyz!!", opcode::XYZ),
    ("rtz!!", opcode::RTZ),
];

/// Settle time after `(reset)`
pub const RESET_SETTLE_MS: u32 = 500;
/// Settle time after `attach` and `detach`
pub const ATTACH_SETTLE_MS: u32 = 100;
/// Speed literal passed with every move
pub const MOVE_SPEED: i32 = 3000;

/// Rotation/elevation/height fields for a workspace target
///
/// In this mode "up" is base rotation.
pub fn scara_fields(x: f64, y: f64, z: f64) -> (i32, i32, i32) {
    (
        field(x, 10000.0, 22000),
        field(z, 650.0, 1800),
        field(-y, 10000.0, 5000),
    )
}

/// Cartesian fields for a workspace target
pub fn cartesian_fields(x: f64, y: f64, z: f64) -> (i32, i32, i32) {
    (
        field(x, 10000.0, 11000),
        field(y, 10000.0, 0),
        field(z, 10000.0, 5000),
    )
}

/// Scale, truncate toward zero, then offset
fn field(value: f64, gain: f64, offset: i32) -> i32 {
    ((value * gain) as i32).saturating_add(offset)
}

/// Brief program for one move
pub fn move_program(x: f64, y: f64, z: f64, scara: bool) -> String {
    if scara {
        let (rr, tt, zz) = scara_fields(x, y, z);
        format!("{} {} {} {} rtz!!", rr, tt, zz, MOVE_SPEED)
    } else {
        let (xx, yy, zz) = cartesian_fields(x, y, z);
        format!("{} {} {} {} xyz!!", xx, yy, zz, MOVE_SPEED)
    }
}

/// uArm Metal driver
pub struct BriefArm<O: SerialOpen, D: DelayNs> {
    opener: O,
    port: Option<String>,
    config: UartConfig,
    delay: D,
    compiler: Compiler,
    transport: Option<FramedTransport<O>>,
    /// Last commanded target, the origin before the first move
    last: Position3D,
}

impl<O: SerialOpen, D: DelayNs> BriefArm<O, D> {
    /// Create a driver for `port`; `None` means no arm was found
    pub fn new(opener: O, port: Option<String>, delay: D) -> Self {
        Self {
            opener,
            port,
            config: UartConfig::default(),
            delay,
            compiler: Compiler::new(),
            transport: None,
            last: Position3D::ORIGIN,
        }
    }

    /// Override the line settings
    pub fn with_config(mut self, config: UartConfig) -> Self {
        self.config = config;
        self
    }

    /// Last commanded target
    pub fn last_target(&self) -> Position3D {
        self.last
    }

    /// The pacing delay, for inspection
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Compile `source`, execute it on the arm, then wait `settle_ms`
    ///
    /// The wait happens whether or not the send succeeded.
    fn exec(&mut self, settle_ms: u32, source: &str) -> Result<(), ArmError> {
        debug!("exec {:?} ({} ms)", source, settle_ms);
        let payload = self
            .compiler
            .compile(source)?
            .to_payload(Control::Execute)?;

        let sent = match self.transport.as_mut() {
            Some(transport) => transport.send_frame(&payload),
            None => Err(TransportError::Closed),
        };
        self.delay.delay_ms(settle_ms);
        sent.map_err(|e| ArmError::Transport(e.to_string()))
    }

    fn handshake(&mut self) -> Result<(), ArmError> {
        self.compiler.reset();
        for (name, code) in INSTRUCTIONS {
            self.compiler.define_instruction(name, code)?;
        }
        self.exec(RESET_SETTLE_MS, "(reset)")?;
        self.exec(ATTACH_SETTLE_MS, "attach")
    }
}

impl<O: SerialOpen, D: DelayNs> Arm for BriefArm<O, D> {
    fn connect(&mut self) -> Result<(), ArmError> {
        if self.transport.is_some() {
            return Ok(());
        }
        let port = self
            .port
            .clone()
            .ok_or_else(|| ArmError::PortUnavailable("no uArm serial port found".into()))?;

        let transport = FramedTransport::open(&self.opener, &port, &self.config)
            .map_err(|e| ArmError::PortUnavailable(e.to_string()))?;
        transport.on_error(|e| warn!("uArm reported: {}", e));
        self.transport = Some(transport);

        match self.handshake() {
            Ok(()) => {
                info!(port = port.as_str(), "uArm attached");
                Ok(())
            }
            Err(e) => {
                self.transport = None;
                Err(match e {
                    ArmError::Transport(reason) => ArmError::ConnectFailure(reason),
                    other => other,
                })
            }
        }
    }

    fn disconnect(&mut self) -> Result<(), ArmError> {
        if self.transport.is_none() {
            return Ok(());
        }
        if let Err(e) = self.exec(ATTACH_SETTLE_MS, "detach") {
            warn!("detach not delivered: {}", e);
        }
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        info!("uArm released");
        Ok(())
    }

    fn move_to(&mut self, x: f64, y: f64, z: f64, scara: bool) -> Result<(), ArmError> {
        let target = Position3D::new(x, y, z);
        let wait = pacing_delay_ms(distance_units(&self.last, &target));
        self.last = target;

        match self.exec(wait, &move_program(x, y, z, scara)) {
            Err(ArmError::Transport(reason)) => {
                warn!("move not delivered: {}", reason);
                Ok(())
            }
            other => other,
        }
    }

    fn is_connected(&self) -> bool {
        self.transport.is_some()
    }
}
