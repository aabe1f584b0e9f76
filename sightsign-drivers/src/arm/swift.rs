//! uArm Swift Pro backend (G-code lines)
//!
//! The Swift firmware plans its own motion and queues commands, so this
//! backend does not pace moves. Rotation/elevation encoding is not
//! available; moves are always cartesian. Disconnecting releases the
//! joints, then closes the port.

use sightsign_core::{Arm, ArmError};
use sightsign_hal::{SerialOpen, UartConfig, UartTx};
use sightsign_protocol::{SwiftCommand, SwiftMode};
use tracing::{debug, info, trace, warn};

use crate::transport::ReaderThread;

/// Feed rate for every move, mm/min
pub const MOVE_SPEED: u16 = 5000;

const WORKSPACE_GAIN: f64 = 3.0;

/// Longest reply line kept while waiting for its newline
const MAX_REPLY_LEN: usize = 256;

/// Splits the Swift's reply stream into lines
///
/// Bytes are held raw until a `\n` arrives, so a character split across
/// two reads decodes intact. A line that outgrows `MAX_REPLY_LEN` is
/// discarded up to its newline.
#[derive(Debug, Default)]
struct ReplyLines {
    pending: Vec<u8>,
    overflowed: bool,
}

impl ReplyLines {
    fn feed(&mut self, bytes: &[u8], mut on_line: impl FnMut(&str)) {
        for &byte in bytes {
            if byte == b'\n' {
                if !self.overflowed {
                    on_line(String::from_utf8_lossy(&self.pending).trim());
                }
                self.pending.clear();
                self.overflowed = false;
            } else if self.pending.len() < MAX_REPLY_LEN {
                self.pending.push(byte);
            } else if !self.overflowed {
                warn!("Swift reply longer than {} bytes dropped", MAX_REPLY_LEN);
                self.overflowed = true;
            }
        }
    }
}

fn log_reply(reply: &str) {
    if reply.contains(" E") {
        warn!("Swift reported: {}", reply);
    } else if !reply.is_empty() {
        trace!("Swift: {}", reply);
    }
}

/// Millimetre target for a workspace point
pub fn swift_target(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    (
        x * 70.0 * WORKSPACE_GAIN + 200.0,
        y * 100.0 * WORKSPACE_GAIN,
        z * 20.0 + 50.0,
    )
}

struct Link<Tx> {
    tx: Tx,
    _reader: ReaderThread,
}

/// uArm Swift Pro driver
pub struct SwiftArm<O: SerialOpen> {
    opener: O,
    port: Option<String>,
    config: UartConfig,
    link: Option<Link<O::Tx>>,
    seq: u16,
    scara_warned: bool,
}

impl<O: SerialOpen> SwiftArm<O> {
    /// Create a driver for `port`; `None` means no arm was found
    pub fn new(opener: O, port: Option<String>) -> Self {
        Self {
            opener,
            port,
            config: UartConfig::swift(),
            link: None,
            seq: 0,
            scara_warned: false,
        }
    }

    fn send(&mut self, command: SwiftCommand) -> Result<(), ArmError> {
        let link = self
            .link
            .as_mut()
            .ok_or_else(|| ArmError::Transport("not connected".into()))?;
        self.seq = self.seq.wrapping_add(1);
        let line = command
            .to_line(self.seq)
            .map_err(|_| ArmError::Transport("command line too long".into()))?;
        trace!("send {}", line.trim_end());
        link.tx
            .write_blocking(line.as_bytes())
            .and_then(|_| link.tx.flush())
            .map_err(|e| ArmError::Transport(e.to_string()))
    }
}

impl<O: SerialOpen> Arm for SwiftArm<O> {
    fn connect(&mut self) -> Result<(), ArmError> {
        if self.link.is_some() {
            return Ok(());
        }
        let port = self
            .port
            .clone()
            .ok_or_else(|| ArmError::PortUnavailable("no uArm serial port found".into()))?;

        let (tx, rx) = self
            .opener
            .open(&port, &self.config)
            .map_err(|e| ArmError::PortUnavailable(format!("{}: {}", port, e)))?;

        let mut replies = ReplyLines::default();
        let reader = ReaderThread::spawn("swift-rx", rx, move |bytes| {
            replies.feed(bytes, log_reply)
        })
        .map_err(|e| ArmError::PortUnavailable(e.to_string()))?;

        self.link = Some(Link {
            tx,
            _reader: reader,
        });
        self.seq = 0;

        if let Err(e) = self.send(SwiftCommand::SetMode(SwiftMode::UniversalHolder)) {
            self.link = None;
            return Err(match e {
                ArmError::Transport(reason) => ArmError::ConnectFailure(reason),
                other => other,
            });
        }
        info!(port = port.as_str(), "Swift Pro connected");
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), ArmError> {
        if self.link.is_none() {
            return Ok(());
        }
        if let Err(e) = self.send(SwiftCommand::Detach) {
            warn!("detach not delivered: {}", e);
        }
        self.link = None;
        info!("Swift Pro released");
        Ok(())
    }

    fn move_to(&mut self, x: f64, y: f64, z: f64, scara: bool) -> Result<(), ArmError> {
        if scara && !self.scara_warned {
            debug!("Swift Pro has no rotation/elevation mode, moving cartesian");
            self.scara_warned = true;
        }
        let (x, y, z) = swift_target(x, y, z);
        let command = SwiftCommand::Move {
            x,
            y,
            z,
            speed: MOVE_SPEED,
        };
        if let Err(e) = self.send(command) {
            warn!("move not delivered: {}", e);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.link.is_some()
    }
}
