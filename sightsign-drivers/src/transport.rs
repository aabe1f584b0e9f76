//! Framed serial transport
//!
//! Sends Brief programs to the arm as Reflecta-style frames and listens
//! for the frames the firmware pushes back. Sends are fire-and-forget:
//! the firmware never acknowledges a program. It does report protocol
//! and VM faults asynchronously; those are handed to registered error
//! handlers and logged, never raised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use sightsign_hal::{SerialOpen, UartConfig, UartRx, UartTx};
use sightsign_protocol::{FirmwareError, FirmwareReport, Frame, FrameError, FrameParser};
use tracing::{debug, trace, warn};

/// Transport failures
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The serial endpoint could not be opened
    #[error("port {port} unavailable: {reason}")]
    PortUnavailable { port: String, reason: String },
    /// Send attempted after `close`
    #[error("transport closed")]
    Closed,
    /// Write failed on an open link
    #[error("serial write failed: {0}")]
    Io(String),
    /// Payload could not be framed
    #[error("frame encoding failed: {0}")]
    Frame(#[from] FrameError),
}

type ErrorHandler = Box<dyn Fn(FirmwareError) + Send>;
type ErrorHandlers = Arc<Mutex<Vec<ErrorHandler>>>;

/// Background reader on the receive half of a port
///
/// Polls until stopped; every chunk of received bytes goes to `on_bytes`.
pub(crate) struct ReaderThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ReaderThread {
    pub(crate) fn spawn<R, F>(name: &str, mut rx: R, mut on_bytes: F) -> std::io::Result<Self>
    where
        R: UartRx + Send + 'static,
        F: FnMut(&[u8]) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = thread::Builder::new().name(name.to_owned()).spawn(move || {
            let mut buf = [0u8; 64];
            while !flag.load(Ordering::Relaxed) {
                match rx.read_blocking(&mut buf) {
                    Ok(0) => {}
                    Ok(n) => on_bytes(&buf[..n]),
                    Err(e) => {
                        warn!("serial read failed, reader stopping: {}", e);
                        break;
                    }
                }
            }
        })?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Ask the thread to exit and wait for it
    pub(crate) fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("serial reader panicked");
            }
        }
    }
}

impl Drop for ReaderThread {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Frame transport over one open serial port
pub struct FramedTransport<O: SerialOpen> {
    port: String,
    tx: Option<O::Tx>,
    reader: Option<ReaderThread>,
    handlers: ErrorHandlers,
    seq: u8,
}

impl<O: SerialOpen> FramedTransport<O> {
    /// Open `port` and start listening for firmware reports
    pub fn open(opener: &O, port: &str, config: &UartConfig) -> Result<Self, TransportError> {
        let unavailable = |reason: String| TransportError::PortUnavailable {
            port: port.to_owned(),
            reason,
        };

        let (tx, rx) = opener
            .open(port, config)
            .map_err(|e| unavailable(e.to_string()))?;

        let handlers: ErrorHandlers = Arc::new(Mutex::new(Vec::new()));
        let sink = handlers.clone();
        let mut parser = FrameParser::new();
        let reader = ReaderThread::spawn("reflecta-rx", rx, move |bytes| {
            for &byte in bytes {
                match parser.feed(byte) {
                    Ok(Some(frame)) => dispatch(&frame, &sink),
                    Ok(None) => {}
                    Err(e) => debug!("dropped inbound frame: {}", e),
                }
            }
        })
        .map_err(|e| unavailable(e.to_string()))?;

        debug!(port, "transport open");
        Ok(Self {
            port: port.to_owned(),
            tx: Some(tx),
            reader: Some(reader),
            handlers,
            seq: 0,
        })
    }

    /// Port this transport was opened on
    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn is_open(&self) -> bool {
        self.tx.is_some()
    }

    /// Write one frame carrying `payload`
    ///
    /// Does not wait for the firmware.
    pub fn send_frame(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        let tx = self.tx.as_mut().ok_or(TransportError::Closed)?;
        let frame = Frame::new(self.seq, payload)?;
        let bytes = frame.encode_to_vec()?;
        self.seq = self.seq.wrapping_add(1);

        trace!(seq = frame.seq, len = payload.len(), "send frame");
        tx.write_blocking(&bytes)
            .and_then(|_| tx.flush())
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    /// Register a handler for firmware error reports
    pub fn on_error(&self, handler: impl Fn(FirmwareError) + Send + 'static) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(handler));
    }

    /// Stop the reader and release the port. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut reader) = self.reader.take() {
            reader.stop();
        }
        if self.tx.take().is_some() {
            debug!(port = self.port.as_str(), "transport closed");
        }
    }
}

impl<O: SerialOpen> Drop for FramedTransport<O> {
    fn drop(&mut self) {
        self.close();
    }
}

fn dispatch(frame: &Frame, handlers: &ErrorHandlers) {
    match FirmwareReport::from_frame(frame) {
        Ok(FirmwareReport::Error(error)) => {
            warn!("firmware error: {}", error);
            let handlers = handlers.lock().unwrap_or_else(PoisonError::into_inner);
            for handler in handlers.iter() {
                handler(error);
            }
        }
        Ok(FirmwareReport::Event { id, data }) => {
            debug!(id, len = data.len(), "firmware event");
        }
        Err(e) => debug!("unreadable report: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::Loopback;
    use std::sync::mpsc;
    use std::time::Duration;

    fn open(link: &Loopback) -> FramedTransport<Loopback> {
        FramedTransport::open(link, "loop", &UartConfig::default()).unwrap()
    }

    #[test]
    fn test_send_frames_with_sequence() {
        let link = Loopback::new();
        let mut t = open(&link);
        t.send_frame(&[103, 0]).unwrap();
        t.send_frame(&[104, 0]).unwrap();

        let frames = link.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].seq, 0);
        assert_eq!(&frames[0].payload[..], &[103, 0]);
        assert_eq!(frames[1].seq, 1);
        assert_eq!(&frames[1].payload[..], &[104, 0]);
    }

    #[test]
    fn test_open_failure_is_port_unavailable() {
        let link = Loopback::new();
        link.refuse_open(true);
        let err = FramedTransport::open(&link, "COM9", &UartConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, TransportError::PortUnavailable { ref port, .. } if port == "COM9"));
    }

    #[test]
    fn test_write_failure_reported() {
        let link = Loopback::new();
        let mut t = open(&link);
        link.fail_writes(true);
        assert!(matches!(t.send_frame(&[0]), Err(TransportError::Io(_))));
    }

    #[test]
    fn test_oversized_payload() {
        let link = Loopback::new();
        let mut t = open(&link);
        assert!(matches!(
            t.send_frame(&[0u8; 300]),
            Err(TransportError::Frame(FrameError::PayloadTooLarge))
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let link = Loopback::new();
        let mut t = open(&link);
        t.close();
        t.close();
        assert!(!t.is_open());
        assert!(matches!(t.send_frame(&[0]), Err(TransportError::Closed)));
    }

    #[test]
    fn test_firmware_errors_reach_handlers() {
        let link = Loopback::new();
        let t = open(&link);
        let (tx, rx) = mpsc::channel();
        t.on_error(move |e| {
            let _ = tx.send(e);
        });

        // Noise before the frame must not matter
        link.inject(&[0x01, 0x02]);
        let report = FirmwareReport::Error(FirmwareError::Checksum)
            .to_frame(0)
            .unwrap()
            .encode_to_vec()
            .unwrap();
        link.inject(&report);

        let got = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(got, FirmwareError::Checksum);
    }
}
