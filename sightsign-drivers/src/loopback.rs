//! In-memory serial link
//!
//! Stands in for a real port when running without an arm attached. Bytes
//! written by the host are kept for inspection, and firmware replies can
//! be injected for the host to read.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use sightsign_hal::{SerialOpen, UartConfig, UartRx, UartTx};
use sightsign_protocol::{Frame, FrameParser};

/// How long an empty read waits before reporting a timeout
const IDLE_READ: Duration = Duration::from_millis(5);

/// Loopback link errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoopbackError {
    #[error("port {0} refused")]
    Refused(String),
    #[error("link down")]
    LinkDown,
}

#[derive(Debug, Default)]
struct Shared {
    written: Mutex<Vec<u8>>,
    inbound: Mutex<VecDeque<u8>>,
    opened: Mutex<Vec<String>>,
    refuse_open: AtomicBool,
    fail_writes: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Opener for an in-memory link; clones share the same link
#[derive(Debug, Clone, Default)]
pub struct Loopback {
    shared: Arc<Shared>,
}

impl Loopback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything the host has written so far
    pub fn written(&self) -> Vec<u8> {
        lock(&self.shared.written).clone()
    }

    /// Drain the written bytes
    pub fn take_written(&self) -> Vec<u8> {
        core::mem::take(&mut *lock(&self.shared.written))
    }

    /// Written bytes parsed as frames; malformed bytes are skipped
    pub fn frames(&self) -> Vec<Frame> {
        let mut parser = FrameParser::new();
        self.written()
            .into_iter()
            .filter_map(|b| parser.feed(b).ok().flatten())
            .collect()
    }

    /// Written bytes split into text lines
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.written())
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// Queue bytes for the host to read
    pub fn inject(&self, bytes: &[u8]) {
        lock(&self.shared.inbound).extend(bytes.iter().copied());
    }

    /// Ports opened through this link, in order
    pub fn opened_ports(&self) -> Vec<String> {
        lock(&self.shared.opened).clone()
    }

    /// Make subsequent opens fail
    pub fn refuse_open(&self, refuse: bool) {
        self.shared.refuse_open.store(refuse, Ordering::SeqCst);
    }

    /// Make subsequent writes fail
    pub fn fail_writes(&self, fail: bool) {
        self.shared.fail_writes.store(fail, Ordering::SeqCst);
    }
}

/// Host side transmit half
#[derive(Debug)]
pub struct LoopbackTx {
    shared: Arc<Shared>,
}

/// Host side receive half
#[derive(Debug)]
pub struct LoopbackRx {
    shared: Arc<Shared>,
}

impl UartTx for LoopbackTx {
    type Error = LoopbackError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if self.shared.fail_writes.load(Ordering::SeqCst) {
            return Err(LoopbackError::LinkDown);
        }
        lock(&self.shared.written).extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl UartRx for LoopbackRx {
    type Error = LoopbackError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = {
            let mut inbound = lock(&self.shared.inbound);
            let n = buf.len().min(inbound.len());
            for (slot, byte) in buf.iter_mut().zip(inbound.drain(..n)) {
                *slot = byte;
            }
            n
        };
        if n == 0 {
            thread::sleep(IDLE_READ);
        }
        Ok(n)
    }
}

impl SerialOpen for Loopback {
    type Tx = LoopbackTx;
    type Rx = LoopbackRx;
    type Error = LoopbackError;

    fn open(&self, port: &str, _config: &UartConfig) -> Result<(LoopbackTx, LoopbackRx), LoopbackError> {
        if self.shared.refuse_open.load(Ordering::SeqCst) {
            return Err(LoopbackError::Refused(port.to_owned()));
        }
        lock(&self.shared.opened).push(port.to_owned());
        Ok((
            LoopbackTx {
                shared: self.shared.clone(),
            },
            LoopbackRx {
                shared: self.shared.clone(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_bytes_recorded() {
        let link = Loopback::new();
        let (mut tx, _rx) = link.open("loop", &UartConfig::default()).unwrap();
        tx.write_blocking(&[1, 2, 3]).unwrap();
        assert_eq!(link.written(), vec![1, 2, 3]);
        assert_eq!(link.take_written(), vec![1, 2, 3]);
        assert!(link.written().is_empty());
        assert_eq!(link.opened_ports(), vec!["loop".to_string()]);
    }

    #[test]
    fn test_injected_bytes_read_back() {
        let link = Loopback::new();
        let (_tx, mut rx) = link.open("loop", &UartConfig::default()).unwrap();
        link.inject(&[9, 8, 7]);
        let mut buf = [0u8; 2];
        assert_eq!(rx.read_blocking(&mut buf).unwrap(), 2);
        assert_eq!(buf, [9, 8]);
        assert_eq!(rx.read_blocking(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 7);
        assert_eq!(rx.read_blocking(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_refused_open() {
        let link = Loopback::new();
        link.refuse_open(true);
        assert_eq!(
            link.open("COM3", &UartConfig::default()).err(),
            Some(LoopbackError::Refused("COM3".into()))
        );
    }

    #[test]
    fn test_failing_writes() {
        let link = Loopback::new();
        let (mut tx, _rx) = link.open("loop", &UartConfig::default()).unwrap();
        link.fail_writes(true);
        assert_eq!(tx.write_blocking(&[1]), Err(LoopbackError::LinkDown));
        assert!(link.written().is_empty());
    }

    #[test]
    fn test_frames_parsed_from_stream() {
        let link = Loopback::new();
        let (mut tx, _rx) = link.open("loop", &UartConfig::default()).unwrap();
        let bytes = Frame::new(3, &[110, 0]).unwrap().encode_to_vec().unwrap();
        tx.write_blocking(&[0x00, 0x13]).unwrap();
        tx.write_blocking(&bytes).unwrap();
        let frames = link.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].seq, 3);
        assert_eq!(&frames[0].payload[..], &[110, 0]);
    }
}
