//! Playback tick thread
//!
//! Ticks are offered to the session loop with `try_send` on a rendezvous
//! channel, so a tick only lands when the loop is idle in `recv`. A tick
//! that fires while the previous one is still being handled is dropped.
//! The worker waits on its stop channel between ticks, so stopping does
//! not wait out the interval.

use std::sync::mpsc::{self, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use sightsign_core::TickSource;
use tracing::{debug, trace, warn};

use super::Input;

#[derive(Debug)]
struct Worker {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Tick source backed by a timer thread
#[derive(Debug)]
pub struct ThreadTicker {
    tx: SyncSender<Input>,
    worker: Option<Worker>,
}

impl ThreadTicker {
    pub fn new(tx: SyncSender<Input>) -> Self {
        Self { tx, worker: None }
    }
}

impl TickSource for ThreadTicker {
    fn start(&mut self, interval: Duration) {
        self.stop();

        let (stop, stopped) = mpsc::channel();
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name("playback-tick".into())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                match tx.try_send(Input::Tick) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => trace!("tick dropped, handler busy"),
                    Err(TrySendError::Disconnected(_)) => break,
                }
            });

        match spawned {
            Ok(handle) => {
                debug!("ticking every {:?}", interval);
                self.worker = Some(Worker { stop, handle });
            }
            Err(e) => warn!("tick thread not started: {}", e),
        }
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop.send(());
            if worker.handle.join().is_err() {
                warn!("tick thread panicked");
            }
        }
    }

    fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
