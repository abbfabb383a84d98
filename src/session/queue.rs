use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::session::input::RawKeyEvent;

/// Events buffered between the UI thread and the drill worker.
pub const INPUT_QUEUE_CAPACITY: usize = 256;

/// Longest stretch the worker blocks without looking at the cancel flag.
const CANCEL_CHECK: Duration = Duration::from_millis(50);

/// Cooperative stop signal shared by the worker and whoever owns it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Polled {
    Event(RawKeyEvent),
    TimedOut,
    Cancelled,
}

/// Producer half, held by the UI thread. Never blocks.
#[derive(Clone)]
pub struct InputSender {
    tx: SyncSender<RawKeyEvent>,
}

impl InputSender {
    /// Enqueues `event`. Returns `false` if it was dropped.
    pub fn offer(&self, event: RawKeyEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(target: "keychenga::session", key = %event.name, "input queue full, key dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Consumer half, owned by the drill worker.
pub struct InputQueue {
    rx: Receiver<RawKeyEvent>,
    cancel: CancelToken,
}

pub fn input_channel(cancel: CancelToken) -> (InputSender, InputQueue) {
    let (tx, rx) = mpsc::sync_channel(INPUT_QUEUE_CAPACITY);
    (InputSender { tx }, InputQueue { rx, cancel })
}

impl InputQueue {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits up to `timeout` for the next event.
    ///
    /// Cancellation is observed within [`CANCEL_CHECK`]. A dropped sender
    /// means nobody can answer any more and reads as cancellation.
    pub fn poll(&self, timeout: Duration) -> Polled {
        let deadline = Instant::now() + timeout;
        loop {
            if self.cancel.is_cancelled() {
                return Polled::Cancelled;
            }
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Polled::TimedOut;
            }
            match self.rx.recv_timeout(left.min(CANCEL_CHECK)) {
                Ok(event) => return Polled::Event(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Polled::Cancelled,
            }
        }
    }

    /// Discards input for `duration`. Returns `false` if cancelled meanwhile.
    pub fn idle(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return true;
            }
            if self.poll(left) == Polled::Cancelled {
                return false;
            }
        }
    }
}
