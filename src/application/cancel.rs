//! Operator cancellation
//!
//! The Ctrl-C handler shares a [`CancellationToken`] with the run. Until the
//! token is armed an interrupt ends the process at once; afterwards it is only
//! recorded and the log follower picks it up at its next poll.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What the signal handler should do with an interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Nothing to compensate; exit immediately
    Exit,
    /// Cancellation recorded; the run will clean up
    Recorded,
}

#[derive(Debug, Default)]
struct Flags {
    armed: AtomicBool,
    cancelled: AtomicBool,
}

/// Cheaply cloneable cancellation flag shared with the signal handler
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flags: Arc<Flags>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// From now on, interrupts are recorded instead of exiting
    pub fn arm(&self) {
        self.flags.armed.store(true, Ordering::SeqCst);
    }

    pub fn disarm(&self) {
        self.flags.armed.store(false, Ordering::SeqCst);
    }

    pub fn is_armed(&self) -> bool {
        self.flags.armed.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.flags.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flags.cancelled.load(Ordering::SeqCst)
    }

    /// Called from the signal handler
    pub fn interrupt(&self) -> Interrupt {
        if self.is_armed() {
            self.cancel();
            Interrupt::Recorded
        } else {
            Interrupt::Exit
        }
    }
}
