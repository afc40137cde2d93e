//! Cooperative cancellation.
//!
//! The first SIGINT or SIGTERM only raises a flag. The copy loop polls it
//! between bytes and leaves through the regular error path, so streams are
//! still closed. A read blocked on an idle terminal or pipe never returns to
//! that check, so a second signal ends the process on the spot.
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::{error, warn};

/// Shared cancellation flag, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Raise the flag and report whether it was already raised.
    fn raise(&self) -> bool {
        self.0.swap(true, Ordering::Relaxed)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Route SIGINT and SIGTERM into `flag`. A second signal exits with status 1.
///
/// # Errors
///
/// Fails if a handler was already installed for this process or the OS
/// refused the registration.
pub fn install_handler(flag: &CancelFlag) -> Result<(), ctrlc::Error> {
    let flag = flag.clone();
    ctrlc::set_handler(move || {
        if on_signal(&flag) == SignalAction::Abort {
            error!("second signal detected, aborting");
            std::process::exit(ABORT_EXIT_CODE);
        }
    })
}

/// Exit status used when a second signal aborts the process.
const ABORT_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalAction {
    Cancel,
    Abort,
}

fn on_signal(flag: &CancelFlag) -> SignalAction {
    if flag.raise() {
        SignalAction::Abort
    } else {
        warn!("signal detected, cancelling conversion");
        SignalAction::Cancel
    }
}
