//! Interrupt handling.
//!
//! SIGINT, SIGTERM, and SIGHUP set a shared flag instead of killing the
//! process outright. The installer polls the flag before each step that
//! changes the filesystem and stops cleanly when it is set.

use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Exit code used when a second signal forces termination.
const FORCED_EXIT_CODE: i32 = 130;

/// Shared flag raised when an interrupt signal arrives.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// Create a flag that is not connected to any signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a flag raised by SIGINT, SIGTERM, and (on Unix) SIGHUP.
    ///
    /// A second signal while the flag is already raised terminates the
    /// process with exit code 130.
    ///
    /// # Errors
    ///
    /// Returns an error if a signal handler cannot be installed.
    pub fn register() -> std::io::Result<Self> {
        let flag = Self::new();
        for signal in handled_signals() {
            signal_hook::flag::register_conditional_shutdown(
                *signal,
                FORCED_EXIT_CODE,
                Arc::clone(&flag.0),
            )?;
            signal_hook::flag::register(*signal, Arc::clone(&flag.0))?;
        }
        debug!("interrupt handlers installed");
        Ok(flag)
    }

    /// Return `true` once an interrupt has been received.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise the flag as if a signal had arrived.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[cfg(unix)]
fn handled_signals() -> &'static [i32] {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};

    &[SIGINT, SIGTERM, SIGHUP]
}

#[cfg(not(unix))]
fn handled_signals() -> &'static [i32] {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};

    &[SIGINT, SIGTERM]
}
