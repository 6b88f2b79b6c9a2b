// src/signals.rs

//! Cooperative stop requests for the animation loop.
//!
//! Signal handlers only flip an atomic flag; the loop polls it at the top of
//! every tick.

use anyhow::{Context, Result};
use log::debug;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

static PROCESS_INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signal: libc::c_int) {
    PROCESS_INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Shared "please stop" flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
    watches_process: bool,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal that is also raised by SIGINT and SIGTERM.
    pub fn from_process_signals() -> Result<Self> {
        let action = SigAction::new(
            SigHandler::Handler(on_interrupt),
            SaFlags::empty(),
            SigSet::empty(),
        );
        for signal in [Signal::SIGINT, Signal::SIGTERM] {
            // SAFETY: the handler only performs an atomic store.
            unsafe { sigaction(signal, &action) }
                .with_context(|| format!("Failed to install {} handler", signal))?;
            debug!("StopSignal: Installed handler for {}.", signal);
        }
        Ok(StopSignal {
            flag: Arc::new(AtomicBool::new(false)),
            watches_process: true,
        })
    }

    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || (self.watches_process && PROCESS_INTERRUPTED.load(Ordering::SeqCst))
    }
}
