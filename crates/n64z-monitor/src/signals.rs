//! Signal handling for a clean monitor exit.
//!
//! SIGINT and SIGTERM stand in for the console's exit button: the handler
//! only records the signal number in an atomic, and the frame loop polls it
//! between updates so the engine is never interrupted mid-window.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use std::sync::Arc;
use tracing::info;

/// Signal number written by the async-signal handler, 0 when none pending.
static PENDING_SIGNAL: AtomicI32 = AtomicI32::new(0);

/// Signals the monitor treats as an exit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// SIGTERM - Graceful termination request.
    Terminate,
    /// SIGINT - Interrupt (Ctrl+C).
    Interrupt,
}

impl SignalKind {
    #[cfg(unix)]
    fn from_raw(signal: i32) -> Option<Self> {
        match signal {
            libc::SIGTERM => Some(Self::Terminate),
            libc::SIGINT => Some(Self::Interrupt),
            _ => None,
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Terminate => write!(f, "SIGTERM"),
            SignalKind::Interrupt => write!(f, "SIGINT"),
        }
    }
}

/// Exit-request state shared with the frame loop.
#[derive(Debug, Default)]
pub struct SignalState {
    shutdown_requested: AtomicBool,
    signal_count: AtomicU32,
}

impl SignalState {
    /// Create a state with no pending request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[inline]
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Relaxed)
    }

    /// Request shutdown.
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Relaxed);
    }

    fn record_signal(&self, kind: SignalKind) {
        self.signal_count.fetch_add(1, Ordering::Relaxed);
        info!(signal = %kind, "Exit signal received");
        self.request_shutdown();
    }

    /// Total exit signals received.
    pub fn signal_count(&self) -> u32 {
        self.signal_count.load(Ordering::Relaxed)
    }
}

/// Handle polled by the frame loop.
#[derive(Debug, Clone)]
pub struct SignalHandler {
    state: Arc<SignalState>,
}

impl SignalHandler {
    /// Create a handler and install SIGINT/SIGTERM handlers on Unix.
    ///
    /// On other platforms no handler is installed and the loop runs until its
    /// frame limit.
    pub fn new() -> std::io::Result<Self> {
        let handler = Self {
            state: Arc::new(SignalState::new()),
        };

        #[cfg(unix)]
        Self::register_unix_handlers()?;

        Ok(handler)
    }

    #[cfg(unix)]
    #[allow(unsafe_code)]
    fn register_unix_handlers() -> std::io::Result<()> {
        extern "C" fn on_exit_signal(signal: libc::c_int) {
            PENDING_SIGNAL.store(signal, Ordering::Relaxed);
        }

        for signal in [libc::SIGINT, libc::SIGTERM] {
            // SAFETY: the handler only performs an atomic store, which is
            // async-signal-safe.
            let previous = unsafe {
                libc::signal(
                    signal,
                    on_exit_signal as extern "C" fn(libc::c_int) as libc::sighandler_t,
                )
            };
            if previous == libc::SIG_ERR {
                return Err(std::io::Error::last_os_error());
            }
        }

        tracing::debug!("SIGINT/SIGTERM handlers registered");
        Ok(())
    }

    /// Fold any signal delivered since the last poll into the shared state.
    fn poll(&self) {
        let raw = PENDING_SIGNAL.swap(0, Ordering::Relaxed);
        if raw != 0 {
            self.absorb(raw);
        }
    }

    #[cfg_attr(not(unix), allow(unused_variables))]
    fn absorb(&self, raw: i32) {
        #[cfg(unix)]
        if let Some(kind) = SignalKind::from_raw(raw) {
            self.state.record_signal(kind);
        }
    }

    /// Check if shutdown has been requested.
    pub fn shutdown_requested(&self) -> bool {
        self.poll();
        self.state.shutdown_requested()
    }

    /// Shared state for inspection.
    pub fn state(&self) -> &SignalState {
        &self.state
    }
}
