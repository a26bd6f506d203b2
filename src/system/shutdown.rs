/// Shutdown signalling shared by the poll loop, the dispatcher and the key reader
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Shutdown signal that can be shared across threads
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Request shutdown and wake every waiter
    pub fn request_shutdown(&self) {
        let (flag, cvar) = &*self.inner;
        let mut requested = flag.lock().unwrap_or_else(PoisonError::into_inner);
        if !*requested {
            log::info!("Shutdown requested");
            *requested = true;
        }
        cvar.notify_all();
    }

    /// Sleep for up to `timeout`, returning early once shutdown is requested.
    /// Returns true if shutdown was requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut requested = flag.lock().unwrap_or_else(PoisonError::into_inner);
        while !*requested {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            requested = cvar
                .wait_timeout(requested, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *requested
    }
}
