//! Call admission, per-call cancellation and graceful shutdown.
//!
//! Every RPC is admitted through [`Lifecycle::admit`], which hands back a
//! [`CallGuard`]. The guard owns a child of the service-wide shutdown token;
//! that child is what gets threaded into the store. Dropping the guard (call
//! finished, or tonic dropped the handler because the client went away)
//! cancels the child token and releases the in-flight slot.

use category_tonic_core::Error;
use core::time::Duration;
use portable_atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct Lifecycle {
    draining: AtomicBool,
    inflight: AtomicUsize,
    shutdown_token: CancellationToken,
    shutdown_timeout: Duration,
}

impl Lifecycle {
    pub fn new(shutdown_timeout: Duration) -> Self {
        Self {
            draining: AtomicBool::new(false),
            inflight: AtomicUsize::new(0),
            shutdown_token: CancellationToken::new(),
            shutdown_timeout,
        }
    }

    /// Registers a new call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceShutdown`] once [`Lifecycle::shutdown`] has
    /// started.
    pub fn admit(self: &Arc<Self>) -> Result<CallGuard, Error> {
        // Count first so a concurrent drain can never miss this call.
        self.inflight.fetch_add(1, Ordering::AcqRel);
        let guard = CallGuard {
            lifecycle: Arc::clone(self),
            token: self.shutdown_token.child_token(),
        };

        if self.draining.load(Ordering::Acquire) {
            return Err(Error::ServiceShutdown);
        }
        Ok(guard)
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::Acquire)
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Stops admitting calls, waits up to the configured timeout for
    /// in-flight calls to finish, then cancels whatever is left.
    pub async fn shutdown(&self) {
        // === Phase 0: Stop accepting new calls ===
        tracing::info!("Refusing new requests");
        self.draining.store(true, Ordering::Release);

        // === Phase 1: Wait for in-flight calls to drain ===
        tracing::info!("Draining in-flight calls ({} active)", self.inflight());
        let drained = timeout(self.shutdown_timeout, async {
            while self.inflight() > 0 {
                sleep(Duration::from_millis(50)).await;
            }
        })
        .await;

        match drained {
            Ok(()) => tracing::debug!("All in-flight calls drained"),
            Err(_) => tracing::warn!(
                "Graceful drain timed out ({} calls still active)",
                self.inflight()
            ),
        }

        // === Phase 2: Cancel remaining store work ===
        tracing::debug!("Cancelling remaining work via shutdown token");
        self.shutdown_token.cancel();
    }
}

/// Admission ticket for one RPC.
#[derive(Debug)]
pub struct CallGuard {
    lifecycle: Arc<Lifecycle>,
    token: CancellationToken,
}

impl CallGuard {
    /// The per-call token handed to every store operation of this call.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.token.cancel();
        self.lifecycle.inflight.fetch_sub(1, Ordering::AcqRel);
    }
}
