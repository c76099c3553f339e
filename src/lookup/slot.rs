//! Lazily initialized source handles.
//!
//! A [`SourceSlot`] owns the lifecycle of one metadata source:
//!
//! ```text
//! Uninitialized ──begin──▶ Initializing ──▶ Ready
//!                               │
//!                               └────────▶ Failed ──(next access)──▶ Initializing
//! ```
//!
//! Initialization runs in a spawned task, so a caller that stops waiting does
//! not cancel it. Concurrent callers share one memoized future.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use romlookup_common::SourceKind;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::sources::MetadataSource;

/// Opens a source. Called once per initialization attempt.
pub type SourceOpener =
    Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<Arc<dyn MetadataSource>>> + Send + Sync>;

type InitFuture = Shared<BoxFuture<'static, Option<Arc<dyn MetadataSource>>>>;

enum Inner {
    Uninitialized,
    Initializing(InitFuture),
    Ready(Arc<dyn MetadataSource>),
    Failed(String),
}

/// Externally visible slot state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SourceState {
    Uninitialized,
    Initializing,
    Ready,
    Failed(String),
}

/// Outcome of [`SourceSlot::acquire`].
pub enum Acquired {
    Ready(Arc<dyn MetadataSource>),
    /// Still initializing after the wait elapsed; skip for this call.
    Pending,
    /// Initialization failed; it will be retried on the next access.
    Unavailable,
}

pub struct SourceSlot {
    kind: SourceKind,
    opener: SourceOpener,
    inner: Arc<Mutex<Inner>>,
}

impl SourceSlot {
    pub fn new(kind: SourceKind, opener: SourceOpener) -> Self {
        Self {
            kind,
            opener,
            inner: Arc::new(Mutex::new(Inner::Uninitialized)),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn state(&self) -> SourceState {
        match &*self.inner.lock() {
            Inner::Uninitialized => SourceState::Uninitialized,
            Inner::Initializing(_) => SourceState::Initializing,
            Inner::Ready(_) => SourceState::Ready,
            Inner::Failed(reason) => SourceState::Failed(reason.clone()),
        }
    }

    /// Start initialization in the background if it is not running or done.
    pub fn warm_up(&self) {
        let _ = self.begin();
    }

    /// Ready handle, or the shared in-flight initialization.
    ///
    /// Starts a new attempt from `Uninitialized` or `Failed`. Must be called
    /// from within a Tokio runtime.
    fn begin(&self) -> Result<Arc<dyn MetadataSource>, InitFuture> {
        let mut inner = self.inner.lock();
        match &*inner {
            Inner::Ready(source) => return Ok(source.clone()),
            Inner::Initializing(fut) => return Err(fut.clone()),
            Inner::Failed(reason) => {
                debug!(source = %self.kind, reason = %reason, "Retrying failed source");
            }
            Inner::Uninitialized => {}
        }

        let kind = self.kind;
        let state = self.inner.clone();
        let open = (self.opener)();

        let handle = tokio::spawn(async move {
            let outcome = open.await;
            let mut inner = state.lock();
            match outcome {
                Ok(source) => {
                    info!(source = %kind, "Source ready");
                    *inner = Inner::Ready(source.clone());
                    Some(source)
                }
                Err(e) => {
                    warn!(source = %kind, error = %e, "Source failed to initialize");
                    *inner = Inner::Failed(format!("{e:#}"));
                    None
                }
            }
        });

        let fut: InitFuture = async move {
            match handle.await {
                Ok(source) => source,
                Err(e) => {
                    warn!(source = %kind, error = %e, "Source initialization task aborted");
                    None
                }
            }
        }
        .boxed()
        .shared();

        *inner = Inner::Initializing(fut.clone());
        Err(fut)
    }

    /// Get the source, waiting at most `wait` for initialization.
    pub async fn acquire(&self, wait: Duration) -> Acquired {
        let fut = match self.begin() {
            Ok(source) => return Acquired::Ready(source),
            Err(fut) => fut,
        };

        match tokio::time::timeout(wait, fut).await {
            Ok(Some(source)) => Acquired::Ready(source),
            Ok(None) => {
                self.mark_failed_if_initializing("initialization task aborted");
                Acquired::Unavailable
            }
            Err(_) => {
                debug!(source = %self.kind, wait_ms = wait.as_millis() as u64, "Source still initializing, skipping");
                Acquired::Pending
            }
        }
    }

    /// A panicked opener leaves no outcome behind; record the failure so the
    /// next access retries instead of awaiting a dead future.
    fn mark_failed_if_initializing(&self, reason: &str) {
        let mut inner = self.inner.lock();
        if matches!(&*inner, Inner::Initializing(_)) {
            *inner = Inner::Failed(reason.to_string());
        }
    }
}
