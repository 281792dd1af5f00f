use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, warn};

/// Detached background work with a cap on how much runs at once.
///
/// Spawned tasks wait for a permit before running; waiting tasks hold nothing
/// but their own future. Tasks are neither cancellable nor awaited by the
/// server, and a panic inside one is logged rather than propagated.
#[derive(Clone)]
pub struct BackgroundTasks {
    permits: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
}

struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl BackgroundTasks {
    #[must_use]
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Tasks spawned and not yet finished, including those waiting for a permit.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Spawn `work` in the caller's current span.
    pub fn spawn<F>(&self, name: impl Into<String>, work: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let permits = Arc::clone(&self.permits);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        tokio::spawn(
            async move {
                let _guard = guard;
                let Ok(_permit) = permits.acquire_owned().await else {
                    warn!(task = %name, "Background task dropped: semaphore closed");
                    return;
                };

                info!(task = %name, "Background task started");
                let started = Instant::now();
                match AssertUnwindSafe(work).catch_unwind().await {
                    Ok(()) => info!(
                        task = %name,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Background task finished"
                    ),
                    Err(panic) => error!(
                        task = %name,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Background task panicked: {}",
                        panic_message(panic.as_ref())
                    ),
                }
            }
            .in_current_span(),
        )
    }
}

/// Best-effort text of a panic payload.
#[must_use]
pub fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
