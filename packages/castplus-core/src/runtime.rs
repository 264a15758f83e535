//! Task spawning abstraction for runtime independence.
//!
//! The core owns no worker threads of its own. The few background tasks it
//! needs (stop timeouts, mDNS feed pumps) go through a [`TaskSpawner`] so a
//! host can decide which runtime they land on.

use std::future::Future;
use std::time::Duration;

/// Abstraction for spawning background tasks.
///
/// Tasks are fire-and-forget: there is no join or cancel handle. Work that
/// must stop early checks a weak reference or a cancellation token itself.
pub trait TaskSpawner: Send + Sync {
    /// Spawns a future as a background task.
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Spawns `future` once `delay` has elapsed.
    fn spawn_after<F>(&self, delay: Duration, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            future.await;
        });
    }
}

/// Spawner backed by a Tokio runtime handle.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Uses the handle of the runtime this is called from.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    #[must_use]
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future);
    }
}
