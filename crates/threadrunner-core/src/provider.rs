// Client Provider
//
// Lazily constructs one shared client handle and hands out the same `Arc` on
// every call. The provider is an ordinary value owned by the caller and passed
// by reference; there is no process-global state.
//
// Design Decision: Construction failures are not cached, so a later call can
// retry (e.g. after credentials become available).

use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::Result;

type Factory<C> = Box<dyn Fn() -> Result<C> + Send + Sync>;

/// Lazily-initialised, shared client handle
pub struct ClientProvider<C> {
    cell: OnceCell<Arc<C>>,
    factory: Factory<C>,
}

impl<C> ClientProvider<C> {
    pub fn new(factory: impl Fn() -> Result<C> + Send + Sync + 'static) -> Self {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    /// Return the shared client, constructing it on first use.
    ///
    /// Concurrent first calls construct the client once.
    pub async fn provide(&self) -> Result<Arc<C>> {
        let client = self
            .cell
            .get_or_try_init(|| async { (self.factory)().map(Arc::new) })
            .await?;
        Ok(Arc::clone(client))
    }

    /// Whether a client has been constructed yet
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl<C> std::fmt::Debug for ClientProvider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientProvider")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Handle {
        serial: u32,
    }

    #[tokio::test]
    async fn test_provide_returns_same_instance() {
        let built = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&built);
        let provider = ClientProvider::new(move || {
            Ok(Handle {
                serial: counter.fetch_add(1, Ordering::SeqCst),
            })
        });

        assert!(!provider.is_initialized());
        let first = provider.provide().await.unwrap();
        let second = provider.provide().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.serial, 0);
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert!(provider.is_initialized());
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let provider = ClientProvider::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ApiError::config("OPENAI_API_KEY environment variable not set"))
            } else {
                Ok(Handle { serial: 7 })
            }
        });

        let err = provider.provide().await.err().unwrap();
        assert!(matches!(err, ApiError::Configuration(_)));
        assert!(!provider.is_initialized());

        let handle = provider.provide().await.unwrap();
        assert_eq!(handle.serial, 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_build_once() {
        let built = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&built);
        let provider = ClientProvider::new(move || {
            Ok(Handle {
                serial: counter.fetch_add(1, Ordering::SeqCst),
            })
        });

        let (a, b) = tokio::join!(provider.provide(), provider.provide());
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }
}
