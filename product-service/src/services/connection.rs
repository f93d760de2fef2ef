//! Lazily established, process-wide database connection.
//!
//! The first request that needs the database opens the connection; every
//! later caller gets the cached handle without I/O. Callers that arrive while
//! an attempt is in flight wait for that attempt. A failed attempt is not
//! cached, so the next caller tries again.

use async_trait::async_trait;
use metrics::counter;
use service_core::error::AppError;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::store::ProductStore;

/// Last observed connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    Disconnected = 0,
    Connected = 1,
    Connecting = 2,
}

impl ReadyState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ReadyState::Connected,
            2 => ReadyState::Connecting,
            _ => ReadyState::Disconnected,
        }
    }

    /// Human-readable status shown on the welcome route.
    pub fn status_label(self) -> &'static str {
        match self {
            ReadyState::Connected => "Connected ✅",
            _ => "Disconnected ❌",
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadyState::Disconnected => write!(f, "disconnected"),
            ReadyState::Connected => write!(f, "connected"),
            ReadyState::Connecting => write!(f, "connecting"),
        }
    }
}

/// Opens a new store handle. Implementations do the actual I/O.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ProductStore>, AppError>;
}

pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    store: OnceCell<Arc<dyn ProductStore>>,
    state: AtomicU8,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            store: OnceCell::new(),
            state: AtomicU8::new(ReadyState::Disconnected as u8),
        }
    }

    /// Return the cached store, establishing it first if needed.
    pub async fn connect(&self) -> Result<Arc<dyn ProductStore>, AppError> {
        if let Some(store) = self.store.get() {
            return Ok(Arc::clone(store));
        }

        let store = self.store.get_or_try_init(|| self.establish()).await?;
        Ok(Arc::clone(store))
    }

    /// The cached store, if a connection has been established.
    pub fn cached(&self) -> Option<Arc<dyn ProductStore>> {
        self.store.get().cloned()
    }

    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ReadyState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Connect if needed, then ping the store and record what the ping saw.
    /// The cached handle is kept on a failed ping; the driver reconnects on
    /// its own once the server is back.
    pub async fn check_status(&self) -> Result<ReadyState, AppError> {
        let store = self.connect().await?;
        let state = match store.ping().await {
            Ok(()) => ReadyState::Connected,
            Err(e) => {
                tracing::warn!(error = %e, "Database ping failed");
                ReadyState::Disconnected
            }
        };
        self.set_state(state);
        Ok(state)
    }

    async fn establish(&self) -> Result<Arc<dyn ProductStore>, AppError> {
        self.set_state(ReadyState::Connecting);
        let mut pending = PendingAttempt { manager: self, armed: true };
        tracing::info!("Establishing database connection");

        let outcome = self.connector.connect().await;
        pending.armed = false;

        match outcome {
            Ok(store) => {
                self.set_state(ReadyState::Connected);
                counter!("db_connect_attempts_total", "outcome" => "success").increment(1);
                tracing::info!("✅ MongoDB connected");
                Ok(store)
            }
            Err(e) => {
                self.set_state(ReadyState::Disconnected);
                counter!("db_connect_attempts_total", "outcome" => "failure").increment(1);
                tracing::error!(error = %e, "❌ MongoDB connection error");
                Err(match e {
                    AppError::ConnectionError(_) => e,
                    other => AppError::ConnectionError(anyhow::Error::new(other)),
                })
            }
        }
    }
}

/// Puts the state back to `Disconnected` if a connect attempt is dropped
/// before it finishes.
struct PendingAttempt<'a> {
    manager: &'a ConnectionManager,
    armed: bool,
}

impl Drop for PendingAttempt<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.manager.set_state(ReadyState::Disconnected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::InMemoryProductStore;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingConnector {
        calls: AtomicUsize,
        fail: AtomicBool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl Connector for CountingConnector {
        async fn connect(&self) -> Result<Arc<dyn ProductStore>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::ConnectionError(anyhow::anyhow!(
                    "server selection timed out"
                )));
            }
            Ok(Arc::new(InMemoryProductStore::new()))
        }
    }

    struct FixedConnector(Arc<InMemoryProductStore>);

    #[async_trait]
    impl Connector for FixedConnector {
        async fn connect(&self) -> Result<Arc<dyn ProductStore>, AppError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn second_connect_hits_the_cache() {
        let connector = Arc::new(CountingConnector::default());
        let manager = ConnectionManager::new(connector.clone());
        assert_eq!(manager.ready_state(), ReadyState::Disconnected);
        assert!(manager.cached().is_none());

        let first = manager.connect().await.unwrap();
        let second = manager.connect().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(connector.calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.ready_state(), ReadyState::Connected);
        assert!(manager.cached().is_some());
    }

    #[tokio::test]
    async fn failure_is_not_cached() {
        let connector = Arc::new(CountingConnector::default());
        connector.fail.store(true, Ordering::SeqCst);
        let manager = ConnectionManager::new(connector.clone());

        let err = manager.connect().await.err().unwrap();
        assert!(matches!(err, AppError::ConnectionError(_)));
        assert!(manager.connect().await.is_err());
        assert_eq!(connector.calls.load(Ordering::SeqCst), 2);
        assert_eq!(manager.ready_state(), ReadyState::Disconnected);

        connector.fail.store(false, Ordering::SeqCst);
        manager.connect().await.unwrap();
        manager.connect().await.unwrap();
        assert_eq!(connector.calls.load(Ordering::SeqCst), 3);
        assert_eq!(manager.ready_state(), ReadyState::Connected);
    }

    #[tokio::test]
    async fn concurrent_cold_start_connects_once() {
        let connector = Arc::new(CountingConnector {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let manager = Arc::new(ConnectionManager::new(connector.clone()));

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.connect().await.map(|_| ()) })
            })
            .collect();

        for attempt in attempts {
            attempt.await.unwrap().unwrap();
        }

        assert_eq!(connector.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn status_label_only_reports_connected_for_connected() {
        assert_eq!(ReadyState::Connected.status_label(), "Connected ✅");
        for state in [ReadyState::Disconnected, ReadyState::Connecting] {
            assert_eq!(state.status_label(), "Disconnected ❌");
        }
    }

    #[tokio::test]
    async fn abandoned_attempt_does_not_stay_connecting() {
        let connector = Arc::new(CountingConnector {
            delay: Some(Duration::from_millis(500)),
            ..Default::default()
        });
        let manager = ConnectionManager::new(connector.clone());

        let result = tokio::time::timeout(Duration::from_millis(20), manager.connect()).await;
        assert!(result.is_err());
        assert_eq!(manager.ready_state(), ReadyState::Disconnected);
        assert!(manager.cached().is_none());
    }

    #[tokio::test]
    async fn status_check_tracks_a_lost_server() {
        let store = Arc::new(InMemoryProductStore::new());
        let connector = Arc::new(FixedConnector(store.clone()));
        let manager = ConnectionManager::new(connector);

        assert_eq!(manager.check_status().await.unwrap(), ReadyState::Connected);

        store.set_reachable(false);
        assert_eq!(manager.check_status().await.unwrap(), ReadyState::Disconnected);
        assert_eq!(manager.ready_state(), ReadyState::Disconnected);
        assert!(manager.cached().is_some());

        store.set_reachable(true);
        assert_eq!(manager.check_status().await.unwrap(), ReadyState::Connected);
    }
}
