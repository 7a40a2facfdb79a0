//! Memoized connections keyed by [`ConnectTarget`]
//!
//! The registry opens at most one connection per target and hands the same
//! `Arc` to every caller. Concurrent first-time callers wait on a single
//! connect attempt and all see its outcome, success or failure. A failed
//! attempt is not remembered: once it settles the entry is dropped and the
//! next caller connects again.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{DriverError, SharedFault};
use crate::options::ConnectTarget;
use crate::store::{Connection, Connector, FaultClassifier};

type Attempt = Shared<BoxFuture<'static, Result<Arc<dyn Connection>, Arc<DriverError>>>>;

/// Connection cache over one [`Connector`].
pub struct ConnectionRegistry {
    connector: Arc<dyn Connector>,
    slots: Mutex<HashMap<ConnectTarget, Attempt>>,
}

impl ConnectionRegistry {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Convenience for `Arc::new(ConnectionRegistry::new(..))`.
    pub fn shared(connector: impl Connector + 'static) -> Arc<Self> {
        Arc::new(Self::new(Arc::new(connector)))
    }

    /// The open connection for `target`, connecting on first use.
    ///
    /// # Errors
    ///
    /// The connector's fault, wrapped in a [`SharedFault`] so that every
    /// caller waiting on the same attempt receives it.
    pub async fn acquire(&self, target: &ConnectTarget) -> Result<Arc<dyn Connection>, DriverError> {
        let attempt = {
            let mut slots = self.slots.lock().await;
            slots
                .entry(target.clone())
                .or_insert_with(|| self.connect(target))
                .clone()
        };

        match attempt.clone().await {
            Ok(connection) => Ok(connection),
            Err(fault) => {
                let mut slots = self.slots.lock().await;
                if slots.get(target).is_some_and(|current| current.ptr_eq(&attempt)) {
                    slots.remove(target);
                }
                Err(Box::new(SharedFault::new(fault)))
            }
        }
    }

    fn connect(&self, target: &ConnectTarget) -> Attempt {
        let connector = Arc::clone(&self.connector);
        let target = target.clone();
        async move {
            debug!(connection = %target, "opening connection");
            connector.connect(&target).await.map_err(|err| {
                debug!(connection = %target, error = %err, "connect failed");
                Arc::new(err)
            })
        }
        .boxed()
        .shared()
    }

    /// Classifier matching this registry's connector.
    pub fn fault_classifier(&self) -> Arc<dyn FaultClassifier> {
        self.connector.fault_classifier()
    }

    /// Number of targets holding an established connection.
    pub async fn len(&self) -> usize {
        let slots = self.slots.lock().await;
        slots
            .values()
            .filter(|attempt| matches!(attempt.peek(), Some(Ok(_))))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
