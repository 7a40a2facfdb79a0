//! In-process document store
//!
//! Backs `memory://` connection strings and the test suites. Databases are
//! keyed by connection string, so reconnecting to the same string sees the
//! same data. The connector counts physical connects and can be told to
//! delay or fail them.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::error::DriverError;
use crate::options::ConnectTarget;
use crate::record::{Record, RecordId};
use crate::store::{Connection, Connector, FaultClassifier, FaultKind, UpdateOutcome};

/// Faults raised by the in-memory store.
#[derive(Debug, Error)]
pub enum MemoryFault {
    #[error("E11000 duplicate key error collection: {collection} index: _id_ dup key: {{ _id: {id} }}")]
    DuplicateKey { collection: String, id: String },

    #[error("connection closed")]
    Closed,

    #[error("failed to connect to {target}: connection refused")]
    Refused { target: String },
}

#[derive(Default)]
struct MemoryDatabase {
    collections: RwLock<HashMap<String, Vec<Record>>>,
}

/// Opens [`MemoryConnection`]s.
#[derive(Default)]
pub struct MemoryConnector {
    databases: Mutex<HashMap<String, Arc<MemoryDatabase>>>,
    connects: AtomicUsize,
    failures_pending: AtomicUsize,
    connect_delay: Option<Duration>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every connect.
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Make the next `count` connects fail with [`MemoryFault::Refused`].
    pub fn fail_next_connects(&self, count: usize) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    /// Physical connect attempts so far, failed ones included.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, target: &ConnectTarget) -> Result<Arc<dyn Connection>, DriverError> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }

        if self.take_failure() {
            return Err(MemoryFault::Refused {
                target: target.redacted(),
            }
            .into());
        }

        let database = {
            let mut databases = self.databases.lock().await;
            Arc::clone(
                databases
                    .entry(target.connection_string().to_owned())
                    .or_default(),
            )
        };

        Ok(Arc::new(MemoryConnection {
            database,
            closed: AtomicBool::new(false),
        }))
    }

    fn fault_classifier(&self) -> Arc<dyn FaultClassifier> {
        Arc::new(MemoryFaultClassifier)
    }
}

/// Connection to one in-memory database.
pub struct MemoryConnection {
    database: Arc<MemoryDatabase>,
    closed: AtomicBool,
}

impl MemoryConnection {
    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(MemoryFault::Closed.into());
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn find_all(&self, collection: &str) -> Result<Vec<Record>, DriverError> {
        self.ensure_open()?;
        let collections = self.database.collections.read().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> Result<Option<Record>, DriverError> {
        self.ensure_open()?;
        let collections = self.database.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|records| records.iter().find(|r| r.matches_id(id)))
            .cloned())
    }

    async fn insert(&self, collection: &str, record: &Record) -> Result<(), DriverError> {
        self.ensure_open()?;
        let id = record.id().unwrap_or_else(RecordId::generate);

        let mut collections = self.database.collections.write().await;
        let records = collections.entry(collection.to_owned()).or_default();
        if records.iter().any(|r| r.matches_id(&id)) {
            return Err(MemoryFault::DuplicateKey {
                collection: collection.to_owned(),
                id: id.to_string(),
            }
            .into());
        }

        let mut stored = record.clone();
        stored.set_id(id);
        records.push(stored);
        Ok(())
    }

    async fn merge(
        &self,
        collection: &str,
        id: &RecordId,
        patch: &Record,
        upsert: bool,
    ) -> Result<UpdateOutcome, DriverError> {
        self.ensure_open()?;
        let mut collections = self.database.collections.write().await;

        if let Some(existing) = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r.matches_id(id)))
        {
            existing.merge(&patch.without_id());
            return Ok(UpdateOutcome::matched(1));
        }

        if !upsert {
            return Ok(UpdateOutcome::matched(0));
        }

        let mut created = patch.clone();
        created.set_id(id);
        collections
            .entry(collection.to_owned())
            .or_default()
            .push(created);
        Ok(UpdateOutcome::upserted())
    }

    async fn remove(&self, collection: &str, id: &RecordId) -> Result<u64, DriverError> {
        self.ensure_open()?;
        let mut collections = self.database.collections.write().await;
        let Some(records) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match records.iter().position(|r| r.matches_id(id)) {
            Some(index) => {
                records.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Classifies [`MemoryFault`]s.
pub struct MemoryFaultClassifier;

impl FaultClassifier for MemoryFaultClassifier {
    fn classify(&self, fault: &(dyn StdError + 'static)) -> FaultKind {
        match fault.downcast_ref::<MemoryFault>() {
            Some(MemoryFault::DuplicateKey { .. }) => FaultKind::DuplicateKey,
            _ => FaultKind::Other,
        }
    }
}
