//! Store driver traits
//!
//! A backend supplies three things:
//! - a [`Connector`] that opens physical connections
//! - a [`Connection`] exposing the handful of document operations the
//!   provider needs
//! - a [`FaultClassifier`] that maps its raw driver errors onto [`FaultKind`]
//!
//! Everything store-specific (wire protocol, pooling, failover, error codes)
//! stays behind these traits.

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DriverError;
use crate::options::ConnectTarget;
use crate::record::{Record, RecordId};

/// Result of a field-level update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Documents matched by the identifier filter
    pub matched: u64,
    /// Whether a new document was inserted
    pub upserted: bool,
}

impl UpdateOutcome {
    pub fn matched(count: u64) -> Self {
        Self {
            matched: count,
            upserted: false,
        }
    }

    pub fn upserted() -> Self {
        Self {
            matched: 0,
            upserted: true,
        }
    }

    /// Nothing matched and nothing was created.
    pub fn is_miss(&self) -> bool {
        self.matched == 0 && !self.upserted
    }
}

/// Domain meaning of a raw driver fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Unique identifier constraint violated
    DuplicateKey,
    /// Anything else; passed through to the caller
    Other,
}

/// Maps raw driver errors to [`FaultKind`].
pub trait FaultClassifier: Send + Sync {
    fn classify(&self, fault: &(dyn StdError + 'static)) -> FaultKind;
}

/// An open connection to a document store.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Every record in `collection`, in the store's natural order.
    async fn find_all(&self, collection: &str) -> Result<Vec<Record>, DriverError>;

    async fn find_by_id(&self, collection: &str, id: &RecordId)
        -> Result<Option<Record>, DriverError>;

    /// Insert `record`, which already carries its `_id`.
    async fn insert(&self, collection: &str, record: &Record) -> Result<(), DriverError>;

    /// Set each field of `patch` on the record identified by `id`, leaving
    /// other fields alone. With `upsert`, a missing record is created from
    /// `patch` (which carries `_id`).
    async fn merge(
        &self,
        collection: &str,
        id: &RecordId,
        patch: &Record,
        upsert: bool,
    ) -> Result<UpdateOutcome, DriverError>;

    /// Remove the record identified by `id`; returns how many were removed.
    async fn remove(&self, collection: &str, id: &RecordId) -> Result<u64, DriverError>;

    async fn close(&self) -> Result<(), DriverError>;
}

/// Opens physical connections for a [`ConnectTarget`].
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, target: &ConnectTarget) -> Result<Arc<dyn Connection>, DriverError>;

    fn fault_classifier(&self) -> Arc<dyn FaultClassifier>;
}
