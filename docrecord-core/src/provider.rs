//! Record provider - collection-scoped CRUD over a memoized connection
//!
//! Every operation follows the same shape:
//! - acquire the (possibly cached) connection from the registry
//! - issue one driver call
//! - translate the outcome into a record or a [`RecordError`]
//!
//! Write faults go through the backend's [`FaultClassifier`]; a duplicate
//! identifier becomes [`RecordError::Validation`], anything else is passed
//! through as [`RecordError::Driver`].

use std::sync::Arc;

use tracing::debug;

use crate::error::{DriverError, RecordError, Result};
use crate::options::{ConnectTarget, ConnectionOptions};
use crate::record::{Record, RecordId};
use crate::registry::ConnectionRegistry;
use crate::store::{Connection, FaultClassifier, FaultKind};

/// CRUD access to the collections behind one connection target.
#[derive(Clone)]
pub struct RecordProvider {
    registry: Arc<ConnectionRegistry>,
    classifier: Arc<dyn FaultClassifier>,
    target: ConnectTarget,
}

impl RecordProvider {
    /// Create a provider for `connection_string`.
    ///
    /// Validation happens here, before any connection attempt. When `options`
    /// is `None`, defaults are derived from the connection string (see
    /// [`ConnectionOptions::derive`]).
    ///
    /// # Errors
    ///
    /// [`RecordError::Argument`] if the connection string is empty or
    /// malformed.
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        connection_string: &str,
        options: Option<ConnectionOptions>,
    ) -> Result<Self> {
        let target = ConnectTarget::new(connection_string, options)?;
        let classifier = registry.fault_classifier();
        Ok(Self {
            registry,
            classifier,
            target,
        })
    }

    pub fn target(&self) -> &ConnectTarget {
        &self.target
    }

    /// Connection string after option derivation.
    pub fn connection_string(&self) -> &str {
        self.target.connection_string()
    }

    pub fn options(&self) -> &ConnectionOptions {
        self.target.options()
    }

    async fn connection(&self) -> Result<Arc<dyn Connection>> {
        self.registry
            .acquire(&self.target)
            .await
            .map_err(RecordError::Driver)
    }

    /// All records in `collection`, in the store's natural order.
    ///
    /// A collection that was never written is simply empty.
    pub async fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        let conn = self.connection().await?;
        conn.find_all(collection).await.map_err(RecordError::Driver)
    }

    /// The record in `collection` whose identifier is `id`.
    ///
    /// # Errors
    ///
    /// [`RecordError::NotFound`] if there is no such record.
    pub async fn get(&self, collection: &str, id: impl Into<RecordId>) -> Result<Record> {
        let id = id.into();
        let conn = self.connection().await?;
        conn.find_by_id(collection, &id)
            .await
            .map_err(RecordError::Driver)?
            .ok_or_else(|| RecordError::not_found(collection, id))
    }

    /// Insert `record` into `collection`, generating a UUID v4 `_id` when it
    /// has none. Returns the stored record.
    ///
    /// # Errors
    ///
    /// [`RecordError::Validation`] if the identifier is already taken.
    pub async fn create(&self, collection: &str, mut record: Record) -> Result<Record> {
        let conn = self.connection().await?;

        let id = match record.id() {
            Some(id) => id,
            None => {
                let id = RecordId::generate();
                record.set_id(id.clone());
                id
            }
        };

        conn.insert(collection, &record)
            .await
            .map_err(|fault| self.classify_write(fault, collection, &id))?;

        Ok(record)
    }

    /// Merge `patch` into the record identified by `id` and return the record
    /// as stored afterwards.
    ///
    /// Fields present in `patch` overwrite, all others are kept. With
    /// `upsert`, a missing record is created from `patch` and `id`. The
    /// identifier itself is never rewritten.
    ///
    /// # Errors
    ///
    /// [`RecordError::Argument`] if `patch` carries an `_id` other than `id`.
    /// [`RecordError::NotFound`] if nothing matched and nothing was created.
    pub async fn update(
        &self,
        collection: &str,
        id: impl Into<RecordId>,
        mut patch: Record,
        upsert: bool,
    ) -> Result<Record> {
        let id = id.into();
        match patch.id() {
            Some(patch_id) if patch_id != id => {
                return Err(RecordError::argument(format!(
                    "Cannot change the id of record {} in {} to {}",
                    id, collection, patch_id
                )));
            }
            Some(_) => {}
            None => patch.set_id(id.clone()),
        }

        let conn = self.connection().await?;

        let outcome = conn
            .merge(collection, &id, &patch, upsert)
            .await
            .map_err(|fault| self.classify_write(fault, collection, &id))?;

        if outcome.is_miss() {
            return Err(RecordError::not_found(collection, id));
        }

        conn.find_by_id(collection, &id)
            .await
            .map_err(RecordError::Driver)?
            .ok_or_else(|| RecordError::not_found(collection, id))
    }

    /// Remove the record identified by `id`.
    ///
    /// Returns `true` if exactly one record was removed, `false` if none
    /// matched. A missing record is not an error.
    pub async fn delete(&self, collection: &str, id: impl Into<RecordId>) -> Result<bool> {
        let id = id.into();
        let conn = self.connection().await?;
        let removed = conn.remove(collection, &id).await.map_err(RecordError::Driver)?;
        Ok(removed == 1)
    }

    /// Close the shared connection.
    ///
    /// Every provider using the same target is affected; later operations
    /// fail with the driver's closed-connection error.
    pub async fn close_connection(&self) -> Result<()> {
        let conn = self.connection().await?;
        debug!(connection = %self.target, "closing connection");
        conn.close().await.map_err(RecordError::Driver)
    }

    fn classify_write(&self, fault: DriverError, collection: &str, id: &RecordId) -> RecordError {
        match self.classifier.classify(fault.as_ref()) {
            FaultKind::DuplicateKey => {
                debug!(collection, id = %id, "duplicate identifier");
                RecordError::validation(collection, id)
            }
            FaultKind::Other => RecordError::Driver(fault),
        }
    }
}

impl std::fmt::Debug for RecordProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordProvider")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
