//! Connector and connection over a sqlx pool

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use docrecord_core::{
    ConnectTarget, Connection, Connector, DriverError, FaultClassifier, FaultKind, Record,
    RecordId, UpdateOutcome,
};

use crate::documents::DocumentRepo;
use crate::{migrations, pool};

/// Faults raised by this backend itself rather than sqlx.
#[derive(Debug, Error)]
pub enum PgFault {
    #[error("stored body for {id} in {collection} is not a JSON object")]
    Corrupt { collection: String, id: String },
}

/// Opens [`PgConnection`]s: one pool per target, schema ensured on connect.
#[derive(Debug, Default, Clone)]
pub struct PgConnector;

impl PgConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self, target: &ConnectTarget) -> Result<Arc<dyn Connection>, DriverError> {
        let pool = pool::create_pool(
            target.connection_string(),
            target.options().connect_timeout,
        )
        .await?;
        migrations::run(&pool).await?;

        info!(connection = %target, "Connected to PostgreSQL");
        Ok(Arc::new(PgConnection { pool }))
    }

    fn fault_classifier(&self) -> Arc<dyn FaultClassifier> {
        Arc::new(PgFaultClassifier)
    }
}

/// A pool bound to the document table.
pub struct PgConnection {
    pool: PgPool,
}

impl PgConnection {
    fn repo(&self) -> DocumentRepo<'_> {
        DocumentRepo::new(&self.pool)
    }
}

fn to_record(collection: &str, body: serde_json::Value) -> Result<Record, DriverError> {
    let id = body
        .get(docrecord_core::ID_FIELD)
        .map(ToString::to_string)
        .unwrap_or_default();
    Record::try_from(body).map_err(|_| {
        PgFault::Corrupt {
            collection: collection.to_owned(),
            id,
        }
        .into()
    })
}

#[async_trait]
impl Connection for PgConnection {
    async fn find_all(&self, collection: &str) -> Result<Vec<Record>, DriverError> {
        self.repo()
            .list(collection)
            .await?
            .into_iter()
            .map(|body| to_record(collection, body))
            .collect()
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> Result<Option<Record>, DriverError> {
        self.repo()
            .get(collection, id)
            .await?
            .map(|body| to_record(collection, body))
            .transpose()
    }

    async fn insert(&self, collection: &str, record: &Record) -> Result<(), DriverError> {
        let id = record.id().unwrap_or_else(RecordId::generate);
        self.repo().insert(collection, &id, record).await?;
        Ok(())
    }

    async fn merge(
        &self,
        collection: &str,
        id: &RecordId,
        patch: &Record,
        upsert: bool,
    ) -> Result<UpdateOutcome, DriverError> {
        Ok(self.repo().merge(collection, id, patch, upsert).await?)
    }

    async fn remove(&self, collection: &str, id: &RecordId) -> Result<u64, DriverError> {
        Ok(self.repo().delete(collection, id).await?)
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
        Ok(())
    }
}

/// Maps unique-constraint violations to [`FaultKind::DuplicateKey`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PgFaultClassifier;

impl FaultClassifier for PgFaultClassifier {
    fn classify(&self, fault: &(dyn StdError + 'static)) -> FaultKind {
        match fault.downcast_ref::<sqlx::Error>() {
            Some(sqlx::Error::Database(db)) if db.is_unique_violation() => FaultKind::DuplicateKey,
            _ => FaultKind::Other,
        }
    }
}
