//! Connector and connection over the official MongoDB driver

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use docrecord_core::{
    ConnectTarget, Connection, Connector, DriverError, FaultClassifier, Record, RecordId,
    UpdateOutcome, ID_FIELD,
};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tracing::{debug, info};

use crate::convert::{document_to_record, id_filter, record_to_document};
use crate::fault::{MongoFault, MongoFaultClassifier};

/// Database used when the connection string names none.
pub const DEFAULT_DATABASE: &str = "test";

/// Build driver options for `target`.
///
/// The connect timeout doubles as the server selection timeout so an
/// unreachable deployment fails within it. Keep-alive has no driver
/// equivalent and the driver always reconnects, so both are ignored.
pub async fn client_options(target: &ConnectTarget) -> Result<ClientOptions, DriverError> {
    let mut options = ClientOptions::parse(target.connection_string()).await?;
    let settings = target.options();

    options.connect_timeout = Some(settings.connect_timeout);
    options.server_selection_timeout = Some(settings.connect_timeout);
    if let Some(replica_set) = &settings.replica_set {
        options.repl_set_name = Some(replica_set.name.clone());
        options.connect_timeout = Some(replica_set.connect_timeout);
    }

    debug!(
        keep_alive_ms = settings.keep_alive.as_millis() as u64,
        auto_reconnect = settings.auto_reconnect,
        "keep-alive and reconnect are managed by the driver"
    );

    Ok(options)
}

/// Opens [`MongoConnection`]s.
#[derive(Debug, Default, Clone)]
pub struct MongoConnector;

impl MongoConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self, target: &ConnectTarget) -> Result<Arc<dyn Connection>, DriverError> {
        let options = client_options(target).await?;
        let client = Client::with_options(options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));

        info!(
            connection = %target,
            database = database.name(),
            "Connected to MongoDB"
        );

        Ok(Arc::new(MongoConnection {
            client,
            database,
            closed: AtomicBool::new(false),
        }))
    }

    fn fault_classifier(&self) -> Arc<dyn FaultClassifier> {
        Arc::new(MongoFaultClassifier)
    }
}

/// A live client bound to one database.
pub struct MongoConnection {
    client: Client,
    database: Database,
    closed: AtomicBool,
}

impl MongoConnection {
    fn collection(&self, name: &str) -> Result<Collection<Document>, DriverError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(MongoFault::Closed.into());
        }
        Ok(self.database.collection(name))
    }
}

#[async_trait]
impl Connection for MongoConnection {
    async fn find_all(&self, collection: &str) -> Result<Vec<Record>, DriverError> {
        let documents: Vec<Document> = self
            .collection(collection)?
            .find(doc! {})
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(document_to_record).collect()
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> Result<Option<Record>, DriverError> {
        self.collection(collection)?
            .find_one(id_filter(id)?)
            .await?
            .map(document_to_record)
            .transpose()
    }

    async fn insert(&self, collection: &str, record: &Record) -> Result<(), DriverError> {
        self.collection(collection)?
            .insert_one(record_to_document(record)?)
            .await?;
        Ok(())
    }

    async fn merge(
        &self,
        collection: &str,
        id: &RecordId,
        patch: &Record,
        upsert: bool,
    ) -> Result<UpdateOutcome, DriverError> {
        let fields = record_to_document(&patch.without_id())?;
        // An empty $set is rejected by the server
        let update = if fields.is_empty() {
            doc! { "$setOnInsert": { ID_FIELD: bson::to_bson(id.as_value())? } }
        } else {
            doc! { "$set": fields }
        };

        let result = self
            .collection(collection)?
            .update_one(id_filter(id)?, update)
            .upsert(upsert)
            .await?;

        debug!(
            collection,
            matched = result.matched_count,
            modified = result.modified_count,
            upserted = result.upserted_id.is_some(),
            "update_one"
        );

        Ok(if result.upserted_id.is_some() {
            UpdateOutcome::upserted()
        } else {
            UpdateOutcome::matched(result.matched_count)
        })
    }

    async fn remove(&self, collection: &str, id: &RecordId) -> Result<u64, DriverError> {
        let result = self
            .collection(collection)?
            .delete_one(id_filter(id)?)
            .await?;
        Ok(result.deleted_count)
    }

    async fn close(&self) -> Result<(), DriverError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.client.clone().shutdown().await;
        info!("MongoDB client shut down");
        Ok(())
    }
}
