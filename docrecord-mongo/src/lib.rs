//! docrecord-mongo: MongoDB backend
//!
//! Plugs a MongoDB deployment into [`docrecord_core::RecordProvider`]:
//!
//! ```ignore
//! let registry = ConnectionRegistry::shared(MongoConnector::new());
//! let users = RecordProvider::new(registry, "mongodb://localhost/app", None)?;
//! let jane = users.get("users", 23).await?;
//! ```
//!
//! Records travel as BSON documents; identifiers keep their JSON type, so
//! `23` and `"23"` address different documents.

mod client;
mod convert;
mod fault;

pub use client::{client_options, MongoConnection, MongoConnector, DEFAULT_DATABASE};
pub use convert::{document_to_record, id_filter, record_to_document};
pub use fault::{MongoFault, MongoFaultClassifier, DUPLICATE_KEY_CODE};
