//! docrecord-postgres: document records stored as PostgreSQL JSONB
//!
//! Every collection shares one table, `docrecord_documents`, keyed by
//! `(collection, id)`. The identifier is stored as JSONB so numeric and
//! string ids stay distinct, and a `seq` column preserves insertion order.
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections) per connect target
//! - Rely on the primary key, handle conflicts - no check-then-insert
//! - Field-level updates use JSONB concatenation in a single statement

pub mod connector;
pub mod documents;
pub mod migrations;
pub mod pool;

pub use connector::{PgConnection, PgConnector, PgFault, PgFaultClassifier};
pub use documents::DocumentRepo;
pub use pool::create_pool;
