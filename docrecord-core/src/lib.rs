//! docrecord-core: collection-scoped record access over document stores
//!
//! A [`RecordProvider`] exposes get-all / get / create / update / delete on
//! named collections. Connections come from a [`ConnectionRegistry`], which
//! opens each distinct (connection string, options) target once and shares
//! it. Store backends plug in through the traits in [`store`]; an in-memory
//! backend lives in [`memory`].

pub mod config;
pub mod error;
pub mod memory;
pub mod options;
pub mod provider;
pub mod record;
pub mod registry;
pub mod store;

pub use config::{ConfigError, DocrecordConfig};
pub use error::{DriverError, RecordError, Result, SharedFault};
pub use memory::{MemoryConnector, MemoryFault};
pub use options::{ConnectTarget, ConnectionOptions, ReplicaSetOptions};
pub use provider::RecordProvider;
pub use record::{Record, RecordId, ID_FIELD};
pub use registry::ConnectionRegistry;
pub use store::{Connection, Connector, FaultClassifier, FaultKind, UpdateOutcome};
