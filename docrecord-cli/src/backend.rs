//! Backend selection by connection string scheme

use std::sync::Arc;

use anyhow::{bail, Result};
use docrecord_core::{ConnectTarget, Connector, MemoryConnector};
use docrecord_mongo::MongoConnector;
use docrecord_postgres::PgConnector;

/// Which store a connection string points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Mongo,
    Postgres,
    Memory,
}

impl Backend {
    pub fn for_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "mongodb" | "mongodb+srv" => Some(Self::Mongo),
            "postgres" | "postgresql" => Some(Self::Postgres),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }

    pub fn connector(self) -> Arc<dyn Connector> {
        match self {
            Self::Mongo => Arc::new(MongoConnector::new()),
            Self::Postgres => Arc::new(PgConnector::new()),
            Self::Memory => Arc::new(MemoryConnector::new()),
        }
    }
}

/// Validate `connection_string` and pick its backend.
pub fn select(connection_string: &str) -> Result<Backend> {
    let target = ConnectTarget::new(connection_string, None)?;
    match Backend::for_scheme(&target.scheme()) {
        Some(backend) => Ok(backend),
        None => bail!(
            "Unsupported connection scheme '{}' (expected mongodb, mongodb+srv, postgres, postgresql or memory)",
            target.scheme()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemes_map_to_backends() {
        assert_eq!(select("mongodb://localhost/app").unwrap(), Backend::Mongo);
        assert_eq!(select("mongodb+srv://cluster.example.net/app").unwrap(), Backend::Mongo);
        assert_eq!(select("postgres://localhost/app").unwrap(), Backend::Postgres);
        assert_eq!(select("postgresql://localhost/app").unwrap(), Backend::Postgres);
        assert_eq!(select("memory://scratch").unwrap(), Backend::Memory);
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let err = select("redis://localhost").unwrap_err();
        assert!(err.to_string().contains("Unsupported connection scheme 'redis'"));
    }

    #[test]
    fn malformed_string_is_rejected() {
        assert!(select("").is_err());
        assert!(select("localhost:27017").is_err());
    }
}
