/// Structured error types for docrecord-core.
///
/// Provider operations fail with [`RecordError`]. Argument, not-found and
/// validation failures are produced by this crate; everything else the
/// underlying driver reports is carried through untouched in
/// [`RecordError::Driver`] so callers can downcast to the driver's own type.
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::record::RecordId;

/// Boxed error raised by a store driver.
pub type DriverError = Box<dyn StdError + Send + Sync + 'static>;

/// One driver fault handed to several callers, e.g. every caller waiting on
/// the same failed connect. Display and source are those of the inner fault.
#[derive(Debug, Clone)]
pub struct SharedFault(Arc<DriverError>);

impl SharedFault {
    pub fn new(fault: Arc<DriverError>) -> Self {
        Self(fault)
    }

    /// The fault as the driver raised it.
    pub fn get(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref().as_ref()
    }

    /// Whether `self` and `other` carry the very same fault.
    pub fn same_as(&self, other: &SharedFault) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for SharedFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.get(), f)
    }
}

impl StdError for SharedFault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.get().source()
    }
}

/// Main error type for record provider operations
#[derive(Error, Debug)]
pub enum RecordError {
    /// Invalid construction input (e.g. missing connection string)
    #[error("{0}")]
    Argument(String),

    /// No record with the requested identifier
    #[error("The record {id} in {collection} does not exist.")]
    NotFound { collection: String, id: RecordId },

    /// Identifier conflict on write
    #[error("The record {id} in {collection} already exists.")]
    Validation { collection: String, id: RecordId },

    /// Any other store fault, unmodified
    #[error(transparent)]
    Driver(DriverError),
}

/// Result type alias for docrecord-core operations
pub type Result<T> = std::result::Result<T, RecordError>;

impl RecordError {
    /// Create an argument error
    pub fn argument(reason: impl Into<String>) -> Self {
        Self::Argument(reason.into())
    }

    /// Create a not-found error
    pub fn not_found(collection: impl Into<String>, id: impl Into<RecordId>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a validation (conflict) error
    pub fn validation(collection: impl Into<String>, id: impl Into<RecordId>) -> Self {
        Self::Validation {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Wrap a driver fault
    pub fn driver(source: impl Into<DriverError>) -> Self {
        Self::Driver(source.into())
    }

    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// The driver's own error, if this is a passthrough fault.
    ///
    /// A [`SharedFault`] is looked through, so callers see the fault the
    /// driver raised whether or not it was shared.
    pub fn driver_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Driver(source) => match source.downcast_ref::<SharedFault>() {
                Some(shared) => Some(shared.get()),
                None => Some(source.as_ref()),
            },
            _ => None,
        }
    }

    /// Downcast a passthrough fault to a concrete driver error type.
    pub fn downcast_driver<E: StdError + 'static>(&self) -> Option<&E> {
        self.driver_error().and_then(|source| source.downcast_ref::<E>())
    }
}
