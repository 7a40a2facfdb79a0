//! MongoDB error classification

use std::error::Error as StdError;

use docrecord_core::{FaultClassifier, FaultKind};
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// Server error code for a unique index violation.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Faults raised by this backend itself rather than the driver.
#[derive(Debug, Error)]
pub enum MongoFault {
    #[error("connection closed")]
    Closed,
}

/// Recognises duplicate-key write and command errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct MongoFaultClassifier;

impl MongoFaultClassifier {
    fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY_CODE,
            ErrorKind::Command(command) => command.code == DUPLICATE_KEY_CODE,
            _ => false,
        }
    }
}

impl FaultClassifier for MongoFaultClassifier {
    fn classify(&self, fault: &(dyn StdError + 'static)) -> FaultKind {
        match fault.downcast_ref::<mongodb::error::Error>() {
            Some(err) if Self::is_duplicate_key(err) => FaultKind::DuplicateKey,
            _ => FaultKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_errors_are_other() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(MongoFaultClassifier.classify(&io), FaultKind::Other);
        assert_eq!(MongoFaultClassifier.classify(&MongoFault::Closed), FaultKind::Other);
    }

    #[test]
    fn driver_errors_without_code_are_other() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = mongodb::error::Error::from(io);
        assert_eq!(MongoFaultClassifier.classify(&err), FaultKind::Other);
    }
}
