//! Customer domain errors
//!
//! Two layers live here. [`ErrorKind`] classifies a single field-level
//! rejection (format, checksum, range, conflict, not found). [`CustomerError`]
//! is what the creation workflow returns: either a deterministic rejection of
//! the input, a missing record, a cancelled request, or a port failure that is
//! passed through untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use core_kernel::{CustomerId, PortError};

use crate::validation::FieldFailures;

/// Classification of a field-level rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed identifier shape (empty, wrong length, non-digit)
    #[serde(rename = "FormatError")]
    Format,
    /// Shape is correct but the check digits do not match
    #[serde(rename = "ChecksumError")]
    Checksum,
    /// Age or company age outside the allowed bounds
    #[serde(rename = "RangeError")]
    Range,
    /// Value already registered to another active customer
    #[serde(rename = "ConflictError")]
    Conflict,
    /// Referenced record is absent
    #[serde(rename = "NotFoundError")]
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Format => "FormatError",
            ErrorKind::Checksum => "ChecksumError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Conflict => "ConflictError",
            ErrorKind::NotFound => "NotFoundError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the customer workflow
#[derive(Debug, Error)]
pub enum CustomerError {
    /// The request was rejected by a business rule
    #[error("Customer rejected: {0}")]
    Rejected(FieldFailures),

    /// No active customer with the given ID
    #[error("Customer not found: {0}")]
    NotFound(CustomerId),

    /// The caller cancelled the request before all checks completed
    #[error("Operation cancelled")]
    Cancelled,

    /// Storage failure that is not a business rule rejection
    #[error(transparent)]
    Port(#[from] PortError),
}

impl CustomerError {
    /// Returns the field failures when the request was rejected
    pub fn failures(&self) -> Option<&FieldFailures> {
        match self {
            CustomerError::Rejected(failures) => Some(failures),
            _ => None,
        }
    }

    /// Kind of the first rejection, or `NotFound` for a missing record
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CustomerError::Rejected(failures) => Some(failures.first().kind),
            CustomerError::NotFound(_) => Some(ErrorKind::NotFound),
            CustomerError::Cancelled | CustomerError::Port(_) => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CustomerError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FieldFailure, FieldName};

    #[test]
    fn test_error_kind_wire_names() {
        assert_eq!(serde_json::to_string(&ErrorKind::Checksum).unwrap(), "\"ChecksumError\"");
        assert_eq!(ErrorKind::Conflict.to_string(), "ConflictError");
    }

    #[test]
    fn test_kind_of_rejection() {
        let error = CustomerError::Rejected(FieldFailures::single(FieldFailure::new(
            FieldName::Email,
            ErrorKind::Conflict,
            "duplicate",
        )));
        assert_eq!(error.kind(), Some(ErrorKind::Conflict));
        assert!(error.failures().is_some());
        assert!(!error.is_cancelled());
    }

    #[test]
    fn test_port_errors_have_no_kind() {
        let error = CustomerError::from(PortError::connection("refused"));
        assert_eq!(error.kind(), None);
        assert!(error.to_string().contains("refused"));
    }
}
