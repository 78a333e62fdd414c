//! Validation outcomes
//!
//! Every rule in the engine produces a [`ValidationOutcome`]. A failed outcome
//! always carries at least one [`FieldFailure`]; [`FieldFailures`] cannot be
//! built empty, so `Invalid` with nothing to report is unrepresentable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ErrorKind;

/// Name of a validated field as reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldName {
    NationalId,
    TaxNumber,
    CompanyRegistrationNumber,
    Email,
    PhoneNumber,
    DateOfBirth,
    CompanyFoundationDate,
}

impl FieldName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::NationalId => "NationalId",
            FieldName::TaxNumber => "TaxNumber",
            FieldName::CompanyRegistrationNumber => "CompanyRegistrationNumber",
            FieldName::Email => "Email",
            FieldName::PhoneNumber => "PhoneNumber",
            FieldName::DateOfBirth => "DateOfBirth",
            FieldName::CompanyFoundationDate => "CompanyFoundationDate",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFailure {
    pub field: FieldName,
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldFailure {
    pub fn new(field: FieldName, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.kind, self.message)
    }
}

/// Non-empty, ordered list of field failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldFailures(Vec<FieldFailure>);

impl FieldFailures {
    pub fn single(failure: FieldFailure) -> Self {
        Self(vec![failure])
    }

    /// Returns `None` when there is nothing to report
    pub fn from_vec(failures: Vec<FieldFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self(failures))
        }
    }

    pub fn first(&self) -> &FieldFailure {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldFailure> {
        self.0.iter()
    }

    /// Field names in reporting order
    pub fn fields(&self) -> Vec<FieldName> {
        self.0.iter().map(|f| f.field).collect()
    }

    pub fn contains(&self, field: FieldName, kind: ErrorKind) -> bool {
        self.0.iter().any(|f| f.field == field && f.kind == kind)
    }

    pub fn into_vec(self) -> Vec<FieldFailure> {
        self.0
    }
}

impl fmt::Display for FieldFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl<'a> IntoIterator for &'a FieldFailures {
    type Item = &'a FieldFailure;
    type IntoIter = std::slice::Iter<'a, FieldFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result of running one rule or a full validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(FieldFailures),
}

impl ValidationOutcome {
    /// Single-field rejection
    pub fn fail(field: FieldName, kind: ErrorKind, message: impl Into<String>) -> Self {
        ValidationOutcome::Invalid(FieldFailures::single(FieldFailure::new(field, kind, message)))
    }

    /// `Valid` for an empty list, `Invalid` otherwise
    pub fn from_failures(failures: Vec<FieldFailure>) -> Self {
        match FieldFailures::from_vec(failures) {
            Some(failures) => ValidationOutcome::Invalid(failures),
            None => ValidationOutcome::Valid,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn failures(&self) -> Option<&FieldFailures> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(failures) => Some(failures),
        }
    }

    /// Kind of the first failure, if any
    pub fn kind(&self) -> Option<ErrorKind> {
        self.failures().map(|f| f.first().kind)
    }

    pub fn into_result(self) -> Result<(), FieldFailures> {
        match self {
            ValidationOutcome::Valid => Ok(()),
            ValidationOutcome::Invalid(failures) => Err(failures),
        }
    }
}
