//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for validation outcomes and
//! workflow errors that give more meaningful failure messages than a bare
//! `assert!(matches!(..))`.

use domain_customer::{CustomerError, ErrorKind, FieldName, ValidationOutcome};

/// Asserts that an outcome is valid
///
/// # Panics
///
/// Panics with the reported failures if the outcome is invalid
pub fn assert_valid(outcome: &ValidationOutcome) {
    if let Some(failures) = outcome.failures() {
        panic!("Expected a valid outcome, got failures: {:?}", failures);
    }
}

/// Asserts that an outcome rejects exactly one field with the given kind
pub fn assert_rejected_with(outcome: &ValidationOutcome, field: FieldName, kind: ErrorKind) {
    let failures = match outcome.failures() {
        Some(failures) => failures,
        None => panic!("Expected {} on {}, got a valid outcome", kind, field),
    };

    assert_eq!(
        failures.len(),
        1,
        "Expected a single failure, got {:?}",
        failures
    );
    let failure = failures.first();
    assert_eq!(failure.field, field, "Field mismatch in {:?}", failure);
    assert_eq!(failure.kind, kind, "Kind mismatch in {:?}", failure);
}

/// Asserts that a workflow error is a rejection with one conflict per field,
/// in the given order
pub fn assert_conflicts_on(error: &CustomerError, fields: &[FieldName]) {
    let failures = match error.failures() {
        Some(failures) => failures,
        None => panic!("Expected a conflict rejection, got {:?}", error),
    };

    assert_eq!(failures.fields(), fields, "Conflicting fields differ");
    assert!(
        failures.iter().all(|f| f.kind == ErrorKind::Conflict),
        "Expected only conflicts, got {:?}",
        failures
    );
}
