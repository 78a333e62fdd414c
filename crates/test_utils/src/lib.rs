//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! customer onboarding test suite.
//!
//! # Modules
//!
//! - `fixtures`: Identifiers, dates and contacts that are known to be valid
//! - `builders`: Builder patterns for requests and stored customers
//! - `database`: PostgreSQL container management
//! - `assertions`: Assertion helpers for validation outcomes
//! - `generators`: Property-based test data generators

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use database::*;
pub use fixtures::*;
pub use generators::*;
