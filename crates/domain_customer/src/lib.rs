//! Customer Onboarding Domain
//!
//! This crate decides whether a new individual or corporate customer may be
//! onboarded, and runs the creation workflow around that decision.
//!
//! # Validation pipeline
//!
//! ```text
//! CustomerService::create
//!   └─ BusinessRuleOrchestrator::validate_create
//!        1. IdentifierValidator   (national id / tax number checksum)  fail fast
//!        2. AgeBoundValidator     (age / company age bounds)           fail fast
//!        3. ExistenceChecker      (identifier, email, phone, [reg no]) aggregate
//!   └─ CustomerFactory::create
//!   └─ CustomerPort::save         (unique constraint is authoritative)
//! ```
//!
//! Listings (`CustomerService::list`) resolve age bounds against the same
//! business date into a [`ListCriteria`] that adapters evaluate.
//!
//! # Examples
//!
//! ```rust
//! use domain_customer::identifier::IdentifierValidator;
//! use domain_customer::age::{AgeBoundValidator, INDIVIDUAL_AGE};
//! use chrono::NaiveDate;
//!
//! assert!(IdentifierValidator::validate_national_id("12345678950").is_valid());
//!
//! let born = NaiveDate::from_ymd_opt(2008, 10, 17).unwrap();
//! let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
//! assert!(!AgeBoundValidator::validate_age(&INDIVIDUAL_AGE, born, today).is_valid());
//! ```

pub mod age;
pub mod customer;
pub mod error;
pub mod existence;
pub mod factory;
pub mod identifier;
pub mod listing;
pub mod ports;
pub mod rules;
pub mod service;
pub mod validation;

pub use age::{AgeBoundValidator, AgeBounds, AgeRule, COMPANY_AGE, INDIVIDUAL_AGE};
pub use customer::{ContactInfo, CorporateDetails, Customer, CustomerKind, IndividualDetails};
pub use error::{CustomerError, ErrorKind};
pub use existence::ExistenceChecker;
pub use factory::CustomerFactory;
pub use identifier::IdentifierValidator;
pub use listing::{
    fold_search_text, CustomerListQuery, CustomerType, DateWindow, ListCriteria, Page,
    DEFAULT_PAGE_SIZE,
};
pub use ports::{CustomerPort, CustomerPortExt, ExistenceQuery, RecordFilter, UniqueField};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockCustomerPort;
pub use rules::{
    BusinessRuleOrchestrator, CreateCustomerRequest, IdentifierKind, RuleSet, CORPORATE_RULES,
    INDIVIDUAL_RULES,
};
pub use service::CustomerService;
pub use validation::{FieldFailure, FieldFailures, FieldName, ValidationOutcome};
