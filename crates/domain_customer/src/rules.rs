//! Business rule orchestration
//!
//! A creation request passes three steps in a fixed order:
//!
//! 1. Primary identifier shape and checksum (national id or tax number).
//! 2. Age or company-age bounds.
//! 3. Existence checks for the identifier, email, phone and, for corporates,
//!    the company registration number.
//!
//! Steps 1 and 2 are pure and stop the pass on the first failure. Step 3 runs
//! its checks concurrently and reports every conflicting field at once.
//!
//! The two customer kinds differ only in their [`RuleSet`]; the orchestrator
//! itself has a single code path.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use core_kernel::{Clock, CustomerId};

use crate::age::{AgeBoundValidator, AgeRule, COMPANY_AGE, INDIVIDUAL_AGE};
use crate::customer::{ContactInfo, CustomerKind};
use crate::error::CustomerError;
use crate::existence::ExistenceChecker;
use crate::identifier::IdentifierValidator;
use crate::ports::{CustomerPort, UniqueField};
use crate::validation::ValidationOutcome;

/// Which checksum applies to the primary identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    NationalId,
    TaxNumber,
}

impl IdentifierKind {
    pub fn validate(&self, value: &str) -> ValidationOutcome {
        match self {
            IdentifierKind::NationalId => IdentifierValidator::validate_national_id(value),
            IdentifierKind::TaxNumber => IdentifierValidator::validate_tax_number(value),
        }
    }
}

/// Kind-specific validation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    pub identifier: IdentifierKind,
    pub age: AgeRule,
    /// Existence checks, in reporting order
    pub unique_fields: &'static [UniqueField],
}

pub const INDIVIDUAL_RULES: RuleSet = RuleSet {
    identifier: IdentifierKind::NationalId,
    age: INDIVIDUAL_AGE,
    unique_fields: &[UniqueField::NationalId, UniqueField::Email, UniqueField::PhoneNumber],
};

pub const CORPORATE_RULES: RuleSet = RuleSet {
    identifier: IdentifierKind::TaxNumber,
    age: COMPANY_AGE,
    unique_fields: &[
        UniqueField::TaxNumber,
        UniqueField::Email,
        UniqueField::PhoneNumber,
        UniqueField::CompanyRegistrationNumber,
    ],
};

impl RuleSet {
    pub fn for_kind(kind: &CustomerKind) -> &'static RuleSet {
        match kind {
            CustomerKind::Individual(_) => &INDIVIDUAL_RULES,
            CustomerKind::Corporate(_) => &CORPORATE_RULES,
        }
    }
}

/// Request to onboard a new customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCustomerRequest {
    pub kind: CustomerKind,
    pub contact: ContactInfo,
}

impl CreateCustomerRequest {
    pub fn new(kind: CustomerKind, contact: ContactInfo) -> Self {
        Self { kind, contact }
    }

    pub fn value_of(&self, field: UniqueField) -> Option<&str> {
        field.value_in(&self.kind, &self.contact)
    }
}

/// Combines identifier, age and existence rules into one decision
#[derive(Clone)]
pub struct BusinessRuleOrchestrator {
    existence: ExistenceChecker,
    clock: Arc<dyn Clock>,
}

impl BusinessRuleOrchestrator {
    pub fn new(port: Arc<dyn CustomerPort>, clock: Arc<dyn Clock>) -> Self {
        Self {
            existence: ExistenceChecker::new(port),
            clock,
        }
    }

    /// Validates a creation request
    ///
    /// Returns `Ok(Invalid)` for a deterministic rejection. `Err` means the
    /// decision could not be made: the token was cancelled or the store failed.
    #[instrument(skip_all, fields(kind = request.kind.name()))]
    pub async fn validate_create(
        &self,
        request: &CreateCustomerRequest,
        cancel: &CancellationToken,
    ) -> Result<ValidationOutcome, CustomerError> {
        let rules = RuleSet::for_kind(&request.kind);

        let outcome = rules.identifier.validate(request.kind.primary_identifier());
        if !outcome.is_valid() {
            debug!("identifier rejected");
            return Ok(outcome);
        }

        let outcome = AgeBoundValidator::validate_age(
            &rules.age,
            request.kind.reference_date(),
            self.clock.today(),
        );
        if !outcome.is_valid() {
            debug!("age bound rejected");
            return Ok(outcome);
        }

        let checks: Vec<(UniqueField, &str)> = rules
            .unique_fields
            .iter()
            .filter_map(|field| request.value_of(*field).map(|value| (*field, value)))
            .collect();
        let failures = self.existence.conflicts(&checks, None, cancel).await?;

        debug!(conflicts = failures.len(), "existence checks complete");
        Ok(ValidationOutcome::from_failures(failures))
    }

    /// Validates new contact information for an existing customer
    ///
    /// The customer's own record never counts as a duplicate.
    #[instrument(skip_all, fields(customer_id = %customer_id))]
    pub async fn validate_contact_update(
        &self,
        customer_id: CustomerId,
        contact: &ContactInfo,
        cancel: &CancellationToken,
    ) -> Result<ValidationOutcome, CustomerError> {
        let checks = [
            (UniqueField::Email, contact.email.as_str()),
            (UniqueField::PhoneNumber, contact.phone_number.as_str()),
        ];
        let failures = self
            .existence
            .conflicts(&checks, Some(customer_id), cancel)
            .await?;
        Ok(ValidationOutcome::from_failures(failures))
    }
}
