//! Age and company-age bounds
//!
//! One rule serves both customer kinds: individuals are measured from their
//! date of birth, corporates from their foundation date.

use chrono::{Datelike, NaiveDate};

use crate::error::ErrorKind;
use crate::validation::{FieldName, ValidationOutcome};

/// Inclusive age bounds in whole years
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBounds {
    pub min: i32,
    pub max: i32,
}

impl AgeBounds {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, age: i32) -> bool {
        (self.min..=self.max).contains(&age)
    }
}

/// A bound applied to one date field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRule {
    pub field: FieldName,
    pub bounds: AgeBounds,
    /// Used in messages, e.g. "Customer must be at least 18 years old"
    pub subject: &'static str,
}

pub const INDIVIDUAL_AGE: AgeRule = AgeRule {
    field: FieldName::DateOfBirth,
    bounds: AgeBounds::new(18, 100),
    subject: "Customer",
};

pub const COMPANY_AGE: AgeRule = AgeRule {
    field: FieldName::CompanyFoundationDate,
    bounds: AgeBounds::new(1, 200),
    subject: "Company",
};

/// Whole years elapsed between `since` and `today`
///
/// The anniversary is compared on (month, day), so a Feb 29 date turns a
/// year older on Mar 1 in non-leap years. Dates in the future yield a
/// negative age.
pub fn age_in_years(since: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - since.year();
    if (today.month(), today.day()) < (since.month(), since.day()) {
        years - 1
    } else {
        years
    }
}

/// Stateless age bound check
#[derive(Debug, Clone, Copy, Default)]
pub struct AgeBoundValidator;

impl AgeBoundValidator {
    pub fn validate_age(rule: &AgeRule, since: NaiveDate, today: NaiveDate) -> ValidationOutcome {
        let age = age_in_years(since, today);
        if rule.bounds.contains(age) {
            return ValidationOutcome::Valid;
        }

        let message = if age < rule.bounds.min {
            format!("{} must be at least {} years old", rule.subject, rule.bounds.min)
        } else {
            format!("{} must be at most {} years old", rule.subject, rule.bounds.max)
        };
        ValidationOutcome::fail(rule.field, ErrorKind::Range, message)
    }
}
