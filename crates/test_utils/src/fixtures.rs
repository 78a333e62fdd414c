//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for customer onboarding tests. Every
//! identifier here passes its checksum, so tests only fail where they intend to.

use chrono::NaiveDate;
use std::sync::Arc;

use core_kernel::{Clock, FixedClock};
use domain_customer::ContactInfo;

/// Fixture for identifier test data
pub struct IdentifierFixtures;

impl IdentifierFixtures {
    /// A valid national identity number
    pub fn national_id() -> &'static str {
        "12345678950"
    }

    /// A second valid national identity number, distinct from the first
    pub fn other_national_id() -> &'static str {
        "19090909018"
    }

    /// Eleven digits with a wrong final check digit
    pub fn bad_checksum_national_id() -> &'static str {
        "12345678951"
    }

    /// A valid tax number
    pub fn tax_number() -> &'static str {
        "1234567896"
    }

    /// A second valid tax number
    pub fn other_tax_number() -> &'static str {
        "0000000080"
    }

    /// Ten digits with a wrong check digit
    pub fn bad_checksum_tax_number() -> &'static str {
        "1234567890"
    }

    pub fn registration_number() -> &'static str {
        "IST-338172"
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The business date all fixture clocks are pinned to (Oct 16, 2026)
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    /// A clock pinned to [`TemporalFixtures::today`]
    pub fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::on(Self::today()))
    }

    /// Birth date of someone who turned 18 exactly today
    pub fn eighteenth_birthday_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2008, 10, 16).unwrap()
    }

    /// Birth date of someone who turns 18 tomorrow
    pub fn seventeen_years_old() -> NaiveDate {
        NaiveDate::from_ymd_opt(2008, 10, 17).unwrap()
    }

    /// An adult birth date
    pub fn adult_birth_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1988, 2, 29).unwrap()
    }

    /// A foundation date well inside the corporate bounds
    pub fn company_founded() -> NaiveDate {
        NaiveDate::from_ymd_opt(2009, 5, 12).unwrap()
    }
}

/// Fixture for contact test data
pub struct ContactFixtures;

impl ContactFixtures {
    pub fn primary() -> ContactInfo {
        ContactInfo {
            email: "deniz.aydin@example.com".to_string(),
            phone_number: "+905551234567".to_string(),
            address: "Beşiktaş, İstanbul".to_string(),
        }
    }

    pub fn secondary() -> ContactInfo {
        ContactInfo {
            email: "kerem.ozturk@example.com".to_string(),
            phone_number: "+905559876543".to_string(),
            address: "Nilüfer, Bursa".to_string(),
        }
    }
}
