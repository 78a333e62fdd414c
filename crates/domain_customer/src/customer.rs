//! Customer aggregate
//!
//! A customer is either an individual or a corporate. Both share contact
//! information (email, phone, address) whose uniqueness is enforced across
//! active customers. Removal is a soft delete: `deleted_at` is set and the
//! record stops counting towards uniqueness.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::CustomerId;

use crate::age::age_in_years;
use crate::listing::fold_search_text;

/// Personal details of an individual customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualDetails {
    pub first_name: String,
    pub last_name: String,
    /// 11-digit national identity number
    pub national_id: String,
    pub date_of_birth: NaiveDate,
    pub mother_name: Option<String>,
    pub father_name: Option<String>,
}

/// Company details of a corporate customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateDetails {
    pub company_name: String,
    /// 10-digit tax number
    pub tax_number: String,
    pub tax_office: String,
    pub company_registration_number: String,
    pub authorized_person_name: String,
    pub company_foundation_date: NaiveDate,
}

/// The kind of customer with its kind-specific details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CustomerKind {
    Individual(IndividualDetails),
    Corporate(CorporateDetails),
}

impl CustomerKind {
    /// Short lowercase name, also used as the storage discriminator
    pub fn name(&self) -> &'static str {
        match self {
            CustomerKind::Individual(_) => "individual",
            CustomerKind::Corporate(_) => "corporate",
        }
    }

    /// National id for individuals, tax number for corporates
    pub fn primary_identifier(&self) -> &str {
        match self {
            CustomerKind::Individual(details) => &details.national_id,
            CustomerKind::Corporate(details) => &details.tax_number,
        }
    }

    /// Date of birth or company foundation date
    pub fn reference_date(&self) -> NaiveDate {
        match self {
            CustomerKind::Individual(details) => details.date_of_birth,
            CustomerKind::Corporate(details) => details.company_foundation_date,
        }
    }

    pub fn is_individual(&self) -> bool {
        matches!(self, CustomerKind::Individual(_))
    }
}

/// Contact information shared by both customer kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub phone_number: String,
    pub address: String,
}

/// A bank customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub kind: CustomerKind,
    pub contact: ContactInfo,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Soft-delete marker; set means the record is excluded from uniqueness
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Age of an individual customer on the given date
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        match &self.kind {
            CustomerKind::Individual(details) => Some(age_in_years(details.date_of_birth, today)),
            CustomerKind::Corporate(_) => None,
        }
    }

    /// Age of a corporate customer's company on the given date
    pub fn company_age_on(&self, today: NaiveDate) -> Option<i32> {
        match &self.kind {
            CustomerKind::Individual(_) => None,
            CustomerKind::Corporate(details) => {
                Some(age_in_years(details.company_foundation_date, today))
            }
        }
    }

    /// Full name for individuals, company name for corporates
    pub fn display_name(&self) -> String {
        match &self.kind {
            CustomerKind::Individual(details) => {
                format!("{} {}", details.first_name, details.last_name)
            }
            CustomerKind::Corporate(details) => details.company_name.clone(),
        }
    }

    /// Folded display name that listing searches match against
    pub fn search_text(&self) -> String {
        fold_search_text(&self.display_name())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Marks the customer as deleted; repeated calls keep the first timestamp
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(now);
            self.updated_at = Some(now);
        }
        self.is_active = false;
    }

    pub fn replace_contact(&mut self, contact: ContactInfo, now: DateTime<Utc>) {
        self.contact = contact;
        self.updated_at = Some(now);
    }
}
