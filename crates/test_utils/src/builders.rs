//! Test Data Builders
//!
//! Provides builder patterns for constructing customer requests and stored
//! customers with sensible defaults. Tests specify only the fields they care
//! about.

use chrono::{DateTime, NaiveDate, Utc};

use core_kernel::CustomerId;
use domain_customer::{
    ContactInfo, CorporateDetails, CreateCustomerRequest, Customer, CustomerKind,
    IndividualDetails,
};

use crate::fixtures::{ContactFixtures, IdentifierFixtures, TemporalFixtures};

/// Builder for individual customer requests
#[derive(Debug, Clone)]
pub struct IndividualRequestBuilder {
    details: IndividualDetails,
    contact: ContactInfo,
}

impl Default for IndividualRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndividualRequestBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            details: IndividualDetails {
                first_name: "Deniz".to_string(),
                last_name: "Aydın".to_string(),
                national_id: IdentifierFixtures::national_id().to_string(),
                date_of_birth: TemporalFixtures::adult_birth_date(),
                mother_name: None,
                father_name: None,
            },
            contact: ContactFixtures::primary(),
        }
    }

    pub fn with_national_id(mut self, national_id: impl Into<String>) -> Self {
        self.details.national_id = national_id.into();
        self
    }

    pub fn with_date_of_birth(mut self, date: NaiveDate) -> Self {
        self.details.date_of_birth = date;
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.details.first_name = first.into();
        self.details.last_name = last.into();
        self
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = contact;
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.contact.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.contact.phone_number = phone.into();
        self
    }

    /// Builds the creation request
    pub fn build(self) -> CreateCustomerRequest {
        CreateCustomerRequest::new(CustomerKind::Individual(self.details), self.contact)
    }
}

/// Builder for corporate customer requests
#[derive(Debug, Clone)]
pub struct CorporateRequestBuilder {
    details: CorporateDetails,
    contact: ContactInfo,
}

impl Default for CorporateRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CorporateRequestBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            details: CorporateDetails {
                company_name: "Boğaziçi Yazılım A.Ş.".to_string(),
                tax_number: IdentifierFixtures::tax_number().to_string(),
                tax_office: "Beşiktaş".to_string(),
                company_registration_number: IdentifierFixtures::registration_number().to_string(),
                authorized_person_name: "Selin Koç".to_string(),
                company_foundation_date: TemporalFixtures::company_founded(),
            },
            contact: ContactFixtures::secondary(),
        }
    }

    pub fn with_tax_number(mut self, tax_number: impl Into<String>) -> Self {
        self.details.tax_number = tax_number.into();
        self
    }

    pub fn with_registration_number(mut self, number: impl Into<String>) -> Self {
        self.details.company_registration_number = number.into();
        self
    }

    pub fn with_foundation_date(mut self, date: NaiveDate) -> Self {
        self.details.company_foundation_date = date;
        self
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = contact;
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.contact.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.contact.phone_number = phone.into();
        self
    }

    /// Builds the creation request
    pub fn build(self) -> CreateCustomerRequest {
        CreateCustomerRequest::new(CustomerKind::Corporate(self.details), self.contact)
    }
}

/// Builder for stored customers, for seeding a store directly
#[derive(Debug, Clone)]
pub struct CustomerBuilder {
    id: CustomerId,
    request: CreateCustomerRequest,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl CustomerBuilder {
    pub fn individual(builder: IndividualRequestBuilder) -> Self {
        Self::from_request(builder.build())
    }

    pub fn corporate(builder: CorporateRequestBuilder) -> Self {
        Self::from_request(builder.build())
    }

    pub fn from_request(request: CreateCustomerRequest) -> Self {
        Self {
            id: CustomerId::new(),
            request,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    pub fn with_id(mut self, id: CustomerId) -> Self {
        self.id = id;
        self
    }

    /// Marks the customer as soft-deleted
    pub fn deleted(mut self) -> Self {
        self.deleted_at = Some(Utc::now());
        self
    }

    pub fn build(self) -> Customer {
        Customer {
            id: self.id,
            kind: self.request.kind,
            contact: self.request.contact,
            is_active: self.deleted_at.is_none(),
            created_at: self.created_at,
            updated_at: self.deleted_at,
            deleted_at: self.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_individual_builder_overrides() {
        let request = IndividualRequestBuilder::new()
            .with_national_id(IdentifierFixtures::other_national_id())
            .with_email("x@example.com")
            .build();

        assert_eq!(request.kind.primary_identifier(), IdentifierFixtures::other_national_id());
        assert_eq!(request.contact.email, "x@example.com");
    }

    #[test]
    fn test_deleted_customer() {
        let customer = CustomerBuilder::corporate(CorporateRequestBuilder::new())
            .deleted()
            .build();

        assert!(customer.is_deleted());
        assert!(!customer.is_active);
    }
}
