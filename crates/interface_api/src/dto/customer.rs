//! Customer DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_customer::{
    ContactInfo, CorporateDetails, CreateCustomerRequest, Customer, CustomerKind,
    CustomerListQuery, CustomerType, IndividualDetails, Page,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(
        length(min = 1, max = 255, message = "Email is required and must be at most 255 characters"),
        email(message = "Email is not a valid address")
    )]
    pub email: String,
    #[validate(
        length(min = 1, max = 20, message = "Phone number is required and must be at most 20 characters")
    )]
    pub phone_number: String,
    #[validate(
        length(min = 1, max = 500, message = "Address is required and must be at most 500 characters")
    )]
    pub address: String,
}

impl From<ContactRequest> for ContactInfo {
    fn from(request: ContactRequest) -> Self {
        ContactInfo {
            email: request.email,
            phone_number: request.phone_number,
            address: request.address,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIndividualCustomerRequest {
    #[validate(
        length(min = 1, max = 100, message = "First name is required and must be at most 100 characters")
    )]
    pub first_name: String,
    #[validate(
        length(min = 1, max = 100, message = "Last name is required and must be at most 100 characters")
    )]
    pub last_name: String,
    pub national_id: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(max = 200, message = "Mother name must be at most 200 characters"))]
    pub mother_name: Option<String>,
    #[validate(length(max = 200, message = "Father name must be at most 200 characters"))]
    pub father_name: Option<String>,
    #[validate(nested)]
    #[serde(flatten)]
    pub contact: ContactRequest,
}

impl From<CreateIndividualCustomerRequest> for CreateCustomerRequest {
    fn from(request: CreateIndividualCustomerRequest) -> Self {
        CreateCustomerRequest::new(
            CustomerKind::Individual(IndividualDetails {
                first_name: request.first_name,
                last_name: request.last_name,
                national_id: request.national_id,
                date_of_birth: request.date_of_birth,
                mother_name: request.mother_name,
                father_name: request.father_name,
            }),
            request.contact.into(),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCorporateCustomerRequest {
    #[validate(
        length(min = 1, max = 300, message = "Company name is required and must be at most 300 characters")
    )]
    pub company_name: String,
    pub tax_number: String,
    #[validate(
        length(min = 1, max = 200, message = "Tax office is required and must be at most 200 characters")
    )]
    pub tax_office: String,
    #[validate(
        length(min = 1, max = 20, message = "Company registration number is required and must be at most 20 characters")
    )]
    pub company_registration_number: String,
    #[validate(
        length(min = 1, max = 200, message = "Authorized person name is required and must be at most 200 characters")
    )]
    pub authorized_person_name: String,
    pub company_foundation_date: NaiveDate,
    #[validate(nested)]
    #[serde(flatten)]
    pub contact: ContactRequest,
}

impl From<CreateCorporateCustomerRequest> for CreateCustomerRequest {
    fn from(request: CreateCorporateCustomerRequest) -> Self {
        CreateCustomerRequest::new(
            CustomerKind::Corporate(CorporateDetails {
                company_name: request.company_name,
                tax_number: request.tax_number,
                tax_office: request.tax_office,
                company_registration_number: request.company_registration_number,
                authorized_person_name: request.authorized_person_name,
                company_foundation_date: request.company_foundation_date,
            }),
            request.contact.into(),
        )
    }
}

/// Query string of `GET /customers/individual`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListIndividualCustomersParams {
    #[validate(length(max = 200, message = "Search term must be at most 200 characters"))]
    pub search: Option<String>,
    #[validate(range(min = 0, max = 200, message = "Minimum age must be between 0 and 200"))]
    pub min_age: Option<i32>,
    #[validate(range(min = 0, max = 200, message = "Maximum age must be between 0 and 200"))]
    pub max_age: Option<i32>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub page: u32,
    pub page_size: Option<u32>,
}

impl ListIndividualCustomersParams {
    pub fn into_query(self, page_size: u32) -> CustomerListQuery {
        CustomerListQuery {
            search: self.search,
            active: self.is_active,
            ..CustomerListQuery::new(CustomerType::Individual)
                .with_ages(self.min_age, self.max_age)
                .with_page(self.page, page_size)
        }
    }
}

/// Query string of `GET /customers/corporate`; ages are company ages
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListCorporateCustomersParams {
    #[validate(length(max = 300, message = "Search term must be at most 300 characters"))]
    pub search: Option<String>,
    #[validate(range(min = 0, max = 200, message = "Minimum company age must be between 0 and 200"))]
    pub min_age: Option<i32>,
    #[validate(range(min = 0, max = 200, message = "Maximum company age must be between 0 and 200"))]
    pub max_age: Option<i32>,
    #[validate(range(min = 1, max = 9999, message = "Foundation year must be between 1 and 9999"))]
    pub foundation_year: Option<i32>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub page: u32,
    pub page_size: Option<u32>,
}

impl ListCorporateCustomersParams {
    pub fn into_query(self, page_size: u32) -> CustomerListQuery {
        CustomerListQuery {
            search: self.search,
            foundation_year: self.foundation_year,
            active: self.is_active,
            ..CustomerListQuery::new(CustomerType::Corporate)
                .with_ages(self.min_age, self.max_age)
                .with_page(self.page, page_size)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub display_name: String,
    #[serde(flatten)]
    pub kind: CustomerKind,
    /// Whole years on the business date, individuals only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    /// Whole years since foundation on the business date, corporates only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_age: Option<i32>,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CustomerResponse {
    /// Builds the response with ages taken on `today`
    pub fn new(customer: Customer, today: NaiveDate) -> Self {
        CustomerResponse {
            id: customer.id.into(),
            display_name: customer.display_name(),
            age: customer.age_on(today),
            company_age: customer.company_age_on(today),
            kind: customer.kind,
            email: customer.contact.email,
            phone_number: customer.contact.phone_number,
            address: customer.contact.address,
            is_active: customer.is_active,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerPageResponse {
    pub items: Vec<CustomerResponse>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl CustomerPageResponse {
    pub fn new(page: Page<Customer>, today: NaiveDate) -> Self {
        let (total_pages, has_previous_page, has_next_page) =
            (page.total_pages(), page.has_previous(), page.has_next());
        let page = page.map(|customer| CustomerResponse::new(customer, today));

        CustomerPageResponse {
            items: page.items,
            page: page.page,
            page_size: page.page_size,
            total_count: page.total_count,
            total_pages,
            has_previous_page,
            has_next_page,
        }
    }
}
