//! Customer Domain Ports
//!
//! This module defines the storage port the customer domain depends on.
//!
//! # Architecture
//!
//! The `CustomerPort` trait is the only way the domain reaches stored
//! customers. Two adapters implement it:
//!
//! - **PostgreSQL Adapter**: `infra_db::PostgresCustomerAdapter`
//! - **Mock Adapter**: in-memory, behind the `mock` feature
//!
//! # Soft-delete filtering
//!
//! Every lookup takes a [`RecordFilter`]. There is no ambient "hide deleted
//! rows" flag; callers state whether soft-deleted records count.
//!
//! # Uniqueness
//!
//! Existence checks are a pre-flight convenience. Adapters must reject a
//! duplicate at write time with `PortError::Conflict` whose `field` is the
//! [`UniqueField::as_str`] name of the violated field.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_customer::ports::{CustomerPort, CustomerPortExt};
//!
//! let taken = port.exists_by_email("ayse@example.com", None).await?;
//! ```

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use core_kernel::{
    CustomerId, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
};

use crate::customer::{ContactInfo, Customer, CustomerKind};
use crate::listing::{ListCriteria, Page};
use crate::validation::FieldName;

/// Whether soft-deleted records take part in a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFilter {
    /// Only records whose soft-delete marker is unset
    ActiveOnly,
    /// All records
    IncludeDeleted,
}

impl RecordFilter {
    pub fn admits(&self, customer: &Customer) -> bool {
        match self {
            RecordFilter::ActiveOnly => !customer.is_deleted(),
            RecordFilter::IncludeDeleted => true,
        }
    }
}

/// A field that must be unique across active customers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    NationalId,
    TaxNumber,
    CompanyRegistrationNumber,
    Email,
    PhoneNumber,
}

impl UniqueField {
    pub const ALL: [UniqueField; 5] = [
        UniqueField::NationalId,
        UniqueField::TaxNumber,
        UniqueField::CompanyRegistrationNumber,
        UniqueField::Email,
        UniqueField::PhoneNumber,
    ];

    /// Storage name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueField::NationalId => "national_id",
            UniqueField::TaxNumber => "tax_number",
            UniqueField::CompanyRegistrationNumber => "company_registration_number",
            UniqueField::Email => "email",
            UniqueField::PhoneNumber => "phone_number",
        }
    }

    pub fn field_name(&self) -> FieldName {
        match self {
            UniqueField::NationalId => FieldName::NationalId,
            UniqueField::TaxNumber => FieldName::TaxNumber,
            UniqueField::CompanyRegistrationNumber => FieldName::CompanyRegistrationNumber,
            UniqueField::Email => FieldName::Email,
            UniqueField::PhoneNumber => FieldName::PhoneNumber,
        }
    }

    pub fn conflict_message(&self) -> &'static str {
        match self {
            UniqueField::NationalId => {
                "A customer with this national identity number already exists"
            }
            UniqueField::TaxNumber => "A customer with this tax number already exists",
            UniqueField::CompanyRegistrationNumber => {
                "A customer with this company registration number already exists"
            }
            UniqueField::Email => "A customer with this email address already exists",
            UniqueField::PhoneNumber => "A customer with this phone number already exists",
        }
    }

    /// Emails compare case-insensitively
    pub fn is_case_insensitive(&self) -> bool {
        matches!(self, UniqueField::Email)
    }

    /// Key under which a value is unique
    ///
    /// Emails fold ASCII letters only; `Ç` and `ç` stay distinct. Adapters
    /// store and compare this key rather than folding on their own.
    pub fn fold(&self, value: &str) -> String {
        if self.is_case_insensitive() {
            value.to_ascii_lowercase()
        } else {
            value.to_string()
        }
    }

    /// The value of this field for a customer of the given kind, if it applies
    pub fn value_in<'a>(&self, kind: &'a CustomerKind, contact: &'a ContactInfo) -> Option<&'a str> {
        match (self, kind) {
            (UniqueField::NationalId, CustomerKind::Individual(details)) => {
                Some(&details.national_id)
            }
            (UniqueField::TaxNumber, CustomerKind::Corporate(details)) => Some(&details.tax_number),
            (UniqueField::CompanyRegistrationNumber, CustomerKind::Corporate(details)) => {
                Some(&details.company_registration_number)
            }
            (UniqueField::Email, _) => Some(&contact.email),
            (UniqueField::PhoneNumber, _) => Some(&contact.phone_number),
            _ => None,
        }
    }

    /// Whether `customer` holds `value` in this field
    pub fn matches(&self, customer: &Customer, value: &str) -> bool {
        self.value_in(&customer.kind, &customer.contact)
            .is_some_and(|stored| self.fold(stored) == self.fold(value))
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UniqueField {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UniqueField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| PortError::validation(format!("unknown unique field: {s}")))
    }
}

/// Duplicate-detection query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistenceQuery {
    pub field: UniqueField,
    pub value: String,
    /// Record that must not count as a duplicate of itself (update path)
    pub exclude_id: Option<CustomerId>,
    pub filter: RecordFilter,
}

impl ExistenceQuery {
    /// Query against active records only
    pub fn active(field: UniqueField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            exclude_id: None,
            filter: RecordFilter::ActiveOnly,
        }
    }

    pub fn excluding(mut self, exclude_id: Option<CustomerId>) -> Self {
        self.exclude_id = exclude_id;
        self
    }

    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Evaluates the query against a single stored record
    pub fn matches(&self, customer: &Customer) -> bool {
        self.filter.admits(customer)
            && self.exclude_id != Some(customer.id)
            && self.field.matches(customer, &self.value)
    }
}

/// The storage port for customer records
///
/// All methods are async and return `Result<T, PortError>` so every adapter
/// reports failures the same way.
#[async_trait]
pub trait CustomerPort: DomainPort + HealthCheckable {
    /// Returns true if any record satisfies the query
    async fn exists(
        &self,
        query: ExistenceQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<bool, PortError>;

    /// Persists a new customer
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` naming the field when a unique value is already
    /// held by an active customer.
    async fn save(
        &self,
        customer: &Customer,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Retrieves a customer by ID, or `PortError::NotFound`
    async fn get(
        &self,
        id: CustomerId,
        filter: RecordFilter,
        metadata: Option<OperationMetadata>,
    ) -> Result<Customer, PortError>;

    /// Replaces the contact information of an active customer
    async fn update_contact(
        &self,
        id: CustomerId,
        contact: ContactInfo,
        metadata: Option<OperationMetadata>,
    ) -> Result<Customer, PortError>;

    /// Sets the soft-delete marker of an active customer
    async fn soft_delete(
        &self,
        id: CustomerId,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Returns one page of customers matching the criteria, in
    /// [`listing_order`](crate::listing::listing_order)
    async fn list(
        &self,
        criteria: ListCriteria,
        metadata: Option<OperationMetadata>,
    ) -> Result<Page<Customer>, PortError>;
}

/// Per-field existence checks against active records
#[async_trait]
pub trait CustomerPortExt: CustomerPort {
    async fn exists_by_national_id(
        &self,
        value: &str,
        exclude_id: Option<CustomerId>,
    ) -> Result<bool, PortError> {
        self.exists(
            ExistenceQuery::active(UniqueField::NationalId, value).excluding(exclude_id),
            None,
        )
        .await
    }

    async fn exists_by_tax_number(
        &self,
        value: &str,
        exclude_id: Option<CustomerId>,
    ) -> Result<bool, PortError> {
        self.exists(
            ExistenceQuery::active(UniqueField::TaxNumber, value).excluding(exclude_id),
            None,
        )
        .await
    }

    async fn exists_by_email(
        &self,
        value: &str,
        exclude_id: Option<CustomerId>,
    ) -> Result<bool, PortError> {
        self.exists(
            ExistenceQuery::active(UniqueField::Email, value).excluding(exclude_id),
            None,
        )
        .await
    }

    async fn exists_by_phone(
        &self,
        value: &str,
        exclude_id: Option<CustomerId>,
    ) -> Result<bool, PortError> {
        self.exists(
            ExistenceQuery::active(UniqueField::PhoneNumber, value).excluding(exclude_id),
            None,
        )
        .await
    }

    async fn exists_by_registration_number(
        &self,
        value: &str,
        exclude_id: Option<CustomerId>,
    ) -> Result<bool, PortError> {
        self.exists(
            ExistenceQuery::active(UniqueField::CompanyRegistrationNumber, value)
                .excluding(exclude_id),
            None,
        )
        .await
    }
}

// Blanket implementation for all CustomerPort implementors
impl<T: CustomerPort + ?Sized> CustomerPortExt for T {}

/// Mock implementation of CustomerPort for testing
///
/// Stores customers in memory. Writes take the write lock for the whole
/// uniqueness check, so concurrent saves of the same value behave like a
/// unique index: exactly one wins.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use crate::listing::listing_order;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::{Barrier, RwLock};

    /// In-memory mock implementation of CustomerPort
    #[derive(Debug, Default)]
    pub struct MockCustomerPort {
        customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
        existence_barrier: Option<Arc<Barrier>>,
        existence_delay: Option<Duration>,
        unavailable: AtomicBool,
        exists_calls: AtomicUsize,
    }

    impl MockCustomerPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with customers for testing
        pub async fn with_customers(customers: Vec<Customer>) -> Self {
            let port = Self::new();
            for customer in customers {
                port.insert(customer).await;
            }
            port
        }

        /// Every existence check waits on the barrier after reading, so the
        /// reads of concurrent requests all happen before any of them returns
        pub fn with_existence_barrier(mut self, barrier: Arc<Barrier>) -> Self {
            self.existence_barrier = Some(barrier);
            self
        }

        /// Delays every existence check
        pub fn with_existence_delay(mut self, delay: Duration) -> Self {
            self.existence_delay = Some(delay);
            self
        }

        /// Makes every call fail with `PortError::ServiceUnavailable`
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        /// Inserts without uniqueness checks
        pub async fn insert(&self, customer: Customer) {
            self.customers.write().await.insert(customer.id, customer);
        }

        pub async fn len(&self) -> usize {
            self.customers.read().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.customers.read().await.is_empty()
        }

        /// Number of existence checks served so far
        pub fn exists_calls(&self) -> usize {
            self.exists_calls.load(Ordering::SeqCst)
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "mock-customer-store".to_string(),
                });
            }
            Ok(())
        }

        fn first_conflict<'a>(
            customers: &HashMap<CustomerId, Customer>,
            fields: impl IntoIterator<Item = (UniqueField, &'a str)>,
            exclude_id: Option<CustomerId>,
        ) -> Option<UniqueField> {
            fields.into_iter().find_map(|(field, value)| {
                let query = ExistenceQuery::active(field, value).excluding(exclude_id);
                customers.values().any(|c| query.matches(c)).then_some(field)
            })
        }
    }

    impl DomainPort for MockCustomerPort {}

    #[async_trait]
    impl HealthCheckable for MockCustomerPort {
        async fn health_check(&self) -> HealthCheckResult {
            let status = if self.unavailable.load(Ordering::SeqCst) {
                core_kernel::AdapterHealth::Unhealthy
            } else {
                core_kernel::AdapterHealth::Healthy
            };
            HealthCheckResult {
                adapter_id: "mock-customer-port".to_string(),
                status,
                latency_ms: 0,
                message: Some("In-memory customer store".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl CustomerPort for MockCustomerPort {
        async fn exists(
            &self,
            query: ExistenceQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<bool, PortError> {
            self.exists_calls.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;

            if let Some(delay) = self.existence_delay {
                tokio::time::sleep(delay).await;
            }

            let found = self
                .customers
                .read()
                .await
                .values()
                .any(|c| query.matches(c));

            if let Some(barrier) = &self.existence_barrier {
                barrier.wait().await;
            }

            Ok(found)
        }

        async fn save(
            &self,
            customer: &Customer,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.check_available()?;
            let mut customers = self.customers.write().await;

            if customers.contains_key(&customer.id) {
                return Err(PortError::Conflict {
                    message: format!("customer {} already stored", customer.id),
                    field: None,
                });
            }

            let fields = UniqueField::ALL
                .into_iter()
                .filter_map(|f| f.value_in(&customer.kind, &customer.contact).map(|v| (f, v)));
            if let Some(field) = Self::first_conflict(&customers, fields, None) {
                return Err(PortError::conflict_on(field.as_str(), field.conflict_message()));
            }

            customers.insert(customer.id, customer.clone());
            Ok(())
        }

        async fn get(
            &self,
            id: CustomerId,
            filter: RecordFilter,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Customer, PortError> {
            self.check_available()?;
            self.customers
                .read()
                .await
                .get(&id)
                .filter(|c| filter.admits(c))
                .cloned()
                .ok_or_else(|| PortError::not_found("Customer", id))
        }

        async fn update_contact(
            &self,
            id: CustomerId,
            contact: ContactInfo,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Customer, PortError> {
            self.check_available()?;
            let mut customers = self.customers.write().await;

            if !customers.get(&id).is_some_and(|c| !c.is_deleted()) {
                return Err(PortError::not_found("Customer", id));
            }

            let fields = [
                (UniqueField::Email, contact.email.as_str()),
                (UniqueField::PhoneNumber, contact.phone_number.as_str()),
            ];
            if let Some(field) = Self::first_conflict(&customers, fields, Some(id)) {
                return Err(PortError::conflict_on(field.as_str(), field.conflict_message()));
            }

            let customer = customers
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Customer", id))?;
            customer.replace_contact(contact, Utc::now());
            Ok(customer.clone())
        }

        async fn soft_delete(
            &self,
            id: CustomerId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.check_available()?;
            let mut customers = self.customers.write().await;
            match customers.get_mut(&id) {
                Some(customer) if !customer.is_deleted() => {
                    customer.soft_delete(Utc::now());
                    Ok(())
                }
                _ => Err(PortError::not_found("Customer", id)),
            }
        }

        async fn list(
            &self,
            criteria: ListCriteria,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Page<Customer>, PortError> {
            self.check_available()?;
            let customers = self.customers.read().await;

            let mut matching: Vec<&Customer> =
                customers.values().filter(|c| criteria.matches(c)).collect();
            matching.sort_by(|a, b| listing_order(a, b));

            let offset = usize::try_from(criteria.offset()).unwrap_or(usize::MAX);
            Ok(Page {
                total_count: matching.len() as u64,
                items: matching
                    .into_iter()
                    .skip(offset)
                    .take(criteria.page_size as usize)
                    .cloned()
                    .collect(),
                page: criteria.page,
                page_size: criteria.page_size,
            })
        }
    }
}
