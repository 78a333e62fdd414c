//! PostgreSQL Customer Adapter
//!
//! This module provides the internal (database) adapter for the customer
//! domain, implementing the `CustomerPort` trait using PostgreSQL via the
//! `CustomerRepository`.
//!
//! # Overview
//!
//! The `PostgresCustomerAdapter` serves as the bridge between the domain
//! layer's port interface and the database layer. It:
//!
//! - Translates domain requests into repository operations
//! - Converts database rows back to domain models
//! - Maps violated unique indexes to the field they guard
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresCustomerAdapter;
//! use domain_customer::{CustomerPort, CustomerPortExt};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn CustomerPort> = Arc::new(PostgresCustomerAdapter::new(pool));
//! let taken = port.exists_by_email("ayse@example.com", None).await?;
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, CustomerId, DomainPort, HealthCheckResult, HealthCheckable,
    OperationMetadata, PortError,
};
use domain_customer::{
    ContactInfo, CorporateDetails, Customer, CustomerKind, CustomerPort, CustomerType,
    ExistenceQuery, IndividualDetails, ListCriteria, Page, RecordFilter, UniqueField,
};

use crate::error::DatabaseError;
use crate::repositories::customer::{CustomerRepository, CustomerRow, ListParams};

const ADAPTER_ID: &str = "postgres-customer-adapter";

const INDIVIDUAL: &str = "individual";
const CORPORATE: &str = "corporate";

/// PostgreSQL-backed implementation of the CustomerPort trait
///
/// # Error Handling
///
/// Database errors are translated to `PortError` variants:
/// - `DatabaseError::NotFound` -> `PortError::NotFound`
/// - `DatabaseError::DuplicateEntry` -> `PortError::Conflict` with the field
///   of the violated index
/// - `DatabaseError::StatementTimeout` -> `PortError::Timeout`
/// - connection failures -> `PortError::Connection`
/// - Other errors -> `PortError::Internal`
#[derive(Debug, Clone)]
pub struct PostgresCustomerAdapter {
    repository: CustomerRepository,
    pool: PgPool,
    statement_timeout: Option<Duration>,
}

impl PostgresCustomerAdapter {
    /// Creates a new PostgreSQL customer adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CustomerRepository::new(pool.clone()),
            pool,
            statement_timeout: None,
        }
    }

    /// Records the pool's statement timeout for error reporting
    pub fn with_statement_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &CustomerRepository {
        &self.repository
    }

    fn port_error(&self, operation: &str, error: DatabaseError) -> PortError {
        match error {
            DatabaseError::StatementTimeout(_) => PortError::Timeout {
                operation: operation.to_string(),
                duration_ms: self
                    .statement_timeout
                    .map(|t| t.as_millis() as u64)
                    .unwrap_or_default(),
            },
            other => db_to_port_error(other),
        }
    }
}

// Mark as a domain port
impl DomainPort for PostgresCustomerAdapter {}

#[async_trait]
impl HealthCheckable for PostgresCustomerAdapter {
    /// Checks database connectivity with `SELECT 1`
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl CustomerPort for PostgresCustomerAdapter {
    #[instrument(skip(self, query, _metadata), fields(field = %query.field))]
    async fn exists(
        &self,
        query: ExistenceQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<bool, PortError> {
        let include_deleted = query.filter == RecordFilter::IncludeDeleted;

        self.repository
            .exists(
                query.field,
                &query.field.fold(&query.value),
                query.exclude_id.map(Uuid::from),
                include_deleted,
            )
            .await
            .map_err(|e| self.port_error("exists", e))
    }

    #[instrument(skip(self, customer, _metadata), fields(customer_id = %customer.id))]
    async fn save(
        &self,
        customer: &Customer,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        debug!("Inserting customer");

        self.repository
            .insert(&customer_to_row(customer))
            .await
            .map_err(|e| self.port_error("save", e))
    }

    #[instrument(skip(self, _metadata), fields(customer_id = %id))]
    async fn get(
        &self,
        id: CustomerId,
        filter: RecordFilter,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Customer, PortError> {
        let row = self
            .repository
            .get_by_id(id.into(), filter == RecordFilter::IncludeDeleted)
            .await
            .map_err(|e| self.port_error("get", e))?;

        row_to_customer(row)
    }

    #[instrument(skip(self, contact, _metadata), fields(customer_id = %id))]
    async fn update_contact(
        &self,
        id: CustomerId,
        contact: ContactInfo,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Customer, PortError> {
        let row = self
            .repository
            .update_contact(
                id.into(),
                &contact.email,
                &contact.phone_number,
                &contact.address,
                Utc::now(),
            )
            .await
            .map_err(|e| self.port_error("update_contact", e))?;

        row_to_customer(row)
    }

    #[instrument(skip(self, _metadata), fields(customer_id = %id))]
    async fn soft_delete(
        &self,
        id: CustomerId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        self.repository
            .soft_delete(id.into(), Utc::now())
            .await
            .map_err(|e| self.port_error("soft_delete", e))
    }

    #[instrument(skip(self, criteria, _metadata), fields(kind = %criteria.kind))]
    async fn list(
        &self,
        criteria: ListCriteria,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Page<Customer>, PortError> {
        let (rows, total) = self
            .repository
            .list(&list_params(&criteria)?)
            .await
            .map_err(|e| self.port_error("list", e))?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(row_to_customer)
                .collect::<Result<_, _>>()?,
            page: criteria.page,
            page_size: criteria.page_size,
            total_count: u64::try_from(total).unwrap_or_default(),
        })
    }
}

// ============================================================================
// Conversion Helpers
// ============================================================================

/// Maps a unique index name from `migrations/` to the field it guards
pub fn unique_field_for_constraint(constraint: &str) -> Option<UniqueField> {
    match constraint {
        "customers_national_id_active_key" => Some(UniqueField::NationalId),
        "customers_tax_number_active_key" => Some(UniqueField::TaxNumber),
        "customers_registration_number_active_key" => Some(UniqueField::CompanyRegistrationNumber),
        "customers_email_active_key" => Some(UniqueField::Email),
        "customers_phone_number_active_key" => Some(UniqueField::PhoneNumber),
        _ => None,
    }
}

/// Converts database errors to port errors
fn db_to_port_error(e: DatabaseError) -> PortError {
    match e {
        DatabaseError::NotFound { entity, id } => PortError::NotFound {
            entity_type: entity,
            id,
        },
        DatabaseError::DuplicateEntry { constraint, message } => {
            let field = constraint.as_deref().and_then(unique_field_for_constraint);
            if field.is_none() {
                warn!(constraint = ?constraint, "unique violation on unmapped constraint");
            }
            PortError::Conflict {
                message,
                field: field.map(|f| f.as_str().to_string()),
            }
        }
        DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted => PortError::Connection {
            message: e.to_string(),
            source: Some(Box::new(e)),
        },
        DatabaseError::SerializationError(message) => PortError::Transformation { message },
        other => PortError::Internal {
            message: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

fn type_column(kind: CustomerType) -> &'static str {
    match kind {
        CustomerType::Individual => INDIVIDUAL,
        CustomerType::Corporate => CORPORATE,
    }
}

/// Converts listing criteria to column-level parameters
fn list_params(criteria: &ListCriteria) -> Result<ListParams, PortError> {
    let offset = i64::try_from(criteria.offset())
        .map_err(|_| PortError::validation(format!("page {} is out of range", criteria.page)))?;

    Ok(ListParams {
        customer_type: type_column(criteria.kind),
        include_deleted: criteria.filter == RecordFilter::IncludeDeleted,
        search: criteria.search.clone(),
        earliest: criteria.reference_dates.earliest,
        latest: criteria.reference_dates.latest,
        year: criteria.reference_year,
        active: criteria.active,
        limit: i64::from(criteria.page_size),
        offset,
    })
}

/// Converts a domain customer to a database row
fn customer_to_row(customer: &Customer) -> CustomerRow {
    let mut row = CustomerRow {
        id: customer.id.into(),
        customer_type: String::new(),
        first_name: None,
        last_name: None,
        national_id: None,
        date_of_birth: None,
        mother_name: None,
        father_name: None,
        company_name: None,
        tax_number: None,
        tax_office: None,
        company_registration_number: None,
        authorized_person_name: None,
        company_foundation_date: None,
        email: customer.contact.email.clone(),
        phone_number: customer.contact.phone_number.clone(),
        address: customer.contact.address.clone(),
        email_key: UniqueField::Email.fold(&customer.contact.email),
        search_name: customer.search_text(),
        is_active: customer.is_active,
        created_at: customer.created_at,
        updated_at: customer.updated_at,
        deleted_at: customer.deleted_at,
    };

    match &customer.kind {
        CustomerKind::Individual(details) => {
            row.customer_type = INDIVIDUAL.to_string();
            row.first_name = Some(details.first_name.clone());
            row.last_name = Some(details.last_name.clone());
            row.national_id = Some(details.national_id.clone());
            row.date_of_birth = Some(details.date_of_birth);
            row.mother_name = details.mother_name.clone();
            row.father_name = details.father_name.clone();
        }
        CustomerKind::Corporate(details) => {
            row.customer_type = CORPORATE.to_string();
            row.company_name = Some(details.company_name.clone());
            row.tax_number = Some(details.tax_number.clone());
            row.tax_office = Some(details.tax_office.clone());
            row.company_registration_number = Some(details.company_registration_number.clone());
            row.authorized_person_name = Some(details.authorized_person_name.clone());
            row.company_foundation_date = Some(details.company_foundation_date);
        }
    }

    row
}

fn required<T>(value: Option<T>, column: &str, id: Uuid) -> Result<T, PortError> {
    value.ok_or_else(|| PortError::Transformation {
        message: format!("customer {} is missing column {}", id, column),
    })
}

/// Converts a database row to a domain customer
fn row_to_customer(row: CustomerRow) -> Result<Customer, PortError> {
    let id = row.id;
    let kind = match row.customer_type.as_str() {
        INDIVIDUAL => CustomerKind::Individual(IndividualDetails {
            first_name: required(row.first_name, "first_name", id)?,
            last_name: required(row.last_name, "last_name", id)?,
            national_id: required(row.national_id, "national_id", id)?,
            date_of_birth: required(row.date_of_birth, "date_of_birth", id)?,
            mother_name: row.mother_name,
            father_name: row.father_name,
        }),
        CORPORATE => CustomerKind::Corporate(CorporateDetails {
            company_name: required(row.company_name, "company_name", id)?,
            tax_number: required(row.tax_number, "tax_number", id)?,
            tax_office: required(row.tax_office, "tax_office", id)?,
            company_registration_number: required(
                row.company_registration_number,
                "company_registration_number",
                id,
            )?,
            authorized_person_name: required(
                row.authorized_person_name,
                "authorized_person_name",
                id,
            )?,
            company_foundation_date: required(
                row.company_foundation_date,
                "company_foundation_date",
                id,
            )?,
        }),
        other => {
            return Err(PortError::Transformation {
                message: format!("customer {} has unknown type '{}'", id, other),
            })
        }
    };

    Ok(Customer {
        id: CustomerId::from_uuid(id),
        kind,
        contact: ContactInfo {
            email: row.email,
            phone_number: row.phone_number,
            address: row.address,
        },
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
        deleted_at: row.deleted_at,
    })
}
