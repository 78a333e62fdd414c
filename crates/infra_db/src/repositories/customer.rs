//! Customer repository implementation
//!
//! Row-level access to the `customers` table. Individual and corporate
//! customers share one table with a `customer_type` discriminator; the
//! kind-specific columns of the other kind are NULL.
//!
//! Active-record uniqueness is enforced by partial unique indexes
//! (`WHERE deleted_at IS NULL`), see `migrations/`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain_customer::UniqueField;

use crate::error::DatabaseError;

/// Database row for a customer record
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: Uuid,
    pub customer_type: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub mother_name: Option<String>,
    pub father_name: Option<String>,
    pub company_name: Option<String>,
    pub tax_number: Option<String>,
    pub tax_office: Option<String>,
    pub company_registration_number: Option<String>,
    pub authorized_person_name: Option<String>,
    pub company_foundation_date: Option<NaiveDate>,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    /// `UniqueField::Email.fold(email)`
    pub email_key: String,
    /// `Customer::search_text()`
    pub search_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

const SELECT_COLUMNS: &str = r#"
    id, customer_type,
    first_name, last_name, national_id, date_of_birth, mother_name, father_name,
    company_name, tax_number, tax_office, company_registration_number,
    authorized_person_name, company_foundation_date,
    email, phone_number, address, email_key, search_name,
    is_active, created_at, updated_at, deleted_at
"#;

/// Match predicate for a unique field against `$1`
///
/// `$1` must already be folded with [`UniqueField::fold`]; email matches on
/// the indexed `email_key` column.
pub fn unique_predicate(field: UniqueField) -> &'static str {
    match field {
        UniqueField::NationalId => "national_id = $1",
        UniqueField::TaxNumber => "tax_number = $1",
        UniqueField::CompanyRegistrationNumber => "company_registration_number = $1",
        UniqueField::Email => "email_key = $1",
        UniqueField::PhoneNumber => "phone_number = $1",
    }
}

/// Filter shared by the listing and its count, over `$1`..`$7`
const LIST_FILTER: &str = r#"
    customer_type = $1
    AND ($2 OR deleted_at IS NULL)
    AND ($3::text IS NULL OR strpos(search_name, $3) > 0)
    AND ($4::date IS NULL OR COALESCE(date_of_birth, company_foundation_date) >= $4)
    AND ($5::date IS NULL OR COALESCE(date_of_birth, company_foundation_date) <= $5)
    AND ($6::int IS NULL
         OR EXTRACT(YEAR FROM COALESCE(date_of_birth, company_foundation_date))::int = $6)
    AND ($7::boolean IS NULL OR is_active = $7)
"#;

/// Column-level listing parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub customer_type: &'static str,
    pub include_deleted: bool,
    /// Folded search text
    pub search: Option<String>,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
    pub year: Option<i32>,
    pub active: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

impl ListParams {
    /// Byte-wise name order, matching the partial name indexes
    fn order_by(&self) -> &'static str {
        if self.customer_type == "corporate" {
            r#"company_name COLLATE "C", id"#
        } else {
            r#"first_name COLLATE "C", last_name COLLATE "C", id"#
        }
    }
}

/// Repository for the `customers` table
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns true if a row holds `value` in the given unique field
    ///
    /// # Arguments
    ///
    /// * `field` - The unique field to match
    /// * `value` - The value to look for
    /// * `exclude_id` - A customer whose own row is ignored
    /// * `include_deleted` - Whether soft-deleted rows count
    pub async fn exists(
        &self,
        field: UniqueField,
        value: &str,
        exclude_id: Option<Uuid>,
        include_deleted: bool,
    ) -> Result<bool, DatabaseError> {
        let sql = format!(
            "SELECT EXISTS (
                SELECT 1 FROM customers
                WHERE {}
                  AND ($2::uuid IS NULL OR id <> $2)
                  AND ($3 OR deleted_at IS NULL)
            )",
            unique_predicate(field)
        );

        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(value)
            .bind(exclude_id)
            .bind(include_deleted)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Inserts a new customer row
    ///
    /// # Errors
    ///
    /// `DatabaseError::DuplicateEntry` naming the violated index when an
    /// active row already holds one of the unique values
    pub async fn insert(&self, row: &CustomerRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO customers (
                id, customer_type,
                first_name, last_name, national_id, date_of_birth, mother_name, father_name,
                company_name, tax_number, tax_office, company_registration_number,
                authorized_person_name, company_foundation_date,
                email, phone_number, address, email_key, search_name,
                is_active, created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22, $23)
            "#,
        )
        .bind(row.id)
        .bind(&row.customer_type)
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(&row.national_id)
        .bind(row.date_of_birth)
        .bind(&row.mother_name)
        .bind(&row.father_name)
        .bind(&row.company_name)
        .bind(&row.tax_number)
        .bind(&row.tax_office)
        .bind(&row.company_registration_number)
        .bind(&row.authorized_person_name)
        .bind(row.company_foundation_date)
        .bind(&row.email)
        .bind(&row.phone_number)
        .bind(&row.address)
        .bind(&row.email_key)
        .bind(&row.search_name)
        .bind(row.is_active)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retrieves a customer row by identifier
    pub async fn get_by_id(
        &self,
        id: Uuid,
        include_deleted: bool,
    ) -> Result<CustomerRow, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE id = $1 AND ($2 OR deleted_at IS NULL)"
        );

        sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Customer", id))
    }

    /// Replaces the contact columns of an active customer
    pub async fn update_contact(
        &self,
        id: Uuid,
        email: &str,
        phone_number: &str,
        address: &str,
        now: DateTime<Utc>,
    ) -> Result<CustomerRow, DatabaseError> {
        let sql = format!(
            "UPDATE customers
             SET email = $2, phone_number = $3, address = $4, updated_at = $5, email_key = $6
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {SELECT_COLUMNS}"
        );

        sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .bind(email)
            .bind(phone_number)
            .bind(address)
            .bind(now)
            .bind(UniqueField::Email.fold(email))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Customer", id))
    }

    /// Marks an active customer as deleted
    ///
    /// The row stays in the table; it no longer takes part in uniqueness.
    pub async fn soft_delete(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET deleted_at = $2, is_active = FALSE, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Customer", id));
        }
        Ok(())
    }

    /// Returns one page of matching rows and the total number of matches
    pub async fn list(&self, params: &ListParams) -> Result<(Vec<CustomerRow>, i64), DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE {LIST_FILTER}
             ORDER BY {} LIMIT $8 OFFSET $9",
            params.order_by()
        );
        let rows = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(params.customer_type)
            .bind(params.include_deleted)
            .bind(params.search.as_deref())
            .bind(params.earliest)
            .bind(params.latest)
            .bind(params.year)
            .bind(params.active)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM customers WHERE {LIST_FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(params.customer_type)
            .bind(params.include_deleted)
            .bind(params.search.as_deref())
            .bind(params.earliest)
            .bind(params.latest)
            .bind(params.year)
            .bind(params.active)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Counts active customers
    pub async fn count_active(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM customers WHERE deleted_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_unique_field_has_a_predicate() {
        for field in UniqueField::ALL {
            assert!(unique_predicate(field).contains("$1"));
        }
    }

    #[test]
    fn test_email_predicate_uses_folded_key() {
        assert_eq!(unique_predicate(UniqueField::Email), "email_key = $1");
        assert_eq!(unique_predicate(UniqueField::NationalId), "national_id = $1");
    }

    #[test]
    fn test_list_filter_placeholders() {
        for n in 1..=7 {
            assert!(LIST_FILTER.contains(&format!("${n}")), "missing ${n}");
        }
        assert!(!LIST_FILTER.contains("$8"));
    }

    #[test]
    fn test_list_order_per_type() {
        let mut params = ListParams {
            customer_type: "individual",
            include_deleted: false,
            search: None,
            earliest: None,
            latest: None,
            year: None,
            active: None,
            limit: 10,
            offset: 0,
        };
        assert!(params.order_by().starts_with("first_name"));
        params.customer_type = "corporate";
        assert!(params.order_by().starts_with("company_name"));
    }
}
