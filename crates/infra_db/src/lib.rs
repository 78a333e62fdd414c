//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL storage for customer records using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern:
//!
//! - `repositories` hold the SQL and map to and from row types
//! - `adapters` implement the domain ports on top of the repositories
//!
//! # Uniqueness
//!
//! National id, tax number, company registration number, email and phone
//! number are unique among active records only. The schema enforces this with
//! partial unique indexes over `deleted_at IS NULL`, so two concurrent inserts
//! of the same value cannot both commit. The adapter reports the losing insert
//! as a `PortError::Conflict` naming the field.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresCustomerAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/customers")).await?;
//! run_migrations(&pool).await?;
//! let adapter = PostgresCustomerAdapter::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::PostgresCustomerAdapter;
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{CustomerRepository, CustomerRow};
