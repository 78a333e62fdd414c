//! Domain Adapters
//!
//! This module provides adapter implementations for domain ports,
//! connecting domain interfaces to the PostgreSQL database layer.
//!
//! Each adapter:
//! - Implements the domain's port trait
//! - Translates between domain models and database row types
//! - Uses the repository layer for database operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresCustomerAdapter;
//! use domain_customer::CustomerPort;
//!
//! let adapter = PostgresCustomerAdapter::new(pool);
//! let customer = adapter.get(id, RecordFilter::ActiveOnly, None).await?;
//! ```

pub mod customer;

pub use customer::PostgresCustomerAdapter;
