//! Repository implementations for domain entities
//!
//! Repositories encapsulate SQL queries and map between database rows and
//! plain column values. Queries are checked at runtime with `query_as`
//! and `FromRow`.

pub mod customer;

pub use customer::{CustomerRepository, CustomerRow};
