//! Core Kernel - Foundational types for the customer onboarding system
//!
//! This crate provides the building blocks shared by every other crate:
//! - Strongly-typed identifiers
//! - The port error taxonomy and port marker traits (hexagonal architecture)
//! - The business clock used to evaluate "today" for age rules

pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use temporal::{Clock, SystemClock, FixedClock, Timezone, TemporalError};
pub use identifiers::CustomerId;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata,
};
pub use error::CoreError;
