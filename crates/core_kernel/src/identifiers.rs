//! Strongly-typed identifiers for domain entities
//!
//! Newtype wrappers around UUIDs keep customer identifiers from being mixed
//! up with any other UUID flowing through the system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const CUSTOMER_PREFIX: &str = "CUS";

/// Identifier of a customer record (individual or corporate)
///
/// New identifiers are time-ordered (UUID v7) so that inserts stay close
/// together in the primary key index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// Creates a new time-ordered identifier
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the identifier prefix used in the display form
    pub fn prefix() -> &'static str {
        CUSTOMER_PREFIX
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", CUSTOMER_PREFIX, self.0)
    }
}

impl FromStr for CustomerId {
    type Err = uuid::Error;

    /// Accepts both the prefixed display form and a bare UUID
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .strip_prefix(CUSTOMER_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(s);
        Ok(Self(Uuid::parse_str(raw)?))
    }
}

impl From<Uuid> for CustomerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<CustomerId> for Uuid {
    fn from(id: CustomerId) -> Uuid {
        id.0
    }
}
