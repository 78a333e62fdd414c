//! Builds new customer aggregates from validated requests

use chrono::{DateTime, Utc};

use core_kernel::CustomerId;

use crate::customer::Customer;
use crate::rules::CreateCustomerRequest;

#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerFactory;

impl CustomerFactory {
    /// Creates an active customer with a fresh identifier
    pub fn create(request: CreateCustomerRequest, now: DateTime<Utc>) -> Customer {
        Customer {
            id: CustomerId::new(),
            kind: request.kind,
            contact: request.contact,
            is_active: true,
            created_at: now,
            updated_at: None,
            deleted_at: None,
        }
    }
}
