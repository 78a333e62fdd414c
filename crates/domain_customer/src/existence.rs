//! Duplicate-existence checks
//!
//! Each check asks the storage port whether an active record already holds a
//! value. Checks race the caller's cancellation token: a cancelled check is
//! neither a pass nor a fail, it surfaces as [`CustomerError::Cancelled`].

use futures_util::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use core_kernel::CustomerId;

use crate::error::{CustomerError, ErrorKind};
use crate::ports::{CustomerPort, ExistenceQuery, UniqueField};
use crate::validation::FieldFailure;

/// Runs existence checks against the storage port
#[derive(Clone)]
pub struct ExistenceChecker {
    port: Arc<dyn CustomerPort>,
}

impl ExistenceChecker {
    pub fn new(port: Arc<dyn CustomerPort>) -> Self {
        Self { port }
    }

    /// Returns true if an active record other than `exclude_id` holds `value`
    #[instrument(skip_all, fields(field = %field, exclude_id = ?exclude_id))]
    pub async fn exists(
        &self,
        field: UniqueField,
        value: &str,
        exclude_id: Option<CustomerId>,
        cancel: &CancellationToken,
    ) -> Result<bool, CustomerError> {
        let query = ExistenceQuery::active(field, value).excluding(exclude_id);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("existence check cancelled");
                Err(CustomerError::Cancelled)
            }
            result = self.port.exists(query, None) => Ok(result?),
        }
    }

    /// Runs all checks concurrently and returns a conflict for every field
    /// that is taken, in the order the checks were given
    ///
    /// If any check was cancelled the whole batch is `Cancelled`; otherwise
    /// the first port error is returned.
    pub async fn conflicts(
        &self,
        checks: &[(UniqueField, &str)],
        exclude_id: Option<CustomerId>,
        cancel: &CancellationToken,
    ) -> Result<Vec<FieldFailure>, CustomerError> {
        let results = join_all(
            checks
                .iter()
                .map(|(field, value)| self.exists(*field, value, exclude_id, cancel)),
        )
        .await;

        if results.iter().any(|r| matches!(r, Err(CustomerError::Cancelled))) {
            return Err(CustomerError::Cancelled);
        }

        let mut failures = Vec::new();
        for ((field, _), result) in checks.iter().zip(results) {
            if result? {
                failures.push(FieldFailure::new(
                    field.field_name(),
                    ErrorKind::Conflict,
                    field.conflict_message(),
                ));
            }
        }
        Ok(failures)
    }
}
