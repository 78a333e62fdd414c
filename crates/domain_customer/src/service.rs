//! Customer workflows
//!
//! `CustomerService` is the application service behind the API. Creation runs
//! the orchestrator, builds the aggregate and persists it. A duplicate that
//! slips past the pre-flight checks is rejected by the store's unique
//! constraint; that rejection is reported as the same `ConflictError` the
//! orchestrator would have produced.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use core_kernel::{Clock, CustomerId, OperationMetadata, PortError};

use crate::customer::{ContactInfo, Customer};
use crate::error::{CustomerError, ErrorKind};
use crate::factory::CustomerFactory;
use crate::listing::{CustomerListQuery, ListCriteria, Page};
use crate::ports::{CustomerPort, RecordFilter, UniqueField};
use crate::rules::{BusinessRuleOrchestrator, CreateCustomerRequest};
use crate::validation::{FieldFailure, FieldFailures, ValidationOutcome};

#[derive(Clone)]
pub struct CustomerService {
    port: Arc<dyn CustomerPort>,
    orchestrator: BusinessRuleOrchestrator,
    clock: Arc<dyn Clock>,
}

impl CustomerService {
    pub fn new(port: Arc<dyn CustomerPort>, clock: Arc<dyn Clock>) -> Self {
        Self {
            orchestrator: BusinessRuleOrchestrator::new(port.clone(), clock.clone()),
            port,
            clock,
        }
    }

    pub fn orchestrator(&self) -> &BusinessRuleOrchestrator {
        &self.orchestrator
    }

    pub fn port(&self) -> &Arc<dyn CustomerPort> {
        &self.port
    }

    /// The business date that age rules and listings are evaluated on
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Validates and persists a new customer
    ///
    /// Nothing is written when validation fails.
    #[instrument(skip_all, fields(kind = request.kind.name()))]
    pub async fn create(
        &self,
        request: CreateCustomerRequest,
        metadata: Option<OperationMetadata>,
        cancel: &CancellationToken,
    ) -> Result<Customer, CustomerError> {
        if let ValidationOutcome::Invalid(failures) =
            self.orchestrator.validate_create(&request, cancel).await?
        {
            info!(fields = ?failures.fields(), "customer rejected");
            return Err(CustomerError::Rejected(failures));
        }

        if cancel.is_cancelled() {
            return Err(CustomerError::Cancelled);
        }

        let customer = CustomerFactory::create(request, self.clock.now());
        self.port
            .save(&customer, metadata)
            .await
            .map_err(reclassify_conflict)?;

        info!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    /// Returns an active customer
    #[instrument(skip(self, metadata))]
    pub async fn get(
        &self,
        id: CustomerId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Customer, CustomerError> {
        self.port
            .get(id, RecordFilter::ActiveOnly, metadata)
            .await
            .map_err(|e| from_port(id, e))
    }

    /// Soft-deletes an active customer
    #[instrument(skip(self, metadata))]
    pub async fn delete(
        &self,
        id: CustomerId,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), CustomerError> {
        self.port
            .soft_delete(id, metadata)
            .await
            .map_err(|e| from_port(id, e))?;
        info!(customer_id = %id, "customer deleted");
        Ok(())
    }

    /// Replaces the contact information of an active customer
    #[instrument(skip(self, contact, metadata, cancel))]
    pub async fn update_contact(
        &self,
        id: CustomerId,
        contact: ContactInfo,
        metadata: Option<OperationMetadata>,
        cancel: &CancellationToken,
    ) -> Result<Customer, CustomerError> {
        self.get(id, metadata.clone()).await?;

        if let ValidationOutcome::Invalid(failures) = self
            .orchestrator
            .validate_contact_update(id, &contact, cancel)
            .await?
        {
            return Err(CustomerError::Rejected(failures));
        }

        let customer = self
            .port
            .update_contact(id, contact, metadata)
            .await
            .map_err(|e| from_port(id, e))?;
        info!(customer_id = %id, "customer contact updated");
        Ok(customer)
    }

    /// Lists active customers of one type
    ///
    /// Age bounds are resolved against [`CustomerService::today`].
    #[instrument(skip(self, metadata), fields(kind = %query.kind))]
    pub async fn list(
        &self,
        query: CustomerListQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Page<Customer>, CustomerError> {
        let criteria = ListCriteria::resolve(&query, self.today());
        let page = self.port.list(criteria, metadata).await?;
        debug!(total = page.total_count, returned = page.items.len(), "customers listed");
        Ok(page)
    }
}

fn from_port(id: CustomerId, error: PortError) -> CustomerError {
    if error.is_not_found() {
        CustomerError::NotFound(id)
    } else {
        reclassify_conflict(error)
    }
}

/// Turns a unique-constraint rejection from the store into a field conflict
///
/// Conflicts that cannot be attributed to a known field pass through.
fn reclassify_conflict(error: PortError) -> CustomerError {
    let field = match &error {
        PortError::Conflict { field: Some(field), .. } => field.parse::<UniqueField>().ok(),
        _ => None,
    };

    match field {
        Some(field) => {
            warn!(field = %field, "duplicate rejected by storage constraint");
            CustomerError::Rejected(FieldFailures::single(FieldFailure::new(
                field.field_name(),
                ErrorKind::Conflict,
                field.conflict_message(),
            )))
        }
        None => CustomerError::Port(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::{CustomerKind, IndividualDetails};
    use crate::ports::mock::MockCustomerPort;
    use crate::listing::CustomerType;
    use crate::validation::FieldName;
    use core_kernel::FixedClock;

    fn request(national_id: &str, email: &str, phone: &str) -> CreateCustomerRequest {
        CreateCustomerRequest::new(
            CustomerKind::Individual(IndividualDetails {
                first_name: "Burak".to_string(),
                last_name: "Arslan".to_string(),
                national_id: national_id.to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1994, 7, 1).unwrap(),
                mother_name: None,
                father_name: Some("Hasan".to_string()),
            }),
            ContactInfo {
                email: email.to_string(),
                phone_number: phone.to_string(),
                address: "Muratpaşa, Antalya".to_string(),
            },
        )
    }

    fn service(port: Arc<MockCustomerPort>) -> CustomerService {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        CustomerService::new(port, Arc::new(clock))
    }

    #[test]
    fn test_reclassify_known_conflict() {
        let error = reclassify_conflict(PortError::conflict_on("phone_number", "dup"));
        let failures = error.failures().unwrap();
        assert_eq!(failures.fields(), vec![FieldName::PhoneNumber]);
        assert_eq!(failures.first().kind, ErrorKind::Conflict);
    }

    #[test]
    fn test_unattributed_conflict_passes_through() {
        let error = reclassify_conflict(PortError::Conflict {
            message: "duplicate key".to_string(),
            field: None,
        });
        assert!(matches!(error, CustomerError::Port(PortError::Conflict { .. })));

        let error = reclassify_conflict(PortError::internal("boom"));
        assert!(matches!(error, CustomerError::Port(PortError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_create_persists_valid_customer() {
        let port = Arc::new(MockCustomerPort::new());
        let service = service(port.clone());

        let customer = service
            .create(
                request("12345678950", "burak@example.com", "+905301112233"),
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(port.len().await, 1);
        assert_eq!(service.get(customer.id, None).await.unwrap(), customer);
    }

    #[tokio::test]
    async fn test_rejected_request_is_not_persisted() {
        let port = Arc::new(MockCustomerPort::new());
        let err = service(port.clone())
            .create(
                request("12345678951", "burak@example.com", "+905301112233"),
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::Checksum));
        assert!(port.is_empty().await);
    }

    #[tokio::test]
    async fn test_cancelled_request_is_not_persisted() {
        let port = Arc::new(MockCustomerPort::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = service(port.clone())
            .create(request("12345678950", "b@example.com", "1"), None, &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(port.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_and_delete_missing_customer() {
        let service = service(Arc::new(MockCustomerPort::new()));
        let id = CustomerId::new();

        assert!(matches!(service.get(id, None).await, Err(CustomerError::NotFound(missing)) if missing == id));
        assert!(matches!(service.delete(id, None).await, Err(CustomerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_deleted_customer_is_hidden_and_frees_identifiers() {
        let port = Arc::new(MockCustomerPort::new());
        let service = service(port.clone());
        let cancel = CancellationToken::new();

        let first = service
            .create(request("12345678950", "burak@example.com", "1"), None, &cancel)
            .await
            .unwrap();
        service.delete(first.id, None).await.unwrap();

        assert!(matches!(service.get(first.id, None).await, Err(CustomerError::NotFound(_))));
        service
            .create(request("12345678950", "burak@example.com", "1"), None, &cancel)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_contact_conflict_and_success() {
        let port = Arc::new(MockCustomerPort::new());
        let service = service(port);
        let cancel = CancellationToken::new();

        service
            .create(request("12345678950", "first@example.com", "+905300000001"), None, &cancel)
            .await
            .unwrap();
        let second = service
            .create(request("19090909018", "second@example.com", "+905300000002"), None, &cancel)
            .await
            .unwrap();

        let taken = ContactInfo {
            email: "first@example.com".to_string(),
            phone_number: "+905300000002".to_string(),
            address: "Muratpaşa, Antalya".to_string(),
        };
        let err = service
            .update_contact(second.id, taken, None, &cancel)
            .await
            .unwrap_err();
        assert_eq!(err.failures().unwrap().fields(), vec![FieldName::Email]);

        let fresh = ContactInfo {
            email: "second@new.example.com".to_string(),
            phone_number: "+905300000002".to_string(),
            address: "Konyaaltı, Antalya".to_string(),
        };
        let updated = service
            .update_contact(second.id, fresh, None, &cancel)
            .await
            .unwrap();
        assert_eq!(updated.contact.email, "second@new.example.com");

        let missing = service
            .update_contact(CustomerId::new(), updated.contact.clone(), None, &cancel)
            .await
            .unwrap_err();
        assert_eq!(missing.kind(), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_commit_once() {
        // both requests finish all three existence reads before either saves
        let barrier = Arc::new(tokio::sync::Barrier::new(6));
        let port = Arc::new(MockCustomerPort::new().with_existence_barrier(barrier));
        let service = service(port.clone());
        let cancel = CancellationToken::new();

        let (first, second) = tokio::join!(
            service.create(request("12345678950", "one@example.com", "+905300000011"), None, &cancel),
            service.create(request("12345678950", "two@example.com", "+905300000022"), None, &cancel),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let rejected = results.into_iter().find_map(Result::err).unwrap();
        let failures = rejected.failures().unwrap();
        assert_eq!(failures.fields(), vec![FieldName::NationalId]);
        assert_eq!(failures.first().kind, ErrorKind::Conflict);
        assert_eq!(port.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_applies_age_window_on_service_date() {
        let port = Arc::new(MockCustomerPort::new());
        let service = service(port);
        let cancel = CancellationToken::new();

        // 32 on 2026-10-16, and one day short of 32
        let mut older = request("12345678950", "older@example.com", "1");
        let mut younger = request("19090909018", "younger@example.com", "2");
        if let CustomerKind::Individual(details) = &mut older.kind {
            details.date_of_birth = NaiveDate::from_ymd_opt(1994, 10, 16).unwrap();
        }
        if let CustomerKind::Individual(details) = &mut younger.kind {
            details.date_of_birth = NaiveDate::from_ymd_opt(1994, 10, 17).unwrap();
        }
        let older = service.create(older, None, &cancel).await.unwrap();
        let younger = service.create(younger, None, &cancel).await.unwrap();

        let at_least_32 = CustomerListQuery::new(CustomerType::Individual).with_ages(Some(32), None);
        let page = service.list(at_least_32, None).await.unwrap();
        assert_eq!(page.items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![older.id]);

        let at_most_31 = CustomerListQuery::new(CustomerType::Individual).with_ages(None, Some(31));
        let page = service.list(at_most_31, None).await.unwrap();
        assert_eq!(page.items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![younger.id]);

        service.delete(younger.id, None).await.unwrap();
        let page = service
            .list(CustomerListQuery::new(CustomerType::Individual), None)
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
    }

    #[tokio::test]
    async fn test_port_failure_propagates_unchanged() {
        let port = Arc::new(MockCustomerPort::new());
        port.set_unavailable(true);

        let err = service(port)
            .create(request("12345678950", "b@example.com", "1"), None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerError::Port(PortError::ServiceUnavailable { .. })));
    }
}
