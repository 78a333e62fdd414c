//! PostgreSQL adapter tests
//!
//! These start a container and are ignored by default:
//! `cargo test -p test_utils -- --ignored`

use std::sync::Arc;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use core_kernel::{HealthCheckable, PortError};
use domain_customer::{
    CustomerListQuery, CustomerPort, CustomerPortExt, CustomerService, CustomerType,
    ExistenceQuery, FieldName, ListCriteria, RecordFilter, UniqueField,
};
use infra_db::PostgresCustomerAdapter;
use test_utils::*;

async fn setup() -> (TestDatabase, Arc<PostgresCustomerAdapter>) {
    let db = create_isolated_test_database()
        .await
        .expect("Failed to create test database");
    let adapter = Arc::new(db.adapter());
    (db, adapter)
}

mod storage_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_save_and_get_round_trip() {
        let (_db, adapter) = setup().await;
        let customer = CustomerBuilder::corporate(CorporateRequestBuilder::new()).build();

        adapter.save(&customer, None).await.unwrap();
        let loaded = adapter
            .get(customer.id, RecordFilter::ActiveOnly, None)
            .await
            .unwrap();

        assert_eq!(loaded.id, customer.id);
        assert_eq!(loaded.kind, customer.kind);
        assert_eq!(loaded.contact, customer.contact);
        assert!(loaded.is_active);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_soft_deleted_rows_are_hidden_but_kept() {
        let (db, adapter) = setup().await;
        let customer = CustomerBuilder::individual(IndividualRequestBuilder::new()).build();
        adapter.save(&customer, None).await.unwrap();

        adapter.soft_delete(customer.id, None).await.unwrap();

        let active = adapter.get(customer.id, RecordFilter::ActiveOnly, None).await;
        assert!(matches!(active, Err(PortError::NotFound { .. })));

        let any = adapter
            .get(customer.id, RecordFilter::IncludeDeleted, None)
            .await
            .unwrap();
        assert!(any.is_deleted());
        assert!(!any.is_active);

        assert_eq!(adapter.repository().count_active().await.unwrap(), 0);
        db.clear_data().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_deleting_twice_is_not_found() {
        let (_db, adapter) = setup().await;
        let customer = CustomerBuilder::individual(IndividualRequestBuilder::new()).build();
        adapter.save(&customer, None).await.unwrap();

        adapter.soft_delete(customer.id, None).await.unwrap();
        let again = adapter.soft_delete(customer.id, None).await;

        assert!(matches!(again, Err(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_health_check_reports_healthy() {
        let (_db, adapter) = setup().await;
        let health = adapter.health_check().await;
        assert!(health.is_healthy());
    }
}

mod existence_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_email_lookup_ignores_case() {
        let (_db, adapter) = setup().await;
        let customer = CustomerBuilder::individual(IndividualRequestBuilder::new()).build();
        adapter.save(&customer, None).await.unwrap();

        let upper = ContactFixtures::primary().email.to_uppercase();
        assert!(adapter.exists_by_email(&upper, None).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_email_key_folds_ascii_only() {
        let (_db, adapter) = setup().await;
        let customer = CustomerBuilder::individual(
            IndividualRequestBuilder::new().with_email("Çağrı.Öz@Örnek.com.tr"),
        )
        .build();
        adapter.save(&customer, None).await.unwrap();

        assert!(adapter.exists_by_email("Çağrı.Öz@Örnek.COM.TR", None).await.unwrap());
        assert!(!adapter.exists_by_email("çağrı.öz@örnek.com.tr", None).await.unwrap());

        // distinct under ASCII folding, so the unique index accepts it
        let other = CustomerBuilder::individual(
            IndividualRequestBuilder::new()
                .with_national_id(IdentifierFixtures::other_national_id())
                .with_email("çağrı.öz@örnek.com.tr")
                .with_phone("+905550000001"),
        )
        .build();
        adapter.save(&other, None).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_exclude_id_skips_own_record() {
        let (_db, adapter) = setup().await;
        let customer = CustomerBuilder::individual(IndividualRequestBuilder::new()).build();
        adapter.save(&customer, None).await.unwrap();

        let phone = ContactFixtures::primary().phone_number;
        assert!(adapter.exists_by_phone(&phone, None).await.unwrap());
        assert!(!adapter.exists_by_phone(&phone, Some(customer.id)).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_deleted_rows_only_match_when_included() {
        let (_db, adapter) = setup().await;
        let customer = CustomerBuilder::individual(IndividualRequestBuilder::new()).build();
        adapter.save(&customer, None).await.unwrap();
        adapter.soft_delete(customer.id, None).await.unwrap();

        let national_id = IdentifierFixtures::national_id();
        assert!(!adapter.exists_by_national_id(national_id, None).await.unwrap());

        let query = ExistenceQuery::active(UniqueField::NationalId, national_id)
            .with_filter(RecordFilter::IncludeDeleted);
        assert!(adapter.exists(query, None).await.unwrap());
    }
}

mod constraint_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_duplicate_insert_names_the_field() {
        let (_db, adapter) = setup().await;
        let first = CustomerBuilder::individual(IndividualRequestBuilder::new()).build();
        adapter.save(&first, None).await.unwrap();

        let second = CustomerBuilder::individual(
            IndividualRequestBuilder::new().with_contact(random_contact()),
        )
        .build();
        let err = adapter.save(&second, None).await.unwrap_err();

        match err {
            PortError::Conflict { field, .. } => {
                assert_eq!(field.as_deref(), Some(UniqueField::NationalId.as_str()));
            }
            other => panic!("Expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_soft_deleted_identifier_can_be_reused() {
        let (_db, adapter) = setup().await;
        let first = CustomerBuilder::individual(IndividualRequestBuilder::new()).build();
        adapter.save(&first, None).await.unwrap();
        adapter.soft_delete(first.id, None).await.unwrap();

        let second = CustomerBuilder::individual(IndividualRequestBuilder::new()).build();
        adapter.save(&second, None).await.unwrap();

        assert_eq!(adapter.repository().count_active().await.unwrap(), 1);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_concurrent_duplicate_creates_commit_once() {
        let (_db, adapter) = setup().await;
        let service = CustomerService::new(adapter.clone(), TemporalFixtures::clock());
        let cancel = CancellationToken::new();

        let (first, second) = tokio::join!(
            service.create(IndividualRequestBuilder::new().build(), None, &cancel),
            service.create(
                IndividualRequestBuilder::new()
                    .with_contact(random_contact())
                    .build(),
                None,
                &cancel
            ),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let rejected = results.into_iter().find_map(Result::err).unwrap();
        assert_conflicts_on(&rejected, &[FieldName::NationalId]);
        assert_eq!(adapter.repository().count_active().await.unwrap(), 1);
    }
}

mod listing_tests {
    use super::*;

    fn criteria(query: CustomerListQuery) -> ListCriteria {
        ListCriteria::resolve(&query, TemporalFixtures::today())
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_age_window_edges_and_soft_delete() {
        let (_db, adapter) = setup().await;
        let national_ids = [
            IdentifierFixtures::national_id(),
            IdentifierFixtures::other_national_id(),
            "10000000146",
        ];
        // exactly 18, 31 today, 30 until tomorrow
        let born = [
            TemporalFixtures::eighteenth_birthday_today(),
            NaiveDate::from_ymd_opt(1995, 10, 16).unwrap(),
            NaiveDate::from_ymd_opt(1995, 10, 17).unwrap(),
        ];
        let mut customers = Vec::new();
        for (national_id, date) in national_ids.into_iter().zip(born) {
            let customer = CustomerBuilder::individual(
                IndividualRequestBuilder::new()
                    .with_national_id(national_id)
                    .with_date_of_birth(date)
                    .with_contact(random_contact()),
            )
            .build();
            adapter.save(&customer, None).await.unwrap();
            customers.push(customer);
        }

        let page = adapter
            .list(
                criteria(CustomerListQuery::new(CustomerType::Individual).with_ages(Some(18), Some(30))),
                None,
            )
            .await
            .unwrap();
        let mut ids: Vec<_> = page.items.iter().map(|c| c.id).collect();
        ids.sort();
        let mut expected = vec![customers[0].id, customers[2].id];
        expected.sort();
        assert_eq!(ids, expected);
        assert_eq!(page.total_count, 2);

        adapter.soft_delete(customers[2].id, None).await.unwrap();
        let page = adapter
            .list(
                criteria(CustomerListQuery::new(CustomerType::Individual).with_ages(Some(18), Some(30))),
                None,
            )
            .await
            .unwrap();
        assert_eq!(page.items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![customers[0].id]);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_search_order_and_paging_match_in_memory_store() {
        let (_db, adapter) = setup().await;
        let mock = domain_customer::MockCustomerPort::new();
        let people = [
            (IdentifierFixtures::national_id(), "Şule", "Güneş"),
            (IdentifierFixtures::other_national_id(), "Umut", "Şulenoğlu"),
            ("10000000146", "Ali", "Şulecan"),
        ];
        for (national_id, first, last) in people {
            let customer = CustomerBuilder::individual(
                IndividualRequestBuilder::new()
                    .with_national_id(national_id)
                    .with_name(first, last)
                    .with_contact(random_contact()),
            )
            .build();
            adapter.save(&customer, None).await.unwrap();
            mock.save(&customer, None).await.unwrap();
        }

        for page in 0..2 {
            let query = CustomerListQuery::new(CustomerType::Individual)
                .with_search("ŞULE")
                .with_page(page, 2);
            let stored = adapter.list(criteria(query.clone()), None).await.unwrap();
            let in_memory = mock.list(criteria(query), None).await.unwrap();

            let ids = |items: &[domain_customer::Customer]| -> Vec<_> {
                items.iter().map(|c| c.id).collect()
            };
            assert_eq!(stored.total_count, 3);
            assert_eq!(ids(&stored.items), ids(&in_memory.items));
        }
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_corporate_foundation_year() {
        let (_db, adapter) = setup().await;
        let company = CustomerBuilder::corporate(
            CorporateRequestBuilder::new()
                .with_foundation_date(NaiveDate::from_ymd_opt(2015, 3, 1).unwrap()),
        )
        .build();
        adapter.save(&company, None).await.unwrap();

        let mut query = CustomerListQuery::new(CustomerType::Corporate);
        query.foundation_year = Some(2015);
        let page = adapter.list(criteria(query.clone()), None).await.unwrap();
        assert_eq!(page.total_count, 1);

        query.foundation_year = Some(2016);
        let page = adapter.list(criteria(query), None).await.unwrap();
        assert!(page.items.is_empty());

        let individuals = adapter
            .list(criteria(CustomerListQuery::new(CustomerType::Individual)), None)
            .await
            .unwrap();
        assert_eq!(individuals.total_count, 0);
    }
}

mod workflow_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_contact_update_persists() {
        let (_db, adapter) = setup().await;
        let service = CustomerService::new(adapter.clone(), TemporalFixtures::clock());
        let cancel = CancellationToken::new();

        let customer = service
            .create(CorporateRequestBuilder::new().build(), None, &cancel)
            .await
            .unwrap();

        let contact = random_contact();
        service
            .update_contact(customer.id, contact.clone(), None, &cancel)
            .await
            .unwrap();

        let loaded = service.get(customer.id, None).await.unwrap();
        assert_eq!(loaded.contact, contact);
        assert!(loaded.updated_at.is_some());
    }
}
