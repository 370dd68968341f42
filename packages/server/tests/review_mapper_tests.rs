//! Review mapper accounting: per-item isolation and idempotent upserts.

use serde_json::json;

use server_core::common::CompanyId;
use server_core::domains::scrapers::actions::trustpilot::ingest_reviews;
use server_core::kernel::test_dependencies::MemoryReviewStore;

#[tokio::test]
async fn counts_always_sum_to_item_count() {
    let company_id = CompanyId::new();
    let store = MemoryReviewStore::new();
    let items = vec![
        json!({"id": "r1", "rating": 4, "title": "Good"}),
        json!({"id": "r2", "rating": 5}),
        json!({"rating": 3}),                // missing id
        json!({"id": "r3", "rating": "bad"}), // non-numeric rating
        json!({"id": "r1", "rating": 4}),    // duplicate of the first
    ];

    let stats = ingest_reviews(&items, company_id, &store).await;

    assert_eq!(stats.created, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.errors, 2);
    assert_eq!(stats.total(), items.len());
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn second_sync_skips_existing_reviews() {
    let company_id = CompanyId::new();
    let store = MemoryReviewStore::new();
    let items = vec![json!({"id": "r1", "rating": 4, "title": "Good"})];

    let first = ingest_reviews(&items, company_id, &store).await;
    assert_eq!(first.created, 1);
    assert_eq!(first.skipped, 0);

    let second = ingest_reviews(&items, company_id, &store).await;
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn same_review_id_under_different_companies_is_distinct() {
    let store = MemoryReviewStore::new();
    let items = vec![json!({"id": "r1", "rating": 4})];

    let a = ingest_reviews(&items, CompanyId::new(), &store).await;
    let b = ingest_reviews(&items, CompanyId::new(), &store).await;

    assert_eq!(a.created, 1);
    assert_eq!(b.created, 1);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn empty_batch_is_a_noop() {
    let store = MemoryReviewStore::new();
    let stats = ingest_reviews(&[], CompanyId::new(), &store).await;
    assert_eq!(stats.total(), 0);
    assert!(store.is_empty());
}
