//! Sync a company's Trustpilot reviews.
//!
//! The review mapper here is the canonical per-item-isolation instance:
//! parse each opaque item defensively (a provider id and a numeric rating
//! are required), upsert by natural key, and count every item as exactly
//! one of created/skipped/errors.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::common::{CompanyId, IngestStats, UserId};
use crate::domains::leads::models::{Company, NewCompanyReview};
use crate::domains::scrapers::models::{RunSource, Scraper};
use crate::domains::scrapers::runner::{execute_actor_run, RunContext};
use crate::kernel::{ReviewStore, ServerDeps};

use super::ActionError;

const TRUSTPILOT_SLUG: &str = "trustpilot";

/// Result of a review sync.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSyncReport {
    pub run_id: String,
    pub stats: IngestStats,
}

/// Parse one review item. Rejects items missing the provider id or a
/// numeric rating; everything else is optional.
pub fn parse_review_item(company_id: CompanyId, item: &Value) -> Option<NewCompanyReview> {
    let review_id = match item.get("id")? {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let rating = item.get("rating").and_then(|r| {
        r.as_i64()
            .or_else(|| r.as_f64().map(|f| f.round() as i64))
    })? as i32;

    let text = |keys: &[&str]| -> Option<String> {
        keys.iter().find_map(|key| {
            item.get(*key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    };

    let reviewer = text(&["reviewerName"]).or_else(|| {
        item.get("consumer")
            .and_then(|c| c.get("displayName"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    let published_at = text(&["publishedAt"])
        .or_else(|| {
            item.get("dates")
                .and_then(|d| d.get("publishedDate"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Some(NewCompanyReview {
        company_id,
        review_id,
        rating,
        title: text(&["title"]),
        body: text(&["text", "body"]),
        reviewer,
        published_at,
    })
}

/// Upsert review items for a company with per-item isolation.
pub async fn ingest_reviews(
    items: &[Value],
    company_id: CompanyId,
    store: &dyn ReviewStore,
) -> IngestStats {
    let mut stats = IngestStats::default();

    for item in items {
        let Some(review) = parse_review_item(company_id, item) else {
            stats.errors += 1;
            continue;
        };

        match store.insert_review(&review).await {
            Ok(true) => stats.created += 1,
            Ok(false) => stats.skipped += 1,
            Err(e) => {
                tracing::warn!(error = %e, review_id = %review.review_id, "Review insert failed");
                stats.errors += 1;
            }
        }
    }

    stats
}

/// Run the Trustpilot actor for a company and store its reviews.
pub async fn sync_company_reviews(
    deps: &ServerDeps,
    user_id: UserId,
    company_id: CompanyId,
) -> Result<ReviewSyncReport, ActionError> {
    let company = Company::find_by_id_for_user(company_id, user_id, &deps.db_pool)
        .await?
        .ok_or(ActionError::NotFound("company"))?;

    let domain = company.domain.clone().ok_or_else(|| {
        ActionError::Invalid("company has no website domain configured".to_string())
    })?;

    let scraper = Scraper::find_by_slug(TRUSTPILOT_SLUG, &deps.db_pool)
        .await?
        .ok_or_else(|| {
            ActionError::Invalid("trustpilot integration is not configured".to_string())
        })?;

    let input = super::scrape_collection::merge_input(
        &scraper.default_input,
        &json!({ "companyDomain": domain }),
    );
    let ctx = RunContext::builder()
        .user_id(user_id)
        .source(RunSource::Trustpilot)
        .scraper_id(Some(scraper.id))
        .company_id(Some(company.id))
        .build();

    let finished = execute_actor_run(deps, &scraper.actor_id, &input, ctx).await?;
    let stats = ingest_reviews(&finished.items, company.id, &deps.db_pool).await;

    Ok(ReviewSyncReport {
        run_id: finished.run.id,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_item_parses() {
        let company_id = CompanyId::new();
        let item = json!({
            "id": "r1",
            "rating": 4,
            "title": "Good",
            "text": "Solid service.",
            "consumer": {"displayName": "Ada"},
            "dates": {"publishedDate": "2026-06-01T10:00:00Z"}
        });

        let review = parse_review_item(company_id, &item).unwrap();
        assert_eq!(review.review_id, "r1");
        assert_eq!(review.rating, 4);
        assert_eq!(review.title.as_deref(), Some("Good"));
        assert_eq!(review.reviewer.as_deref(), Some("Ada"));
        assert!(review.published_at.is_some());
    }

    #[test]
    fn missing_id_is_rejected() {
        let item = json!({"rating": 4, "title": "Good"});
        assert!(parse_review_item(CompanyId::new(), &item).is_none());
    }

    #[test]
    fn non_numeric_rating_is_rejected() {
        let item = json!({"id": "r1", "rating": "four"});
        assert!(parse_review_item(CompanyId::new(), &item).is_none());
    }

    #[test]
    fn numeric_id_is_accepted() {
        let item = json!({"id": 123, "rating": 5});
        let review = parse_review_item(CompanyId::new(), &item).unwrap();
        assert_eq!(review.review_id, "123");
    }
}
