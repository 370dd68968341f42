//! Scrape new leads into a collection.

use serde::Serialize;
use serde_json::Value;

use crate::common::{CollectionId, IngestStats, ScraperId, UserId};
use crate::domains::leads::models::{Collection, Lead, NewLead};
use crate::domains::scrapers::models::{RunSource, Scraper};
use crate::domains::scrapers::runner::{execute_actor_run, RunContext};
use crate::kernel::ServerDeps;

use super::ActionError;

/// Result of a collection scrape.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub run_id: String,
    pub stats: IngestStats,
}

/// Shallow-merge request parameters over the scraper's default input.
/// Non-object templates or overrides fall back to the override value.
pub fn merge_input(template: &Value, overrides: &Value) -> Value {
    match (template, overrides) {
        (Value::Object(base), Value::Object(extra)) => {
            let mut merged = base.clone();
            for (key, value) in extra {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        (template, Value::Null) => template.clone(),
        (_, overrides) => overrides.clone(),
    }
}

/// Parse one dataset item into a lead, defensively.
///
/// Scrapers disagree about field names; an item yields a lead as long as it
/// carries at least a name or an email address.
pub fn parse_lead_item(item: &Value) -> Option<NewLead> {
    let text = |keys: &[&str]| -> Option<String> {
        keys.iter().find_map(|key| {
            item.get(*key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    };

    let name = text(&["name", "fullName", "title"]);
    let email = text(&["email", "emailAddress"]).or_else(|| {
        item.get("emails")
            .and_then(Value::as_array)
            .and_then(|emails| emails.first())
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    if name.is_none() && email.is_none() {
        return None;
    }

    Some(NewLead {
        company_id: None,
        name,
        title: text(&["jobTitle", "position"]),
        email,
        website: text(&["website", "websiteUrl", "domain"]),
        phone: text(&["phone", "phoneNumber"]),
        source_url: text(&["url", "sourceUrl"]),
    })
}

/// Map dataset items into leads with per-item isolation. A lead whose email
/// is already present in the collection is skipped, not duplicated.
pub async fn ingest_leads(
    items: &[Value],
    user_id: UserId,
    collection_id: CollectionId,
    pool: &sqlx::PgPool,
) -> IngestStats {
    let mut stats = IngestStats::default();

    for item in items {
        let Some(new_lead) = parse_lead_item(item) else {
            stats.errors += 1;
            continue;
        };

        if let Some(email) = &new_lead.email {
            match Lead::email_exists_in_collection(collection_id, email, pool).await {
                Ok(true) => {
                    stats.skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Lead dedup check failed");
                    stats.errors += 1;
                    continue;
                }
            }
        }

        match Lead::create(user_id, collection_id, &new_lead, pool).await {
            Ok(_) => stats.created += 1,
            Err(e) => {
                tracing::warn!(error = %e, "Lead insert failed");
                stats.errors += 1;
            }
        }
    }

    stats
}

/// Run a configured scraper and ingest its results into a collection.
pub async fn scrape_collection(
    deps: &ServerDeps,
    user_id: UserId,
    collection_id: CollectionId,
    scraper_id: ScraperId,
    overrides: &Value,
) -> Result<ScrapeReport, ActionError> {
    let collection = Collection::find_by_id_for_user(collection_id, user_id, &deps.db_pool)
        .await?
        .ok_or(ActionError::NotFound("collection"))?;

    let scraper = Scraper::find_by_id(scraper_id, &deps.db_pool)
        .await?
        .ok_or(ActionError::NotFound("scraper"))?;

    let input = merge_input(&scraper.default_input, overrides);
    let ctx = RunContext::builder()
        .user_id(user_id)
        .source(RunSource::Scraping)
        .scraper_id(Some(scraper.id))
        .collection_id(Some(collection.id))
        .build();

    let finished = execute_actor_run(deps, &scraper.actor_id, &input, ctx).await?;
    let stats = ingest_leads(&finished.items, user_id, collection.id, &deps.db_pool).await;

    Ok(ScrapeReport {
        run_id: finished.run.id,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overrides_win() {
        let template = json!({"maxItems": 50, "language": "en"});
        let overrides = json!({"maxItems": 10, "query": "plumbers"});
        let merged = merge_input(&template, &overrides);
        assert_eq!(merged["maxItems"], 10);
        assert_eq!(merged["language"], "en");
        assert_eq!(merged["query"], "plumbers");
    }

    #[test]
    fn merge_null_overrides_keeps_template() {
        let template = json!({"maxItems": 50});
        assert_eq!(merge_input(&template, &Value::Null), template);
    }

    #[test]
    fn item_with_email_only_parses() {
        let lead = parse_lead_item(&json!({"email": "ada@acme.com"})).unwrap();
        assert_eq!(lead.email.as_deref(), Some("ada@acme.com"));
        assert!(lead.name.is_none());
    }

    #[test]
    fn item_with_nothing_useful_is_rejected() {
        assert!(parse_lead_item(&json!({"city": "Oslo"})).is_none());
        assert!(parse_lead_item(&json!({"name": "   "})).is_none());
    }

    #[test]
    fn first_entry_of_emails_array_is_used() {
        let lead =
            parse_lead_item(&json!({"name": "Acme", "emails": ["a@acme.com", "b@acme.com"]}))
                .unwrap();
        assert_eq!(lead.email.as_deref(), Some("a@acme.com"));
    }
}
