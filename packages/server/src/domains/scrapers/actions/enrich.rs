//! Enrich existing leads through the contact-enrichment actor.
//!
//! One core flow serves three scopes (a whole collection, one company's
//! leads, one lead); they differ only in which leads go in and which ledger
//! source the run is tagged with.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::common::{CollectionId, CompanyId, IngestStats, LeadId, UserId};
use crate::domains::leads::models::{Lead, LeadEnrichment};
use crate::domains::scrapers::models::{RunSource, Scraper};
use crate::domains::scrapers::runner::{execute_actor_run, RunContext};
use crate::kernel::ServerDeps;

use super::ActionError;

const ENRICHER_SLUG: &str = "contact-enricher";

/// Result of an enrichment run.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichReport {
    pub run_id: String,
    pub stats: IngestStats,
}

/// Normalize an email/website into the key leads and dataset items are
/// matched on: lowercase, no scheme, no `www.`, no trailing slash.
pub fn normalize_match_key(raw: &str) -> String {
    let key = raw.trim().to_ascii_lowercase();
    let key = key
        .strip_prefix("https://")
        .or_else(|| key.strip_prefix("http://"))
        .unwrap_or(&key);
    let key = key.strip_prefix("www.").unwrap_or(key);
    key.trim_end_matches('/').to_string()
}

/// Parse one enrichment item into the match key and the fields it offers.
/// Items without a usable key or without any field to merge are rejected.
pub fn parse_enrichment_item(item: &Value) -> Option<(String, LeadEnrichment)> {
    let text = |keys: &[&str]| -> Option<String> {
        keys.iter().find_map(|key| {
            item.get(*key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    };

    let key = text(&["email"])
        .or_else(|| text(&["website", "url", "domain"]))
        .map(|k| normalize_match_key(&k))?;

    let enrichment = LeadEnrichment {
        name: text(&["name", "fullName"]),
        title: text(&["jobTitle", "position"]),
        website: text(&["website", "url"]),
        phone: text(&["phone", "phoneNumber"]),
    };

    if enrichment.name.is_none()
        && enrichment.title.is_none()
        && enrichment.website.is_none()
        && enrichment.phone.is_none()
    {
        return None;
    }

    Some((key, enrichment))
}

/// Index leads by every key an item could match them on.
fn lead_index(leads: &[Lead]) -> HashMap<String, LeadId> {
    let mut index = HashMap::new();
    for lead in leads {
        if let Some(email) = &lead.email {
            index.insert(normalize_match_key(email), lead.id);
        }
        if let Some(website) = &lead.website {
            index.insert(normalize_match_key(website), lead.id);
        }
    }
    index
}

/// Run the enricher over the given leads and merge results back, item by
/// item: a malformed item counts as an error, an item matching no lead as
/// skipped.
async fn run_enrichment(
    deps: &ServerDeps,
    ctx: RunContext,
    leads: Vec<Lead>,
) -> Result<EnrichReport, ActionError> {
    let websites: Vec<Value> = leads
        .iter()
        .filter_map(|lead| lead.website.as_deref())
        .map(|url| json!({ "url": url }))
        .collect();
    if websites.is_empty() {
        return Err(ActionError::Invalid(
            "no leads with a website to enrich".to_string(),
        ));
    }

    let scraper = Scraper::find_by_slug(ENRICHER_SLUG, &deps.db_pool)
        .await?
        .ok_or_else(|| {
            ActionError::Invalid("contact-enricher integration is not configured".to_string())
        })?;

    let input = super::scrape_collection::merge_input(
        &scraper.default_input,
        &json!({ "startUrls": websites }),
    );

    let ctx = RunContext {
        scraper_id: Some(scraper.id),
        ..ctx
    };
    let finished = execute_actor_run(deps, &scraper.actor_id, &input, ctx).await?;

    let index = lead_index(&leads);
    let mut stats = IngestStats::default();

    for item in &finished.items {
        let Some((key, enrichment)) = parse_enrichment_item(item) else {
            stats.errors += 1;
            continue;
        };

        match index.get(&key) {
            Some(lead_id) => match Lead::apply_enrichment(*lead_id, &enrichment, &deps.db_pool)
                .await
            {
                Ok(_) => stats.created += 1,
                Err(e) => {
                    tracing::warn!(%lead_id, error = %e, "Enrichment update failed");
                    stats.errors += 1;
                }
            },
            None => stats.skipped += 1,
        }
    }

    Ok(EnrichReport {
        run_id: finished.run.id,
        stats,
    })
}

/// Enrich every lead in a collection.
pub async fn enrich_collection(
    deps: &ServerDeps,
    user_id: UserId,
    collection_id: CollectionId,
) -> Result<EnrichReport, ActionError> {
    let leads = Lead::find_by_collection(collection_id, user_id, &deps.db_pool).await?;
    if leads.is_empty() {
        return Err(ActionError::Invalid("collection has no leads".to_string()));
    }

    let ctx = RunContext::builder()
        .user_id(user_id)
        .source(RunSource::EnrichCollection)
        .collection_id(Some(collection_id))
        .build();
    run_enrichment(deps, ctx, leads).await
}

/// Enrich the leads attached to a company.
pub async fn enrich_company(
    deps: &ServerDeps,
    user_id: UserId,
    company_id: CompanyId,
) -> Result<EnrichReport, ActionError> {
    let leads = Lead::find_by_company(company_id, user_id, &deps.db_pool).await?;
    if leads.is_empty() {
        return Err(ActionError::Invalid("company has no leads".to_string()));
    }

    let ctx = RunContext::builder()
        .user_id(user_id)
        .source(RunSource::EnrichCompany)
        .company_id(Some(company_id))
        .build();
    run_enrichment(deps, ctx, leads).await
}

/// Enrich a single lead.
pub async fn enrich_lead(
    deps: &ServerDeps,
    user_id: UserId,
    lead_id: LeadId,
) -> Result<EnrichReport, ActionError> {
    let lead = Lead::find_by_id_for_user(lead_id, user_id, &deps.db_pool)
        .await?
        .ok_or(ActionError::NotFound("lead"))?;

    let ctx = RunContext::builder()
        .user_id(user_id)
        .source(RunSource::EnrichLead)
        .lead_id(Some(lead_id))
        .build();
    run_enrichment(deps, ctx, vec![lead]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn match_key_normalization() {
        assert_eq!(normalize_match_key("HTTPS://WWW.Acme.com/"), "acme.com");
        assert_eq!(normalize_match_key("http://acme.com"), "acme.com");
        assert_eq!(normalize_match_key("Ada@Acme.com "), "ada@acme.com");
    }

    #[test]
    fn item_keyed_by_email_first() {
        let (key, enrichment) =
            parse_enrichment_item(&json!({"email": "ada@acme.com", "phone": "+47 555"})).unwrap();
        assert_eq!(key, "ada@acme.com");
        assert_eq!(enrichment.phone.as_deref(), Some("+47 555"));
    }

    #[test]
    fn item_without_fields_is_rejected() {
        assert!(parse_enrichment_item(&json!({"email": "ada@acme.com"})).is_none());
        assert!(parse_enrichment_item(&json!({"phone": "+47 555"})).is_none());
    }
}
