//! Local search ranking snapshot for a company and keyword.

use serde::Serialize;
use serde_json::{json, Value};

use crate::common::{CompanyId, UserId};
use crate::domains::leads::models::{Company, SeoSnapshot};
use crate::domains::scrapers::models::{RunSource, Scraper};
use crate::domains::scrapers::runner::{execute_actor_run, RunContext};
use crate::kernel::ServerDeps;

use super::ActionError;

const RANKING_SLUG: &str = "local-ranking";

/// Result of a ranking run.
#[derive(Debug, Clone, Serialize)]
pub struct SeoReport {
    pub run_id: String,
    pub snapshot: SeoSnapshot,
}

/// Find the company's position among the ranking items: the first item
/// whose website mentions the domain, in item order.
pub fn extract_position(items: &[Value], domain: &str) -> Option<i32> {
    let needle = domain.to_ascii_lowercase();

    items.iter().find_map(|item| {
        let website = item
            .get("website")
            .or_else(|| item.get("url"))
            .and_then(Value::as_str)?
            .to_ascii_lowercase();
        if !website.contains(&needle) {
            return None;
        }
        item.get("position")
            .or_else(|| item.get("rank"))
            .and_then(Value::as_i64)
            .map(|p| p as i32)
    })
}

/// Run the local-ranking actor and persist a snapshot of the result.
pub async fn seo_local_ranking(
    deps: &ServerDeps,
    user_id: UserId,
    company_id: CompanyId,
    keyword: &str,
) -> Result<SeoReport, ActionError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(ActionError::Invalid("keyword must not be empty".to_string()));
    }

    let company = Company::find_by_id_for_user(company_id, user_id, &deps.db_pool)
        .await?
        .ok_or(ActionError::NotFound("company"))?;
    let domain = company.domain.clone().ok_or_else(|| {
        ActionError::Invalid("company has no website domain configured".to_string())
    })?;

    let scraper = Scraper::find_by_slug(RANKING_SLUG, &deps.db_pool)
        .await?
        .ok_or_else(|| {
            ActionError::Invalid("local-ranking integration is not configured".to_string())
        })?;

    let input = super::scrape_collection::merge_input(
        &scraper.default_input,
        &json!({ "queries": [keyword], "domain": domain }),
    );
    let ctx = RunContext::builder()
        .user_id(user_id)
        .source(RunSource::SeoLocalRanking)
        .scraper_id(Some(scraper.id))
        .company_id(Some(company.id))
        .build();

    let finished = execute_actor_run(deps, &scraper.actor_id, &input, ctx).await?;

    let position = extract_position(&finished.items, &domain);
    let payload = Value::Array(finished.items);
    let snapshot = SeoSnapshot::create(
        company.id,
        keyword,
        position,
        &payload,
        &finished.run.id,
        &deps.db_pool,
    )
    .await?;

    Ok(SeoReport {
        run_id: finished.run.id,
        snapshot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn position_of_matching_domain() {
        let items = vec![
            json!({"website": "https://other.com", "position": 1}),
            json!({"website": "https://www.acme.com/about", "position": 2}),
        ];
        assert_eq!(extract_position(&items, "acme.com"), Some(2));
    }

    #[test]
    fn missing_domain_yields_none() {
        let items = vec![json!({"website": "https://other.com", "position": 1})];
        assert_eq!(extract_position(&items, "acme.com"), None);
    }

    #[test]
    fn rank_field_is_accepted() {
        let items = vec![json!({"url": "https://acme.com", "rank": 7})];
        assert_eq!(extract_position(&items, "acme.com"), Some(7));
    }
}
