//! Find an email address for a single lead through the email-finder actor.

use serde::Serialize;
use serde_json::{json, Value};

use crate::common::{LeadId, UserId};
use crate::domains::leads::models::Lead;
use crate::domains::scrapers::models::{RunSource, Scraper};
use crate::domains::scrapers::runner::{execute_actor_run, RunContext};
use crate::kernel::ServerDeps;

use super::ActionError;

const FINDER_SLUG: &str = "email-finder";

/// Result of an email-finding run.
#[derive(Debug, Clone, Serialize)]
pub struct FindEmailReport {
    pub run_id: String,
    /// The discovered address, when the run produced one.
    pub email: Option<String>,
    pub lead: Lead,
}

/// Pull the first plausible email address out of the dataset items.
pub fn extract_email(items: &[Value]) -> Option<String> {
    items.iter().find_map(|item| {
        let direct = item
            .get("email")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| s.contains('@'))
            .map(str::to_string);

        direct.or_else(|| {
            item.get("emails")
                .and_then(Value::as_array)
                .and_then(|emails| {
                    emails
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::trim)
                        .find(|s| s.contains('@'))
                        .map(str::to_string)
                })
        })
    })
}

/// Run the email finder against the lead's website and attach the first
/// address it returns, verified synchronously.
pub async fn find_lead_email(
    deps: &ServerDeps,
    user_id: UserId,
    lead_id: LeadId,
) -> Result<FindEmailReport, ActionError> {
    let lead = Lead::find_by_id_for_user(lead_id, user_id, &deps.db_pool)
        .await?
        .ok_or(ActionError::NotFound("lead"))?;

    if lead.email.is_some() {
        return Err(ActionError::Invalid(
            "lead already has an email address".to_string(),
        ));
    }
    let website = lead.website.clone().ok_or_else(|| {
        ActionError::Invalid("lead has no website to search for an email".to_string())
    })?;

    let scraper = Scraper::find_by_slug(FINDER_SLUG, &deps.db_pool)
        .await?
        .ok_or_else(|| {
            ActionError::Invalid("email-finder integration is not configured".to_string())
        })?;

    let input = super::scrape_collection::merge_input(
        &scraper.default_input,
        &json!({ "startUrls": [{ "url": website }] }),
    );
    let ctx = RunContext::builder()
        .user_id(user_id)
        .source(RunSource::FindEmail)
        .scraper_id(Some(scraper.id))
        .lead_id(Some(lead.id))
        .build();

    let finished = execute_actor_run(deps, &scraper.actor_id, &input, ctx).await?;

    match extract_email(&finished.items) {
        Some(email) => {
            // Verify right away so the lead lands with a verdict attached.
            let verdict = match deps.email_verifier.verify_one(&email).await {
                Ok(verdict) => Some(verdict.as_str()),
                Err(e) => {
                    tracing::warn!(error = %e, "Inline verification of found email failed");
                    None
                }
            };
            let lead = Lead::set_email(lead.id, &email, verdict, &deps.db_pool).await?;
            Ok(FindEmailReport {
                run_id: finished.run.id,
                email: Some(email),
                lead,
            })
        }
        None => Ok(FindEmailReport {
            run_id: finished.run.id,
            email: None,
            lead,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_address_wins() {
        let items = vec![
            json!({"url": "https://acme.com"}),
            json!({"email": "sales@acme.com"}),
            json!({"email": "other@acme.com"}),
        ];
        assert_eq!(extract_email(&items).as_deref(), Some("sales@acme.com"));
    }

    #[test]
    fn emails_array_is_searched() {
        let items = vec![json!({"emails": ["not-an-email", "info@acme.com"]})];
        assert_eq!(extract_email(&items).as_deref(), Some("info@acme.com"));
    }

    #[test]
    fn no_address_yields_none() {
        let items = vec![json!({"email": "not-an-email"}), json!({})];
        assert_eq!(extract_email(&items), None);
    }
}
