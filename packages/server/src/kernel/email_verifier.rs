//! EmailListVerify implementation of [`BaseEmailVerifier`].
//!
//! The service speaks plaintext: single checks return a bare verdict word,
//! bulk jobs return a numeric file id and report progress as a
//! pipe-delimited info line. Everything here parses defensively; an
//! unrecognized verdict degrades to `Unknown` rather than failing the batch.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use super::{BaseEmailVerifier, BulkJobState, BulkJobStatus, EmailVerdict};

const BASE_URL: &str = "https://apps.emaillistverify.com/api";

pub struct EmailListVerifyClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl EmailListVerifyClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (local stub servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_text(&self, url: String) -> Result<String> {
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(anyhow!(
                "email verifier API error (status {}): {}",
                status.as_u16(),
                body
            ));
        }
        Ok(body)
    }
}

/// Map the service's verdict word onto [`EmailVerdict`].
pub fn parse_verdict(raw: &str) -> EmailVerdict {
    match raw.trim() {
        "ok" => EmailVerdict::Ok,
        "ok_for_all" => EmailVerdict::Risky,
        "fail" | "incorrect" | "invalid_mx" | "email_disabled" | "dead_server" | "disposable"
        | "spamtrap" => EmailVerdict::Invalid,
        _ => EmailVerdict::Unknown,
    }
}

/// Parse the pipe-delimited bulk file info line.
///
/// Shape: `id|filename|unique|lines|lines_processed|status|timestamp|link`.
/// Only the id, status and link fields are consumed.
pub fn parse_file_info(raw: &str) -> Result<(BulkJobStatus, Option<String>)> {
    let fields: Vec<&str> = raw.trim().split('|').collect();
    if fields.len() < 6 {
        return Err(anyhow!("malformed bulk file info: {:?}", raw));
    }

    let state = match fields[5] {
        "finished" => BulkJobState::Finished,
        "suspended" | "canceled" => BulkJobState::Failed,
        "new" | "queued" => BulkJobState::Queued,
        _ => BulkJobState::InProgress,
    };

    let link = fields.get(7).filter(|l| !l.is_empty()).map(|l| l.to_string());

    Ok((
        BulkJobStatus {
            file_id: fields[0].to_string(),
            state,
        },
        link,
    ))
}

#[async_trait]
impl BaseEmailVerifier for EmailListVerifyClient {
    async fn verify_one(&self, email: &str) -> Result<EmailVerdict> {
        let url = format!(
            "{}/verifyEmail?secret={}&email={}",
            self.base_url, self.api_key, email
        );
        let body = self.get_text(url).await.context("email verification failed")?;
        Ok(parse_verdict(&body))
    }

    async fn start_bulk(&self, emails: &[String]) -> Result<String> {
        let url = format!(
            "{}/verifApiFile?secret={}&filename=leadgrid.csv",
            self.base_url, self.api_key
        );

        let file_part = reqwest::multipart::Part::text(emails.join("\n"))
            .file_name("leadgrid.csv")
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part("file_contents", file_part);

        let resp = self.client.post(&url).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(anyhow!(
                "bulk verification upload failed (status {}): {}",
                status.as_u16(),
                body
            ));
        }

        let file_id = body.trim().to_string();
        if file_id.is_empty() || !file_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(anyhow!("unexpected bulk upload response: {:?}", body));
        }

        tracing::debug!(%file_id, count = emails.len(), "Started bulk email verification");
        Ok(file_id)
    }

    async fn bulk_status(&self, file_id: &str) -> Result<BulkJobStatus> {
        let url = format!(
            "{}/getApiFileInfo?secret={}&id={}",
            self.base_url, self.api_key, file_id
        );
        let body = self.get_text(url).await.context("bulk status lookup failed")?;
        let (status, _link) = parse_file_info(&body)?;
        Ok(status)
    }

    async fn bulk_results(&self, file_id: &str) -> Result<Vec<(String, EmailVerdict)>> {
        let url = format!(
            "{}/getApiFileInfo?secret={}&id={}",
            self.base_url, self.api_key, file_id
        );
        let body = self.get_text(url).await.context("bulk status lookup failed")?;
        let (status, link) = parse_file_info(&body)?;

        if status.state != BulkJobState::Finished {
            return Err(anyhow!(
                "bulk job {} not finished (state {:?})",
                file_id,
                status.state
            ));
        }
        let link = link.ok_or_else(|| anyhow!("finished bulk job {} has no result link", file_id))?;

        let csv = self.get_text(link).await.context("bulk result download failed")?;
        let results = csv
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let (email, verdict) = line.split_once(',').unwrap_or((line, ""));
                (email.trim().to_string(), parse_verdict(verdict))
            })
            .collect();
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_mapping() {
        assert_eq!(parse_verdict("ok"), EmailVerdict::Ok);
        assert_eq!(parse_verdict("ok_for_all"), EmailVerdict::Risky);
        assert_eq!(parse_verdict("fail"), EmailVerdict::Invalid);
        assert_eq!(parse_verdict("dead_server"), EmailVerdict::Invalid);
        assert_eq!(parse_verdict("antispam_system"), EmailVerdict::Unknown);
        assert_eq!(parse_verdict("  ok  "), EmailVerdict::Ok);
    }

    #[test]
    fn file_info_parsing() {
        let raw = "123456|leadgrid.csv|90|100|100|finished|1754300000|https://dl.example/f.csv";
        let (status, link) = parse_file_info(raw).unwrap();
        assert_eq!(status.file_id, "123456");
        assert_eq!(status.state, BulkJobState::Finished);
        assert_eq!(link.as_deref(), Some("https://dl.example/f.csv"));
    }

    #[test]
    fn file_info_in_progress_has_no_link() {
        let raw = "123456|leadgrid.csv|90|100|40|progress|1754300000|";
        let (status, link) = parse_file_info(raw).unwrap();
        assert_eq!(status.state, BulkJobState::InProgress);
        assert!(link.is_none());
    }

    #[test]
    fn file_info_rejects_garbage() {
        assert!(parse_file_info("not-a-file-info").is_err());
    }
}
