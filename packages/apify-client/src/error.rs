use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApifyError>;

/// Errors returned by the Apify REST client.
#[derive(Debug, Error)]
pub enum ApifyError {
    /// Transport-level failure (connection, TLS, body decode).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API responded with a non-success status code.
    #[error("Apify API error (status {status}): {message}")]
    Api { status: u16, message: String },
}
