//! Retrieval of the upstream listings document.
//!
//! The upstream publishes one JSON array of posting objects. We fetch it in a
//! single request and hand the objects on untouched; shaping them into
//! [`Posting`](internwatch_shared::Posting)s is the normalizer's job.

use std::time::Duration;

use internwatch_shared::{InternwatchError, RawPosting, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Default timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for listing requests.
const USER_AGENT: &str = concat!("internwatch/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Fetch options
// ---------------------------------------------------------------------------

/// Configuration for the listings request.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Timeout for the whole request in seconds.
    pub timeout_secs: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Fetch the listings array from `url`.
///
/// Any transport failure, non-2xx status, or body that is not a JSON array of
/// objects is returned as an error; there are no retries.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_listings(url: &Url, opts: &FetchOptions) -> Result<Vec<RawPosting>> {
    info!("fetching listings");

    let client = build_client(opts)?;
    let body = fetch_body(&client, url).await?;
    let listings = parse_listings(&body)?;

    info!(count = listings.len(), bytes = body.len(), "listings fetched");
    Ok(listings)
}

/// Decode a listings document: a JSON array whose elements are all objects.
pub fn parse_listings(body: &str) -> Result<Vec<RawPosting>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| InternwatchError::parse(format!("listings are not valid JSON: {e}")))?;

    let Value::Array(items) = value else {
        return Err(InternwatchError::validation(
            "listings document is not a JSON array",
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(InternwatchError::validation(format!(
                "listing #{i} is not an object (found {})",
                json_kind(&other)
            ))),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &FetchOptions) -> Result<Client> {
    Client::builder()
        .user_agent(opts.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| InternwatchError::Network(format!("failed to build HTTP client: {e}")))
}

/// GET `url` and return the body text of a successful response.
async fn fetch_body(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| InternwatchError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(InternwatchError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| InternwatchError::Network(format!("{url}: failed to read body: {e}")))?;

    debug!(len = body.len(), "response body read");
    Ok(body)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
