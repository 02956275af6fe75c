//! Shared HTTP plumbing for the backend providers

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

const RETRIES: usize = 3;
const RETRY_DELAY_MS: u64 = 500;

/// Builds the client shared by a provider's requests.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("feedscope/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")
}

/// Issues a GET with query parameters, retrying transport errors a few
/// times before giving up. Responses with error statuses are returned to
/// the caller untouched; only failures to obtain a response retry.
pub async fn get_with_retry(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<Response> {
    let mut attempt = 1;
    loop {
        match client.get(url).query(query).send().await {
            Ok(response) => return Ok(response),
            Err(err) => {
                if attempt > RETRIES {
                    return Err(anyhow::Error::from(err))
                        .with_context(|| format!("Request failed after {RETRIES} retries: {url}"));
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, RETRIES, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
            }
        }
    }
}
