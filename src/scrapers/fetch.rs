use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, warn};

use super::error::{Result, ScrapeError};
use super::types::ScrapeParams;

/// Short pause between transport-level retry attempts.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Retrying HTTP fetcher over one pooled client.
///
/// The client is shared across all requests of a run for connection reuse;
/// every response object stays local to the caller that requested it.
pub struct Fetcher {
    client: Client,
    max_retries: u32,
}

impl Fetcher {
    pub fn new(params: &ScrapeParams) -> Result<Self> {
        let client = Client::builder()
            .timeout(params.timeout)
            .user_agent(&params.user_agent)
            .build()?;

        Ok(Self {
            client,
            max_retries: params.max_retries,
        })
    }

    /// Issues a GET, retrying transport-level failures (connect, timeout) up
    /// to `max_retries`. Any completed HTTP exchange is returned as-is:
    /// status interpretation is the caller's concern, success is `status == 200`.
    pub async fn get(&self, url: &str) -> Result<Response> {
        let mut attempt = 0;
        loop {
            match self.client.get(url).send().await {
                Ok(response) => {
                    debug!("GET {} -> {}", url, response.status());
                    return Ok(response);
                }
                Err(err) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "GET {} failed (attempt {}/{}): {}",
                        url, attempt, self.max_retries, err
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(err) => {
                    return Err(ScrapeError::RetriesExhausted {
                        url: url.to_string(),
                        source: err,
                    });
                }
            }
        }
    }
}
