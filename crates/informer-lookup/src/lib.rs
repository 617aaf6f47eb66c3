//! Caller info lookups for Call Informer
//!
//! One HTTP GET per caller number against the configured info service. A
//! failed lookup degrades the display to the raw number — it never blocks a
//! call notification and is never retried.

use std::time::Duration;

use async_trait::async_trait;
use informer_core::config::LookupConfig;
use informer_core::models::{CallerDetails, LookupOutcome};
use informer_core::traits::CallerLookup;
use informer_core::{AppError, AppResult};
use reqwest::{Client, ClientBuilder};
use tracing::debug;

/// HTTP client for the caller info service
pub struct LookupClient {
    http: Client,
    info_url: String,
}

impl LookupClient {
    /// Create a new lookup client
    ///
    /// The timeout bounds the whole request; a slow info service must not
    /// hold resources for longer than one popup is worth.
    pub fn new(config: &LookupConfig) -> AppResult<Self> {
        let http = ClientBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self {
            http,
            info_url: config.info_url.clone(),
        })
    }

    fn request_url(&self, caller_number: &str) -> String {
        format!(
            "{}?phone_number={}",
            self.info_url,
            urlencoding::encode(caller_number)
        )
    }
}

/// Parse the service response body into display fields
///
/// Anything that is not a JSON object with at least one known field counts
/// as "nothing useful".
fn details_from_body(body: &str) -> Option<CallerDetails> {
    match serde_json::from_str::<CallerDetails>(body) {
        Ok(details) if !details.is_empty() => Some(details),
        Ok(_) => None,
        Err(e) => {
            debug!("malformed info response: {}", e);
            None
        }
    }
}

#[async_trait]
impl CallerLookup for LookupClient {
    async fn resolve(&self, caller_number: &str) -> AppResult<LookupOutcome> {
        let url = self.request_url(caller_number);
        debug!(%url, "resolving caller number");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Lookup(format!("info service unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "info service answered non-2xx");
            return Ok(LookupOutcome::NotFound);
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Lookup(format!("failed to read info response: {}", e)))?;

        Ok(match details_from_body(&body) {
            Some(details) => LookupOutcome::Found(details),
            None => LookupOutcome::NotFound,
        })
    }
}
