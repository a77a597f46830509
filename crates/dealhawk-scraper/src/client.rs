//! HTTP fetch client for marketplace pages.
//!
//! The core pipeline never performs network I/O itself; this client is the
//! collaborator that turns a URL into a raw HTML body, with typed errors
//! for rate limiting, missing pages, and the marketplace's CAPTCHA
//! interstitial. Transient failures (429, network errors) are retried with
//! exponential backoff.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::ScraperError;
use crate::markup::is_captcha_challenge;
use crate::retry::retry_with_backoff;

/// Fallback pause the server is granted when a 429 response carries no
/// `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

pub struct MarketClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `base * 2^attempt`.
    backoff_base_secs: u64,
}

impl MarketClient {
    /// Creates a client with configured timeout, `User-Agent`, and retry
    /// policy. Set `max_retries` to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Creates a client from the application's scraper settings.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn from_app_config(config: &dealhawk_core::AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )
    }

    /// Fetches a page body, retrying transient errors.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::CaptchaChallenge`] — the marketplace served its
    ///   bot-check interstitial instead of content (not retried).
    /// - [`ScraperError::NotFound`] — HTTP 404 (not retried).
    /// - [`ScraperError::RateLimited`] — HTTP 429 after all retries.
    /// - [`ScraperError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`ScraperError::Http`] — network failure after all retries.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            self.fetch_page_once(url)
        })
        .await
    }

    async fn fetch_page_once(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        match status {
            StatusCode::NOT_FOUND => {
                return Err(ScraperError::NotFound {
                    url: url.to_string(),
                })
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                return Err(ScraperError::RateLimited {
                    url: url.to_string(),
                    retry_after_secs,
                });
            }
            s if !s.is_success() => {
                return Err(ScraperError::UnexpectedStatus {
                    status: s.as_u16(),
                    url: url.to_string(),
                })
            }
            _ => {}
        }

        let body = response.text().await?;

        if is_captcha_challenge(&body) {
            tracing::warn!(url, "marketplace served a CAPTCHA challenge");
            return Err(ScraperError::CaptchaChallenge {
                url: url.to_string(),
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;
