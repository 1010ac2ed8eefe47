//! HTTP client for supplier product pages.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

/// Settings for [`PageFetcher`], usually taken from `AppConfig`.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    /// Wait before the n-th retry is `backoff_base_secs * 2^(n-1)` seconds.
    pub backoff_base_secs: u64,
}

impl FetchConfig {
    #[must_use]
    pub fn from_app_config(config: &hypex_core::AppConfig) -> Self {
        Self {
            timeout_secs: config.scraper_request_timeout_secs,
            user_agent: config.scraper_user_agent.clone(),
            max_retries: config.scraper_max_retries,
            backoff_base_secs: config.scraper_retry_backoff_base_secs,
        }
    }
}

/// Fetches product-page HTML.
///
/// 429 and network failures are retried with exponential backoff; 404 and
/// any other non-2xx status are returned as typed errors straight away.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl PageFetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &FetchConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries: config.max_retries,
            backoff_base_secs: config.backoff_base_secs,
        })
    }

    /// Downloads `url` and returns the body as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `url` does not parse.
    /// - [`ScraperError::RateLimited`] for HTTP 429 after all retries.
    /// - [`ScraperError::NotFound`] for HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`ScraperError::Http`] for network or TLS failures after all retries.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        let domain = parsed.host_str().unwrap_or(url).to_owned();

        retry_with_backoff("fetch_html", self.max_retries, self.backoff_base_secs, || {
            let parsed = parsed.clone();
            let domain = domain.clone();
            async move {
                let response = self
                    .client
                    .get(parsed.clone())
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "nb-NO,nb;q=0.9,en-US;q=0.8")
                    .header(reqwest::header::CACHE_CONTROL, "no-cache")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        domain,
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound {
                        url: parsed.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: parsed.to_string(),
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await
    }

    /// Downloads `url` and deserializes the JSON body.
    ///
    /// Used for supplier product feeds rather than product pages.
    ///
    /// # Errors
    ///
    /// Same as [`PageFetcher::fetch_html`], plus [`ScraperError::Deserialize`]
    /// when the body is not the expected JSON.
    pub async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, ScraperError> {
        let body = self.fetch_html(url).await?;
        serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
            context: url.to_owned(),
            source: e,
        })
    }
}
