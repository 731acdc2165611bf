//! Shared HTTP client with per-call timeout and bounded retry
//!
//! Every outbound call (geocoding, IP location, weather) goes through the
//! client built here, so a slow upstream can never stall an interaction
//! longer than `timeout * (max_retries + 1)` plus backoff.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::debug;

use crate::config::HttpConfig;

const USER_AGENT: &str = concat!("aqi-predictor/", env!("CARGO_PKG_VERSION"));
const MIN_RETRY_INTERVAL: Duration = Duration::from_millis(250);
const MAX_RETRY_INTERVAL: Duration = Duration::from_secs(2);

/// Build the HTTP client used by all external-call wrappers
pub fn build_client(config: &HttpConfig) -> Result<ClientWithMiddleware> {
    let timeout = Duration::from_secs(config.timeout_seconds.into());

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .with_context(|| "Failed to create HTTP client")?;

    debug!(
        "HTTP client ready (timeout: {}s, max retries: {})",
        config.timeout_seconds, config.max_retries
    );

    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(MIN_RETRY_INTERVAL, MAX_RETRY_INTERVAL)
        .build_with_max_retries(config.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Describe a failed call without leaking the API key carried in its URL
pub(crate) fn describe_send_error(err: reqwest_middleware::Error, secret: &str) -> String {
    let message = match err {
        reqwest_middleware::Error::Reqwest(e) => e.without_url().to_string(),
        // retry middleware wraps the last attempt's error, URL included
        other => format!("{other:#}"),
    };
    redact(message, secret)
}

pub(crate) fn describe_body_error(err: reqwest::Error) -> String {
    err.without_url().to_string()
}

fn redact(message: String, secret: &str) -> String {
    if secret.is_empty() {
        return message;
    }
    message
        .replace(secret, "***")
        .replace(urlencoding::encode(secret).as_ref(), "***")
}

/// Strip a trailing slash so paths can be appended with `format!`
pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = HttpConfig {
            timeout_seconds: 5,
            max_retries: 1,
        };
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn test_redact_hides_raw_and_encoded_secret() {
        let message = "failed for url (http://x/?appid=a%2Bb) key=a+b".to_string();
        assert_eq!(redact(message, "a+b"), "failed for url (http://x/?appid=***) key=***");
        assert_eq!(redact("plain".to_string(), ""), "plain");
    }

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://localhost:1234/"), "http://localhost:1234");
        assert_eq!(trim_base_url("https://ipinfo.io"), "https://ipinfo.io");
    }
}
