//! `HttpClient` over reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(100);

/// Reqwest-backed client with a pooled connection.
///
/// Idempotent requests (see [`HttpMethod::is_idempotent`]) are retried with
/// exponential backoff on transport errors, 5xx and 429. Other requests are
/// sent exactly once.
pub struct ReqwestHttpClient {
    client: Client,
    attempts: u32,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("music-library/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BridgeError::NotAvailable(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            attempts: DEFAULT_ATTEMPTS,
        })
    }

    /// Caps the attempts made for idempotent requests (at least one).
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn backoff(retry: u32) -> Duration {
        BASE_BACKOFF.saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
    }

    async fn send_once(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(Self::method(request.method), &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BridgeError::OperationFailed(format!("Request to {} timed out", request.url))
            } else {
                BridgeError::OperationFailed(format!("Request to {} failed: {}", request.url, e))
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Cannot read response: {}", e)))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn is_retryable(status: u16) -> bool {
    status >= 500 || status == 429
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let attempts = if request.method.is_idempotent() {
            self.attempts
        } else {
            1
        };

        let mut attempt = 1;
        loop {
            debug!(method = ?request.method, url = %request.url, attempt, "Sending HTTP request");
            let outcome = self.send_once(&request).await;

            let retry = match &outcome {
                Ok(response) => is_retryable(response.status),
                Err(_) => true,
            };
            if !retry || attempt >= attempts {
                return outcome;
            }

            match &outcome {
                Ok(response) => warn!(status = response.status, attempt, "Retrying HTTP request"),
                Err(e) => warn!(error = %e, attempt, "Retrying HTTP request"),
            }
            tokio::time::sleep(Self::backoff(attempt)).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(ReqwestHttpClient::new().is_ok());
        assert_eq!(ReqwestHttpClient::new().unwrap().with_attempts(0).attempts, 1);
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(ReqwestHttpClient::method(HttpMethod::Patch), reqwest::Method::PATCH);
        assert_eq!(ReqwestHttpClient::method(HttpMethod::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(ReqwestHttpClient::backoff(1), Duration::from_millis(100));
        assert_eq!(ReqwestHttpClient::backoff(3), Duration::from_millis(400));
        assert!(is_retryable(503));
        assert!(is_retryable(429));
        assert!(!is_retryable(404));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let client = ReqwestHttpClient::with_timeout(Duration::from_secs(1))
            .unwrap()
            .with_attempts(2);
        let request = HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:9/api/songs");

        let result = client.execute(request).await;
        assert!(matches!(result, Err(BridgeError::OperationFailed(_))));
    }
}
