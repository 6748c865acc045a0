//! Resilient Fetch
//!
//! One GET with a per-attempt timeout and linear retry backoff. Client
//! errors (status < 500) are returned immediately; everything else is
//! retried until the budget runs out.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::error::{sanitize_message, FetchError};

/// Retry and timeout settings applied to every outbound call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub retries: u32,
    /// Budget for a single attempt, including reading the body
    pub timeout: Duration,
    /// Delay unit; attempt `n` waits `n * base_delay` before starting
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            timeout: Duration::from_millis(10_000),
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt` (zero-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Same policy with a different per-attempt timeout
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

/// JSON fetcher wrapping a shared reqwest client
#[derive(Clone)]
pub struct JsonFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl JsonFetcher {
    /// Create a fetcher around an existing client
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Get the active retry policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// Bodies that are empty or not JSON decode to `Value::Null`.
    pub async fn fetch_json(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<Value, FetchError> {
        let mut last_error = FetchError::Exhausted;

        for attempt in 0..=self.policy.retries {
            if attempt > 0 {
                tokio::time::sleep(self.policy.delay_for(attempt)).await;
            }

            match self.attempt(url, headers).await {
                Ok(json) => return Ok(json),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    tracing::debug!(
                        attempt = attempt + 1,
                        retries = self.policy.retries,
                        error = %e,
                        "Retryable fetch failure"
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn attempt(&self, url: &str, headers: &[(String, String)]) -> Result<Value, FetchError> {
        let timeout_ms = self.policy.timeout.as_millis() as u64;

        // Dropping the future on expiry cancels the in-flight request
        match tokio::time::timeout(self.policy.timeout, self.send(url, headers)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout { timeout_ms }),
        }
    }

    async fn send(&self, url: &str, headers: &[(String, String)]) -> Result<Value, FetchError> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let json = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: error_message(&json, &text, reason),
            });
        }

        Ok(json)
    }
}

/// Pick the most useful message from an error response
fn error_message(json: &Value, text: &str, reason: &str) -> String {
    let from_json = ["message", "error"]
        .iter()
        .filter_map(|key| json.get(key))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Object(o) => o.get("message").and_then(Value::as_str).map(String::from),
            _ => None,
        });

    let message = sanitize_message(from_json.as_deref().unwrap_or(text));
    if message.is_empty() {
        reason.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher(retries: u32, timeout_ms: u64) -> JsonFetcher {
        JsonFetcher::new(
            Client::new(),
            RetryPolicy {
                retries,
                timeout: Duration::from_millis(timeout_ms),
                base_delay: Duration::from_millis(5),
            },
        )
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy {
            retries: 3,
            timeout: Duration::from_secs(1),
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_for(0), Duration::ZERO);
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(3), Duration::from_millis(300));
    }

    #[test]
    fn test_error_message_selection() {
        assert_eq!(error_message(&json!({"message": "Bad key"}), "", "Unauthorized"), "Bad key");
        assert_eq!(error_message(&json!({"error": "nope"}), "", "Forbidden"), "nope");
        assert_eq!(
            error_message(&json!({"error": {"message": "nested"}}), "", "Forbidden"),
            "nested"
        );
        assert_eq!(error_message(&Value::Null, "<p>Gone</p>", "Gone"), "Gone");
        assert_eq!(error_message(&Value::Null, "", "Not Found"), "Not Found");
    }

    #[tokio::test]
    async fn test_success_sends_accept_and_auth_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people"))
            .and(header("Accept", "application/json"))
            .and(header("X-API-KEY", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [1]})))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = test_fetcher(2, 1000);
        let body = fetcher
            .fetch_json(
                &format!("{}/people", server.uri()),
                &[("X-API-KEY".to_string(), "k".to_string())],
            )
            .await
            .unwrap();

        assert_eq!(body, json!({"data": [1]}));
    }

    #[tokio::test]
    async fn test_non_json_body_decodes_to_null() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok, not json"))
            .mount(&server)
            .await;

        let body = test_fetcher(0, 1000).fetch_json(&server.uri(), &[]).await.unwrap();
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "No such route"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = test_fetcher(3, 1000).fetch_json(&server.uri(), &[]).await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "No such route");
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_retried_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let body = test_fetcher(2, 1000).fetch_json(&server.uri(), &[]).await.unwrap();

        assert_eq!(body, json!({"ok": true}));
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted_returns_last_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<h1>Unavailable</h1>"))
            .mount(&server)
            .await;

        let err = test_fetcher(1, 1000).fetch_json(&server.uri(), &[]).await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "Unavailable");
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = test_fetcher(1, 50).fetch_json(&server.uri(), &[]).await.unwrap_err();

        assert_eq!(err, FetchError::Timeout { timeout_ms: 50 });
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_connection_refused_is_request_error() {
        // Nothing listens on port 9 locally
        let err = test_fetcher(0, 1000)
            .fetch_json("http://127.0.0.1:9/people", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Request(_)));
    }
}
