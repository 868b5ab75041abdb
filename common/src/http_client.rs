use crate::errors::AppError;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, instrument, warn};

const MAX_ERROR_BODY: usize = 200;

/// Shared HTTP client for third-party APIs.
///
/// Requests are sent exactly once. A timeout is only applied when one is
/// configured; otherwise a hung upstream hangs the caller.
pub struct HttpClient {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Fetch JSON from URL, failing on transport errors and non-success statuses
    #[instrument(skip(self, url))]
    pub async fn get_json<T>(&self, url: &str) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::timeout("Upstream request timed out")
            } else {
                AppError::NetworkError(e.without_url())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Upstream returned non-success status");
            let reason = status.canonical_reason().unwrap_or("Unexpected status");
            return Err(AppError::http(
                status.as_u16(),
                format!("{} {}", reason, truncate_body(&body)).trim_end().to_string(),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::NetworkError(e.without_url()))?;
        let json: T = serde_json::from_str(&text).map_err(AppError::ParseError)?;

        info!(status = status.as_u16(), "Upstream request successful");
        Ok(json)
    }
}

fn truncate_body(body: &str) -> &str {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    fn client() -> HttpClient {
        HttpClient::new("weather-test/1.0", None).expect("client should build")
    }

    #[tokio::test]
    async fn get_json_sends_user_agent_and_parses_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ok"))
            .and(header("user-agent", "weather-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": 7 })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let body: serde_json::Value = client()
            .get_json(&format!("{}/ok", mock_server.uri()))
            .await
            .expect("request should succeed");

        assert_eq!(body["value"], 7);
    }

    #[tokio::test]
    async fn non_success_status_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/error"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client()
            .get_json::<serde_json::Value>(&format!("{}/error", mock_server.uri()))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "HTTP error: 500 - Internal Server Error Internal Server Error");
        match err {
            AppError::HttpError { status, message } => {
                assert_eq!(status, 500);
                assert!(!message.contains("500"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn network_error_omits_request_url() {
        let err = client()
            .get_json::<serde_json::Value>("http://127.0.0.1:1/w?lat=1&lon=2&appid=SECRETKEY")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NetworkError(_)));
        let message = err.to_string();
        assert!(!message.contains("SECRETKEY"), "{message}");
        assert!(!message.contains("127.0.0.1"), "{message}");
    }

    #[tokio::test]
    async fn invalid_json_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let err = client()
            .get_json::<serde_json::Value>(&format!("{}/garbage", mock_server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ParseError(_)));
    }

    #[tokio::test]
    async fn configured_timeout_is_enforced() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new("weather-test/1.0", Some(Duration::from_millis(100)))
            .expect("client should build");

        let err = client
            .get_json::<serde_json::Value>(&format!("{}/slow", mock_server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TimeoutError(_)));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(150);
        let truncated = truncate_body(&long);
        assert!(truncated.len() <= MAX_ERROR_BODY);
        assert!(long.starts_with(truncated));
        assert_eq!(truncate_body("short"), "short");
    }
}
