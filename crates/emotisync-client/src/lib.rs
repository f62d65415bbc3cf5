//! emotisync-client — HTTP client for the remote expression-recognition
//! service.
//!
//! Owns the request lifecycle: an advisory health probe, submission with a
//! fixed timeout budget, and classification of transport failures. A
//! request runs Idle → Sending → Succeeded/Failed and is terminal either
//! way; nothing here retries, a failure surfaces to the user who may
//! re-trigger manually.

pub mod classify;

pub use classify::{classify_failure, RequestError};

use emotisync_core::{RecognitionRequest, RecognitionResponse};
use std::time::Duration;

/// Health probe timeout. Advisory only; never gates submission.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
/// Total budget for one inference request.
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of the advisory health probe. Both outcomes surface as notices.
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub reachable: bool,
    pub detail: String,
}

pub struct RecognitionClient {
    http: reqwest::Client,
    base_url: String,
}

impl RecognitionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET the health endpoint with a short timeout.
    pub async fn check_health(&self) -> HealthStatus {
        let url = self.endpoint("/health");
        tracing::debug!(%url, "probing service health");

        match self.http.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(response) if response.status().is_success() => {
                let body = response.text().await.unwrap_or_default();
                tracing::info!(%url, "service reachable");
                HealthStatus {
                    reachable: true,
                    detail: body,
                }
            }
            Ok(response) => {
                let status = response.status();
                tracing::warn!(%url, %status, "health probe got error status");
                HealthStatus {
                    reachable: false,
                    detail: format!("URL: {url}\n状态: {status}"),
                }
            }
            Err(err) => {
                tracing::warn!(%url, error = %err, "health probe failed");
                HealthStatus {
                    reachable: false,
                    detail: format!("URL: {url}\n错误: {err}"),
                }
            }
        }
    }

    /// POST the request to the inference endpoint.
    ///
    /// Exactly one of image/video must already be set on the request; the
    /// constructors on [`RecognitionRequest`] guarantee that, and the
    /// client does not re-validate.
    pub async fn submit(
        &self,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResponse, RequestError> {
        let url = self.endpoint("/inference");
        tracing::info!(%url, "submitting recognition request");

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(request)
            .timeout(SUBMIT_TIMEOUT)
            .send()
            .await
            .map_err(|err| classify_failure(&transport_message(&err)))?;

        let status = response.status();
        if !status.is_success() {
            // HTTP-level failures arrive as a status line, not a transport
            // error, so classification sees the numeric code.
            tracing::warn!(%url, %status, "inference returned error status");
            return Err(classify_failure(&format!("unexpected status {status}")));
        }

        response
            .json::<RecognitionResponse>()
            .await
            .map_err(|err| classify_failure(&transport_message(&err)))
    }
}

/// Render a reqwest failure in the transport's message vocabulary so the
/// ordered classification rules can match on it.
fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request:fail timeout {err}")
    } else if err.is_decode() {
        // A malformed body is not a connectivity problem.
        err.to_string()
    } else {
        format!("request:fail {err}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = RecognitionClient::new("http://127.0.0.1:5000/");
        assert_eq!(client.endpoint("/health"), "http://127.0.0.1:5000/health");
        assert_eq!(
            client.endpoint("/inference"),
            "http://127.0.0.1:5000/inference"
        );
    }
}
