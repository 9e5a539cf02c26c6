//! Shared HTTP client with bounded retry.
//!
//! Every provider goes through [`HttpClient`], which runs each request under the
//! same [`RetryPolicy`]. A request is retried only when the failure is transient:
//! no response at all (timeout, refused connection, interrupted body) or a
//! `429`/`5xx` status. Everything else is returned to the caller on the first
//! attempt.
//!
//! Backoff is linear: the n-th retry waits `base_delay × n`.

use std::{fmt, future::Future, time::Duration};

use reqwest::{Client, RequestBuilder, multipart::Form};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{config, warning};

/// Failure of a single outbound request.
#[derive(Debug)]
pub enum HttpError {
    /// No usable response: timeout, connection failure, truncated body.
    Network(String),
    /// The server answered with a non-success status.
    Status { status: u16, url: String },
    /// The request could not be built, e.g. a malformed URL. Never sent.
    Request(String),
    /// The response arrived but could not be decoded.
    Decode(String),
}

impl HttpError {
    /// The HTTP status, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, HttpError::Network(_))
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::Network(msg) => write!(f, "network error: {}", msg),
            HttpError::Status { status, url } => write!(f, "HTTP {} from {}", status, url),
            HttpError::Request(msg) => write!(f, "invalid request: {}", msg),
            HttpError::Decode(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Default classification: retry when there was no response, or on 429 and any 5xx.
pub fn is_transient(status: Option<u16>, network_error: bool) -> bool {
    if network_error {
        return true;
    }
    matches!(status, Some(429) | Some(503)) || status.is_some_and(|s| s >= 500)
}

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Delay unit; the n-th retry waits `base_delay * n`.
    pub base_delay: Duration,
    /// Decides from `(status, network_error)` whether a failure is worth retrying.
    pub retryable: fn(Option<u16>, bool) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            retryable: is_transient,
        }
    }
}

impl RetryPolicy {
    fn should_retry(&self, err: &HttpError) -> bool {
        (self.retryable)(err.status(), err.is_network())
    }
}

/// Runs `call` until it succeeds, fails permanently, or the retry budget runs out.
///
/// The last error is returned unchanged when the budget is exhausted.
///
/// # Example
///
/// ```
/// let body = request_with_retry(&policy, || client.get(url).send()).await?;
/// ```
pub async fn request_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut call: F,
) -> Result<T, HttpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HttpError>>,
{
    let mut attempt: u32 = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt > policy.max_retries || !policy.should_retry(&err) {
                    return Err(err);
                }

                let delay = policy.base_delay * attempt;
                warning!(
                    "Request failed ({}). Retrying in {}ms... ({}/{})",
                    err.status()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "timeout".to_string()),
                    delay.as_millis(),
                    attempt,
                    policy.max_retries
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// `reqwest` client plus the retry policy every provider shares.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn new(policy: RetryPolicy) -> Result<Self, HttpError> {
        let client = Client::builder()
            .user_agent(config::USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HttpError::Request(e.to_string()))?;
        Ok(Self { client, policy })
    }

    /// GET `url` and return the raw body.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        request_with_retry(&self.policy, || execute(self.client.get(url))).await
    }

    /// GET `url` and return the body as text.
    pub async fn get_text(&self, url: &str) -> Result<String, HttpError> {
        let body = self.get_bytes(url).await?;
        String::from_utf8(body).map_err(|e| HttpError::Decode(e.to_string()))
    }

    /// GET `url` and decode the JSON body into `T`.
    ///
    /// Decoding happens after the retry loop, so a malformed payload is never retried.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let body = self.get_bytes(url).await?;
        serde_json::from_slice(&body).map_err(|e| HttpError::Decode(e.to_string()))
    }

    /// POST a multipart form and decode the JSON answer.
    ///
    /// `build_form` is called once per attempt because a sent form is consumed.
    pub async fn post_multipart_json<T, B>(&self, url: &str, build_form: B) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        B: Fn() -> Form,
    {
        let body = request_with_retry(&self.policy, || {
            execute(self.client.post(url).multipart(build_form()))
        })
        .await?;
        serde_json::from_slice(&body).map_err(|e| HttpError::Decode(e.to_string()))
    }
}

async fn execute(request: RequestBuilder) -> Result<Vec<u8>, HttpError> {
    let response = request.send().await.map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        return Err(HttpError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }

    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| HttpError::Network(e.to_string()))
}

/// Builder errors (bad URL, bad header) fail the same way on every attempt.
fn classify(err: reqwest::Error) -> HttpError {
    if err.is_builder() {
        HttpError::Request(err.to_string())
    } else {
        HttpError::Network(err.to_string())
    }
}
