use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tagfill::http::{HttpError, RetryPolicy, request_with_retry};
use tokio::time::Instant;

fn policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(1000),
        ..RetryPolicy::default()
    }
}

fn status(code: u16) -> HttpError {
    HttpError::Status {
        status: code,
        url: "https://example.test/resource".to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_retries_transient_status_with_linear_backoff() {
    let attempts = AtomicU32::new(0);
    let started = Instant::now();

    // Two 503 answers, then success
    let result = request_with_retry(&policy(3), || {
        let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        async move { if n <= 2 { Err(status(503)) } else { Ok(n) } }
    })
    .await;

    assert_eq!(result.ok(), Some(3));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    // 1000ms after the first failure, 2000ms after the second
    assert!(started.elapsed() >= Duration::from_millis(3000));
    assert!(started.elapsed() < Duration::from_millis(4000));
}

#[tokio::test(start_paused = true)]
async fn test_retries_network_errors_and_rate_limits() {
    let attempts = AtomicU32::new(0);

    let result = request_with_retry(&policy(3), || {
        let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            match n {
                1 => Err(HttpError::Network("connection reset".to_string())),
                2 => Err(status(429)),
                _ => Ok("body"),
            }
        }
    })
    .await;

    assert_eq!(result.ok(), Some("body"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_client_errors_are_not_retried() {
    let attempts = AtomicU32::new(0);
    let started = Instant::now();

    let result: Result<(), HttpError> = request_with_retry(&policy(3), || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Err(status(404)) }
    })
    .await;

    assert_eq!(result.err().and_then(|e| e.status()), Some(404));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_budget_returns_last_error() {
    let attempts = AtomicU32::new(0);

    let result: Result<(), HttpError> = request_with_retry(&policy(3), || {
        let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        // Last answer differs so we can tell which error came back
        async move { Err(status(if n < 4 { 503 } else { 502 })) }
    })
    .await;

    assert_eq!(result.err().and_then(|e| e.status()), Some(502));
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_zero_retries_means_single_attempt() {
    let attempts = AtomicU32::new(0);

    let result: Result<(), HttpError> = request_with_retry(&policy(0), || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Err(status(503)) }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_custom_retry_predicate() {
    let attempts = AtomicU32::new(0);
    let never = RetryPolicy {
        retryable: |_, _| false,
        ..policy(3)
    };

    let result: Result<(), HttpError> = request_with_retry(&never, || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Err(HttpError::Network("timeout".to_string())) }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
