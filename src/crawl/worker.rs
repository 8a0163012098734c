// src/crawl/worker.rs
// =============================================================================
// The fetch worker: one GET request against one target URL.
//
// What it measures:
// - Wall-clock time from just before the request is sent until the response
//   headers arrive. The body is never read; warming the cache only needs the
//   server (or CDN) to produce the response.
//
// What counts as failure:
// - Only transport problems: DNS, connect, TLS, timeout, ...
// - A 404 or 500 is still a response, so it is logged as a normal
//   "response time" line (with the status attached) and not as an error.
//
// Failures are logged and swallowed here. Nothing a single target does can
// stop the rest of the crawl.
// =============================================================================

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};

/// Outcome of one fetch, logged by `report` and then dropped
#[derive(Debug)]
pub struct FetchResult {
    pub url: String,
    pub elapsed: Duration,
    pub outcome: Result<StatusCode, reqwest::Error>,
}

impl FetchResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Requests `url` and times it
pub async fn fetch(client: &Client, url: String) -> FetchResult {
    let start = Instant::now();
    // send() resolves once the status line and headers are in
    let outcome = client.get(&url).send().await.map(|response| response.status());
    let elapsed = start.elapsed();

    FetchResult {
        url,
        elapsed,
        outcome,
    }
}

/// Writes the one log line a fetch produces
pub fn report(result: &FetchResult) {
    match &result.outcome {
        Ok(status) => {
            tracing::info!(
                status = status.as_u16(),
                "response time: {} ms for requesting {}",
                result.elapsed.as_millis(),
                result.url
            );
        }
        Err(e) => {
            tracing::error!("could not crawl URL '{}': {}", result.url, describe(e));
        }
    }
}

/// Fetches, logs, and tells the caller whether the request went through
pub async fn run(client: Client, url: String) -> bool {
    let result = fetch(&client, url).await;
    report(&result);
    result.is_ok()
}

// reqwest's Display for errors is short ("error sending request for url");
// name the common causes so the log line is useful on its own
fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out ({})", error)
    } else if error.is_connect() {
        format!("connection failed ({})", error)
    } else if error.is_redirect() {
        format!("too many redirects ({})", error)
    } else {
        error.to_string()
    }
}
