// src/crawl/dispatch.rs
// =============================================================================
// The task group that sits between a frontier and the fetch workers.
//
// For every URL a frontier produces, `dispatch`:
// 1. waits for a token from the ConcurrencyGate (this is where the producer
//    feels backpressure),
// 2. spawns a worker task that owns the token,
// 3. remembers the task in a JoinSet.
//
// `drain` then waits for every remembered task, so a crawl function only
// returns once all of its requests are finished. Without it, the next site
// would start while the previous one still had requests in flight.
//
// Finished tasks are reaped on every dispatch, so the JoinSet holds at most
// a handful of completed entries no matter how large the sitemap is.
// =============================================================================

use reqwest::Client;
use tokio::task::{JoinError, JoinSet};

use super::gate::ConcurrencyGate;
use super::worker;
use crate::error::Result;

/// Per-site counters, logged once the site is done
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Targets handed to a worker
    pub dispatched: usize,
    /// Workers that got a response (any status)
    pub succeeded: usize,
    /// Workers that hit a transport error or panicked
    pub failed: usize,
    /// Discovered references that were not fetched (out of scope or not HTTP)
    pub skipped: usize,
}

pub struct Dispatcher {
    client: Client,
    gate: ConcurrencyGate,
    tasks: JoinSet<bool>,
    summary: CrawlSummary,
}

impl Dispatcher {
    pub fn new(client: Client, gate: ConcurrencyGate) -> Self {
        Self {
            client,
            gate,
            tasks: JoinSet::new(),
            summary: CrawlSummary::default(),
        }
    }

    /// Waits for a free slot, then starts fetching `url` in the background
    pub async fn dispatch(&mut self, url: String) -> Result<()> {
        self.reap();

        let token = self.gate.acquire().await?;
        let client = self.client.clone();
        tracing::debug!(in_flight = self.gate.in_flight(), "dispatching {}", url);

        self.tasks.spawn(async move {
            // If the worker panics, unwinding drops the token instead
            let ok = worker::run(client, url).await;
            token.release();
            ok
        });
        self.summary.dispatched += 1;
        Ok(())
    }

    /// Counts a reference that was discovered but will not be fetched
    pub fn skip(&mut self, reference: &str) {
        tracing::debug!("skipping '{}'", reference);
        self.summary.skipped += 1;
    }

    /// Waits for every dispatched worker and returns the site's summary
    pub async fn drain(mut self) -> CrawlSummary {
        while let Some(joined) = self.tasks.join_next().await {
            self.record(joined);
        }
        tracing::debug!(
            acquired = self.gate.acquired(),
            released = self.gate.released(),
            "all fetch workers finished"
        );
        self.summary
    }

    fn reap(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            self.record(joined);
        }
    }

    fn record(&mut self, joined: std::result::Result<bool, JoinError>) {
        match joined {
            Ok(true) => self.summary.succeeded += 1,
            Ok(false) => self.summary.failed += 1,
            Err(e) => {
                tracing::error!("fetch worker did not finish: {}", e);
                self.summary.failed += 1;
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a JoinSet?
//    - A collection of spawned tasks that you can wait on as they finish
//    - join_next().await gives the next finished task's result
//    - try_join_next() does the same without waiting (None if nothing is done)
//
// 2. Why is the token released inside the task and not after join?
//    - The slot must free up the moment the request is done, so the producer
//      can dispatch the next URL without waiting for us to reap the task
//
// 3. What is a JoinError?
//    - What join_next returns when a task panicked (or was aborted)
//    - We count it as a failed target and keep going
// -----------------------------------------------------------------------------
