// src/crawl/gate.rs
// =============================================================================
// Admission control for fetch workers.
//
// A ConcurrencyGate holds `capacity` tokens. The producer (the code walking
// the sitemap or the link list) must acquire a token before it may spawn a
// worker, so when every token is out the producer itself waits. That keeps
// at most `capacity` requests in flight and stops the frontier from racing
// ahead of the network.
//
// The token is returned when the AdmissionToken is dropped. Workers just keep
// it alive for their whole body: success, error and panic all drop it.
//
// Rust concepts:
// - Semaphore: tokio's async counting semaphore
// - Drop: code that runs when a value goes out of scope (even during a panic)
// - Arc + atomics: shared counters without a lock
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{CrawlError, Result};

#[derive(Debug)]
struct Counters {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// Bounded counting gate; cheap to clone, clones share the same tokens
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    counters: Arc<Counters>,
}

/// Authorizes one in-flight fetch until dropped
#[derive(Debug)]
#[must_use = "the token is released as soon as it is dropped"]
pub struct AdmissionToken {
    _permit: OwnedSemaphorePermit,
    counters: Arc<Counters>,
}

impl ConcurrencyGate {
    /// Creates a gate with `capacity` tokens
    ///
    /// Parameters:
    ///   capacity: how many fetches may run at once. 0 is raised to 1, and
    ///   anything above Semaphore::MAX_PERMITS is lowered to it
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            counters: Arc::new(Counters {
                acquired: AtomicUsize::new(0),
                released: AtomicUsize::new(0),
            }),
        }
    }

    /// Waits until a token is free and takes it
    pub async fn acquire(&self) -> Result<AdmissionToken> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CrawlError::GateClosed)?;

        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(AdmissionToken {
            _permit: permit,
            counters: self.counters.clone(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tokens not currently held
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Tokens currently held
    pub fn in_flight(&self) -> usize {
        self.capacity - self.available()
    }

    /// Total tokens handed out so far
    pub fn acquired(&self) -> usize {
        self.counters.acquired.load(Ordering::SeqCst)
    }

    /// Total tokens given back so far
    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }
}

impl AdmissionToken {
    /// Gives the token back right away (same as dropping it)
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for AdmissionToken {
    fn drop(&mut self) {
        // The permit field is dropped right after this, returning the slot
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}
