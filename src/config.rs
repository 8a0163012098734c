// src/config.rs
// =============================================================================
// Run configuration, built once from the command line and then only read.
//
// The HTTP client settings live in ClientConfig and are turned into a single
// reqwest::Client at startup. That client is cloned into every fetch worker
// (clones share one connection pool), so every request in the process uses
// the same timeout and user agent. Nothing mutates it during a crawl.
// =============================================================================

use std::time::Duration;

use reqwest::Client;

use crate::cli::{Cli, Mode};
use crate::error::{CrawlError, Result};

pub const DEFAULT_USER_AGENT: &str = concat!("cache-warmer/", env!("CARGO_PKG_VERSION"));

/// Transport options shared by every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Per-request timeout (connect + headers + body)
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Builds the one HTTP client the whole run shares
    pub fn build_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(CrawlError::Client)
    }
}

/// Everything a run needs, already validated by clap
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: Mode,
    pub sites: Vec<String>,
    pub selector: String,
    pub concurrency: usize,
    pub client: ClientConfig,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        Self {
            mode: cli.mode,
            sites: cli.sites,
            selector: cli.css3selector,
            concurrency: cli.concurrency,
            client: ClientConfig {
                timeout: Duration::from_secs(cli.timeout),
                user_agent: cli.user_agent,
            },
        }
    }
}
