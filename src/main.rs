// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (RUST_LOG, default "info")
// 2. Parse command-line arguments using clap
// 3. Crawl every --site in order, in the chosen mode
// 4. Exit with 0, or print the error and exit with 1 if a site could not
//    be crawled at all
//
// A single page failing to load is not an error at this level; the fetch
// worker already logged it.
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod parse;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use scraper::Selector;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Mode};
use config::RunConfig;
use crawl::CrawlSummary;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = RunConfig::from(Cli::parse());
    let exit_code = match run(&config).await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(config: &RunConfig) -> Result<()> {
    let client = config.client.build_client()?;

    // Compile the selector before any request goes out
    let selector = match config.mode {
        Mode::Links => Some(parse::compile_selector(&config.selector)?),
        Mode::Sitemap => None,
    };

    for site in &config.sites {
        let summary = crawl_site(&client, site, selector.as_ref(), config.concurrency)
            .await
            .with_context(|| format!("could not crawl site '{}'", site))?;

        tracing::info!(
            dispatched = summary.dispatched,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "finished crawling '{}'",
            site
        );
    }

    Ok(())
}

// A selector means links mode, no selector means sitemap mode
async fn crawl_site(
    client: &Client,
    site: &str,
    selector: Option<&Selector>,
    concurrency: usize,
) -> error::Result<CrawlSummary> {
    match selector {
        Some(selector) => crawl::crawl_links(client, site, selector, concurrency).await,
        None => {
            let url = crawl::sitemap_url(site)?;
            crawl::crawl_sitemap(client, &url, concurrency).await
        }
    }
}
