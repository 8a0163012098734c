// src/crawl/links.rs
// =============================================================================
// Links mode: warm every same-site link found on one start page.
//
// How it works:
// 1. Fetch the start page (the --site value). A transport failure here ends
//    the crawl of this site with an error.
// 2. Select elements with the operator's CSS selector and read their href.
// 3. Resolve each href against the start URL. Links to other hosts, mailto:
//    and friends are skipped quietly.
// 4. Dispatch the rest through the concurrency gate, then wait for all of
//    them before returning.
//
// Only the start page is parsed; the pages it links to are requested but
// not followed.
// =============================================================================

use reqwest::Client;
use scraper::Selector;

use super::dispatch::{CrawlSummary, Dispatcher};
use super::gate::ConcurrencyGate;
use super::resolve::{Origin, Resolved};
use crate::error::{CrawlError, Result};
use crate::parse::extract_links;

/// Crawls the links matching `selector` on the page at `start_url`
///
/// Parameters:
///   client: the run's shared HTTP client
///   start_url: the seed page, also used as the origin for scope checks
///   selector: compiled --css3selector
///   concurrency: gate capacity for this site
///
/// Returns: the site's summary after all requests finished, or an error if
/// the start page could not be fetched
pub async fn crawl_links(
    client: &Client,
    start_url: &str,
    selector: &Selector,
    concurrency: usize,
) -> Result<CrawlSummary> {
    let origin = Origin::parse(start_url)?;
    tracing::info!("crawling links on '{}'", origin.as_str());

    let html = fetch_seed(client, start_url).await?;
    // The parsed document is dropped inside extract_links, before any await
    let references = extract_links(&html, selector);
    tracing::debug!("{} candidate links on {}", references.len(), start_url);

    let mut dispatcher = Dispatcher::new(client.clone(), ConcurrencyGate::new(concurrency));
    for reference in references {
        match origin.resolve(&reference) {
            Some(Resolved { url, in_scope: true }) => dispatcher.dispatch(url).await?,
            _ => dispatcher.skip(&reference),
        }
    }

    Ok(dispatcher.drain().await)
}

// Fetches the start page body. Like any other page a 404 still has links,
// so a bad status is only a warning.
async fn fetch_seed(client: &Client, url: &str) -> Result<String> {
    let request_error = |source| CrawlError::Request {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(request_error)?;
    if !response.status().is_success() {
        tracing::warn!("start page '{}' responded with HTTP {}", url, response.status());
    }

    response.text().await.map_err(request_error)
}
