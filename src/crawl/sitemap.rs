// src/crawl/sitemap.rs
// =============================================================================
// Sitemap mode: warm every page listed in a site's sitemap.
//
// How it works:
// 1. Fetch <site>/sitemap.xml. If that fails, the site cannot be crawled and
//    the error goes back to the caller.
// 2. Stream its entries. Pages are dispatched through the concurrency gate
//    as they are read; child sitemaps (from a <sitemapindex>) are fetched
//    and streamed the same way, depth first.
// 3. Wait for every dispatched request, then return the summary.
//
// A child sitemap that cannot be fetched or parsed is logged and skipped;
// only the root document is fatal. Each child is visited once, so an index
// that lists itself does not loop forever.
//
// Limitation: each sitemap body is downloaded in full (response.text())
// before parsing starts. Parsing itself is streaming, but a 50 MB sitemap
// is held in memory while its entries are dispatched. The sitemaps.org
// protocol caps a single file at 50 MB / 50,000 URLs, which bounds this.
// =============================================================================

use std::collections::HashSet;

use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use url::Url;

use super::dispatch::{CrawlSummary, Dispatcher};
use super::gate::ConcurrencyGate;
use crate::error::{CrawlError, Result};
use crate::parse::{SitemapEntries, SitemapEntry, SitemapError};

/// Works out which sitemap to read for a --site value
///
/// "https://example.com" and "https://example.com/" both map to
/// "https://example.com/sitemap.xml"; a value already ending in ".xml" is
/// used as is.
pub fn sitemap_url(site: &str) -> Result<String> {
    let trimmed = site.trim_end_matches('/');
    let url = if trimmed.to_ascii_lowercase().ends_with(".xml") {
        trimmed.to_string()
    } else {
        format!("{}/sitemap.xml", trimmed)
    };

    Url::parse(&url).map_err(|source| CrawlError::InvalidUrl {
        url: url.clone(),
        source,
    })?;
    Ok(url)
}

/// Crawls every page reachable from the sitemap at `url`
///
/// Parameters:
///   client: the run's shared HTTP client (timeout already applied)
///   url: the root sitemap or sitemap index
///   concurrency: gate capacity for this site
///
/// Returns: the site's summary once every dispatched request has finished,
/// or an error if the root sitemap could not be fetched or parsed
pub async fn crawl_sitemap(client: &Client, url: &str, concurrency: usize) -> Result<CrawlSummary> {
    tracing::info!("crawling sitemap index '{}'", url);

    let body = fetch_document(client, url).await?;

    let mut walker = SitemapWalker {
        client,
        dispatcher: Dispatcher::new(client.clone(), ConcurrencyGate::new(concurrency)),
        visited: HashSet::from([url.to_string()]),
    };
    walker.walk(url, &body).await?;

    Ok(walker.dispatcher.drain().await)
}

struct SitemapWalker<'c> {
    client: &'c Client,
    dispatcher: Dispatcher,
    visited: HashSet<String>,
}

impl<'c> SitemapWalker<'c> {
    // Boxed because a sitemap index recurses into its children
    fn walk<'a>(&'a mut self, url: &'a str, xml: &'a str) -> BoxFuture<'a, Result<()>> {
        async move {
            for entry in SitemapEntries::new(xml) {
                match entry.map_err(|e| parse_error(url, e))? {
                    SitemapEntry::Page(page) => self.dispatcher.dispatch(page).await?,
                    SitemapEntry::Sitemap(child) => self.child(child).await,
                }
            }
            Ok(())
        }
        .boxed()
    }

    async fn child(&mut self, url: String) {
        if !self.visited.insert(url.clone()) {
            tracing::warn!("sitemap '{}' was already read, skipping", url);
            return;
        }

        tracing::info!("crawling nested sitemap '{}'", url);
        let body = match fetch_document(self.client, &url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("skipping nested sitemap: {}", e.chain());
                return;
            }
        };

        if let Err(e) = self.walk(&url, &body).await {
            tracing::warn!("stopped reading nested sitemap: {}", e.chain());
        }
    }
}

// Fetches a sitemap document; anything but a 2xx body is an error
async fn fetch_document(client: &Client, url: &str) -> Result<String> {
    let request_error = |source| CrawlError::Request {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(request_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Status {
            url: url.to_string(),
            status,
        });
    }

    response.text().await.map_err(request_error)
}

// Maps a parse failure onto the error for the document at `url`
fn parse_error(url: &str, error: SitemapError) -> CrawlError {
    match error {
        SitemapError::Xml(source) => CrawlError::Xml {
            url: url.to_string(),
            source,
        },
        SitemapError::NotASitemap => CrawlError::NotASitemap {
            url: url.to_string(),
        },
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why BoxFuture for walk()?
//    - An async fn that (indirectly) calls itself would have a future type
//      that contains itself, which has infinite size
//    - Boxing the future gives it a fixed size (a pointer), breaking the cycle
//    - .boxed() from futures::FutureExt does the Box::pin for us
//
// 2. Why does child() return nothing?
//    - A broken child sitemap must not stop the crawl, so its errors are
//      logged right there instead of being returned with ?
//
// 3. Why HashSet::from([url.to_string()])?
//    - The root is marked visited before we start, so an index that points
//      back at itself is read only once
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    fn urlset(locs: &[String]) -> String {
        let entries: String = locs
            .iter()
            .map(|loc| format!("<url><loc>{}</loc></url>", loc))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
            entries
        )
    }

    #[test]
    fn test_sitemap_url() {
        assert_eq!(
            sitemap_url("https://example.com").unwrap(),
            "https://example.com/sitemap.xml"
        );
        assert_eq!(
            sitemap_url("https://example.com/").unwrap(),
            "https://example.com/sitemap.xml"
        );
        assert_eq!(
            sitemap_url("https://example.com/sitemap_index.xml").unwrap(),
            "https://example.com/sitemap_index.xml"
        );
        assert!(matches!(
            sitemap_url("example.com"),
            Err(CrawlError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_single_entry_fetched_once() {
        let server = MockServer::start_async().await;
        let sitemap = server
            .mock_async(|when, then| {
                when.method(GET).path("/sitemap.xml");
                then.status(200).body(urlset(&[server.url("/a")]));
            })
            .await;
        let page = server
            .mock_async(|when, then| {
                when.method(GET).path("/a");
                then.status(200);
            })
            .await;

        let summary = crawl_sitemap(&Client::new(), &server.url("/sitemap.xml"), 1)
            .await
            .unwrap();

        sitemap.assert_async().await;
        page.assert_hits_async(1).await;
        assert_eq!(summary.dispatched, 1);
        assert_eq!(summary.succeeded, 1);
    }

    #[tokio::test]
    async fn test_follows_nested_index() {
        let server = MockServer::start_async().await;
        let index = format!(
            "<sitemapindex><sitemap><loc>{}</loc></sitemap><sitemap><loc>{}</loc></sitemap></sitemapindex>",
            server.url("/posts.xml"),
            server.url("/pages.xml")
        );
        server
            .mock_async(|when, then| {
                when.method(GET).path("/sitemap.xml");
                then.status(200).body(index);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/posts.xml");
                then.status(200).body(urlset(&[server.url("/p1"), server.url("/p2")]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/pages.xml");
                then.status(200).body(urlset(&[server.url("/about")]));
            })
            .await;
        let p1 = server
            .mock_async(|when, then| {
                when.method(GET).path("/p1");
                then.status(200);
            })
            .await;
        let p2 = server
            .mock_async(|when, then| {
                when.method(GET).path("/p2");
                then.status(200);
            })
            .await;
        let about = server
            .mock_async(|when, then| {
                when.method(GET).path("/about");
                then.status(200);
            })
            .await;

        let summary = crawl_sitemap(&Client::new(), &server.url("/sitemap.xml"), 2)
            .await
            .unwrap();

        p1.assert_hits_async(1).await;
        p2.assert_hits_async(1).await;
        about.assert_hits_async(1).await;
        assert_eq!(summary.dispatched, 3);
    }

    #[tokio::test]
    async fn test_broken_child_is_not_fatal() {
        let server = MockServer::start_async().await;
        let index = format!(
            "<sitemapindex><sitemap><loc>{}</loc></sitemap><sitemap><loc>{}</loc></sitemap><sitemap><loc>{}</loc></sitemap></sitemapindex>",
            server.url("/gone.xml"),
            server.url("/sitemap.xml"),
            server.url("/ok.xml")
        );
        let root = server
            .mock_async(|when, then| {
                when.method(GET).path("/sitemap.xml");
                then.status(200).body(index);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone.xml");
                then.status(404);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ok.xml");
                then.status(200).body(urlset(&[server.url("/kept")]));
            })
            .await;
        let kept = server
            .mock_async(|when, then| {
                when.method(GET).path("/kept");
                then.status(200);
            })
            .await;

        let summary = crawl_sitemap(&Client::new(), &server.url("/sitemap.xml"), 4)
            .await
            .unwrap();

        kept.assert_hits_async(1).await;
        // The index lists itself; the visited set stops a second read
        root.assert_hits_async(1).await;
        assert_eq!(summary.dispatched, 1);
    }

    #[tokio::test]
    async fn test_malformed_child_is_not_fatal() {
        let server = MockServer::start_async().await;
        let index = format!(
            "<sitemapindex><sitemap><loc>{}</loc></sitemap><sitemap><loc>{}</loc></sitemap></sitemapindex>",
            server.url("/broken.xml"),
            server.url("/ok.xml")
        );
        server
            .mock_async(|when, then| {
                when.method(GET).path("/sitemap.xml");
                then.status(200).body(index);
            })
            .await;
        let broken_body = format!(
            "<urlset><url><loc>{}</loc></url></sitemap>",
            server.url("/before-break")
        );
        server
            .mock_async(|when, then| {
                when.method(GET).path("/broken.xml");
                then.status(200).body(broken_body);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ok.xml");
                then.status(200).body(urlset(&[server.url("/sibling")]));
            })
            .await;
        let before_break = server
            .mock_async(|when, then| {
                when.method(GET).path("/before-break");
                then.status(200);
            })
            .await;
        let sibling = server
            .mock_async(|when, then| {
                when.method(GET).path("/sibling");
                then.status(200);
            })
            .await;

        let summary = crawl_sitemap(&Client::new(), &server.url("/sitemap.xml"), 2)
            .await
            .unwrap();

        // Entries read before the parse error are still warmed
        before_break.assert_hits_async(1).await;
        sibling.assert_hits_async(1).await;
        assert_eq!(summary.dispatched, 2);
        assert_eq!(summary.succeeded, 2);
    }

    #[tokio::test]
    async fn test_malformed_root_is_fatal() {
        let server = MockServer::start_async().await;
        let body = format!(
            "<urlset><url><loc>{}</loc></url></sitemap>",
            server.url("/a")
        );
        server
            .mock_async(|when, then| {
                when.method(GET).path("/sitemap.xml");
                then.status(200).body(body);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/a");
                then.status(200);
            })
            .await;

        let err = crawl_sitemap(&Client::new(), &server.url("/sitemap.xml"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::Xml { .. }));
    }

    #[tokio::test]
    async fn test_page_failures_are_not_fatal() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/sitemap.xml");
                then.status(200).body(urlset(&[
                    "http://127.0.0.1:1/down".to_string(),
                    server.url("/up"),
                ]));
            })
            .await;
        let up = server
            .mock_async(|when, then| {
                when.method(GET).path("/up");
                then.status(200);
            })
            .await;

        let summary = crawl_sitemap(&Client::new(), &server.url("/sitemap.xml"), 2)
            .await
            .unwrap();

        up.assert_hits_async(1).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 1);
    }

    #[tokio::test]
    async fn test_missing_root_is_fatal() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/sitemap.xml");
                then.status(404).body("<html><body>Not Found</body></html>");
            })
            .await;

        let err = crawl_sitemap(&Client::new(), &server.url("/sitemap.xml"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::Status { .. }));
    }

    #[tokio::test]
    async fn test_root_that_is_not_a_sitemap_is_fatal() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/sitemap.xml");
                then.status(200).body("<html><body>Welcome</body></html>");
            })
            .await;

        let err = crawl_sitemap(&Client::new(), &server.url("/sitemap.xml"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::NotASitemap { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_root_is_fatal() {
        let err = crawl_sitemap(&Client::new(), "http://127.0.0.1:1/sitemap.xml", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::Request { .. }));
    }
}
