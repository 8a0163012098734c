// src/error.rs
// =============================================================================
// Error types for the crawl engine.
//
// Only "root" failures end up here: a bad selector, a bad site URL, or a
// sitemap / seed page that could not be fetched. Failures of individual
// target fetches never become a CrawlError; the fetch worker logs them and
// the crawl moves on.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The --css3selector value could not be compiled
    #[error("invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// A site or sitemap URL could not be parsed
    #[error("invalid URL '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A site URL parsed, but it is not something we can crawl over HTTP
    #[error("unsupported URL '{url}': only http and https sites with a host can be crawled")]
    UnsupportedUrl { url: String },

    /// The shared HTTP client could not be constructed
    #[error("could not build HTTP client")]
    Client(#[source] reqwest::Error),

    /// Transport-level failure while fetching a root document
    #[error("could not fetch '{url}'")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The sitemap root answered, but not with a 2xx status
    #[error("'{url}' responded with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The sitemap XML is malformed
    #[error("could not parse sitemap '{url}'")]
    Xml {
        url: String,
        #[source]
        source: quick_xml::Error,
    },

    /// The document parsed as XML but its root is neither <urlset> nor <sitemapindex>
    #[error("'{url}' is not a sitemap (expected <urlset> or <sitemapindex>)")]
    NotASitemap { url: String },

    /// The concurrency gate was closed while a producer waited on it
    #[error("concurrency gate closed")]
    GateClosed,
}

pub type Result<T> = std::result::Result<T, CrawlError>;

impl CrawlError {
    /// The message followed by every underlying cause, "a: b: c"
    ///
    /// Used where the error is logged instead of returned to main.rs.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(e) = cause {
            message.push_str(": ");
            message.push_str(&e.to_string());
            cause = e.source();
        }
        message
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why thiserror here and anyhow in main.rs?
//    - thiserror generates Display and Error impls for our own enum, so the
//      crawl code can match on exact failure kinds (tests do this a lot)
//    - anyhow is for the binary's top level, where we only add context and
//      print the error
//
// 2. What does #[source] do?
//    - It records the underlying error (reqwest, quick-xml, url) as the
//      "cause" of ours
//    - The message above each variant leaves the cause out on purpose:
//      printing with {:#} walks the cause chain and prints each error once
// -----------------------------------------------------------------------------
