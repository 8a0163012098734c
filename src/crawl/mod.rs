// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// Pieces, from the bottom up:
// - resolve: turns hrefs into absolute URLs and checks they stay on-site
// - worker: one timed GET, one log line
// - gate: caps how many workers run at once
// - dispatch: acquires a gate token, spawns a worker, drains them at the end
// - sitemap / links: the two frontiers that feed URLs into dispatch
//
// Both crawl functions return only after every request they started has
// finished, so sites crawled one after another never overlap.
// =============================================================================

mod dispatch;
mod gate;
mod links;
mod resolve;
mod sitemap;
mod worker;

pub use dispatch::CrawlSummary;
pub use links::crawl_links;
pub use sitemap::{crawl_sitemap, sitemap_url};
