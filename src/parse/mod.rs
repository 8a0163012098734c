// src/parse/mod.rs
// =============================================================================
// Parsers for the two kinds of documents a frontier starts from.
//
// Submodules:
// - html: compiles the CSS selector and extracts hrefs from a seed page
// - sitemap: streams <loc> entries out of sitemap.xml / sitemap indexes
//
// Neither module touches the network; the crawl module fetches the bytes
// and hands them over.
// =============================================================================

mod html;
mod sitemap;

pub use html::{compile_selector, extract_links};
pub use sitemap::{SitemapEntries, SitemapEntry, SitemapError};
