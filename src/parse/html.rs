// src/parse/html.rs
// =============================================================================
// This module pulls link references out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// The operator picks the selector (--css3selector, default "a"), so unlike a
// hard-coded "a[href]" it can fail to compile. That is checked once, up
// front, before any request is made.
//
// Rust concepts:
// - Result<T, E>: For operations that can fail
// - Iterators: filter_map to keep only elements that carry an href
// =============================================================================

use scraper::{Html, Selector};

use crate::error::{CrawlError, Result};

/// Compiles the operator's CSS selector
pub fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| CrawlError::InvalidSelector {
        selector: selector.to_string(),
        // Some of scraper's messages contain line breaks; keep the error on one line
        reason: e.to_string().split_whitespace().collect::<Vec<_>>().join(" "),
    })
}

/// Returns the raw href of every element matching `selector`, in document order
///
/// Values are returned as written (relative or absolute); resolving them is
/// the crawler's job. Elements without an href are ignored.
pub fn extract_links(html: &str, selector: &Selector) -> Vec<String> {
    // Parse the HTML into a document
    let document = Html::parse_document(html);

    document
        .select(selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why return Vec<String> instead of an iterator?
//    - scraper's Html is not Send, so it must not live across an .await
//    - Collecting the hrefs lets the document be dropped before the crawler
//      starts awaiting on the concurrency gate
//
// 2. What does .value() do?
//    - element is an ElementRef (reference to an HTML element)
//    - .value() gets the underlying Element
//    - .attr("href") gets the value of the href attribute
// -----------------------------------------------------------------------------
