// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is a single action: crawl every --site in order, using one mode for
// all of them. Flags mirror the crawler's knobs:
//   --mode          sitemap | links
//   --site          repeatable site root
//   --css3selector  which elements to take links from (links mode)
//   --concurrency   how many requests may be in flight at once
//   --timeout       per-request timeout in seconds
//
// Rust concepts:
// - Derive macros: clap generates the parser from the struct
// - ValueEnum: clap turns an enum into a fixed set of accepted values
// =============================================================================

use clap::{Parser, ValueEnum};
use tokio::sync::Semaphore;

use crate::config::DEFAULT_USER_AGENT;

#[derive(Parser, Debug)]
#[command(
    name = "cache-warmer",
    version,
    about = "Crawl URLs so they can be pre-cached",
    long_about = "cache-warmer discovers the pages of a site, either from its sitemap.xml or from \
                  the links on its start page, and requests each one so that CDN and application \
                  caches are warm. Response times are logged for every request."
)]
pub struct Cli {
    /// The mode for crawling
    #[arg(short = 'm', long, value_enum, default_value_t = Mode::Sitemap)]
    pub mode: Mode,

    /// The site to crawl (repeat the flag to crawl several sites in order)
    ///
    /// In sitemap mode <site>/sitemap.xml is read, unless the value already
    /// points at an .xml file.
    #[arg(short = 's', long = "site", value_name = "URL", required = true)]
    pub sites: Vec<String>,

    /// The CSS3 selector used to find links on the start page (links mode)
    #[arg(short = 'c', long, default_value = "a")]
    pub css3selector: String,

    /// Number of requests allowed in flight at the same time
    #[arg(short = 'n', long, default_value_t = 10, value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Request timeout in seconds
    #[arg(
        short = 't',
        long,
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

// Parses --concurrency
//
// Returns: the gate capacity, or a message clap prints as a usage error
//
// A gate with zero slots would never admit a request, and tokio's semaphore
// cannot hold more than Semaphore::MAX_PERMITS
fn parse_concurrency(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) if n > Semaphore::MAX_PERMITS => Err(format!(
            "concurrency must be at most {}",
            Semaphore::MAX_PERMITS
        )),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Where the list of URLs to warm comes from
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Read <site>/sitemap.xml, following nested sitemap indexes
    Sitemap,
    /// Fetch the site's start page and follow the links matching --css3selector
    Links,
}
