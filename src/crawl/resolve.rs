// src/crawl/resolve.rs
// =============================================================================
// Turns the href values found on a page into absolute URLs and decides
// whether each one belongs to the site we are warming.
//
// Rules:
// - "https://..." / "http://..." is already absolute and is kept as written.
//   It is in scope only when scheme, host and port match the origin.
// - "//host/path" borrows the origin's scheme, then is checked like above.
// - Anything else is a path on the origin: we make sure it starts with one
//   "/" and append it to the origin string. Those are always in scope.
// - Empty hrefs, "#fragment" and other schemes (mailto:, javascript:, tel:,
//   data:, ...) are not crawlable at all and resolve to None.
//
// Comparing parsed origins (instead of "starts with the site string") means
// "https://example.com:8443" is not mistaken for "https://example.com", and
// a trailing "/" on the site argument does not matter.
// =============================================================================

use url::Url;

use crate::error::{CrawlError, Result};

/// The site boundary for one crawl: the operator's root string plus its
/// parsed scheme/host/port
#[derive(Debug, Clone)]
pub struct Origin {
    // Root as given, minus any trailing '/', used for concatenation
    root: String,
    parsed: Url,
}

/// A reference after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub url: String,
    pub in_scope: bool,
}

impl Origin {
    pub fn parse(root: &str) -> Result<Self> {
        let parsed = Url::parse(root).map_err(|source| CrawlError::InvalidUrl {
            url: root.to_string(),
            source,
        })?;

        if !is_http(&parsed) || parsed.host_str().is_none() {
            return Err(CrawlError::UnsupportedUrl {
                url: root.to_string(),
            });
        }

        Ok(Self {
            root: root.trim_end_matches('/').to_string(),
            parsed,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.root
    }

    /// Resolves `reference` against this origin
    ///
    /// Returns None for references that can never be fetched over HTTP.
    pub fn resolve(&self, reference: &str) -> Option<Resolved> {
        let reference = reference.trim();
        if reference.is_empty() || reference.starts_with('#') {
            return None;
        }

        // Protocol-relative: "//cdn.example.com/x"
        if let Some(rest) = reference.strip_prefix("//") {
            let url = format!("{}://{}", self.parsed.scheme(), rest);
            return self.absolute(url);
        }

        match Url::parse(reference) {
            Ok(parsed) if is_http(&parsed) => Some(Resolved {
                in_scope: self.same_origin(&parsed),
                url: reference.to_string(),
            }),
            // Some other scheme: mailto:, javascript:, ...
            Ok(_) => None,
            Err(url::ParseError::RelativeUrlWithoutBase) => Some(self.relative(reference)),
            Err(_) => None,
        }
    }

    fn absolute(&self, url: String) -> Option<Resolved> {
        let parsed = Url::parse(&url).ok()?;
        if !is_http(&parsed) {
            return None;
        }
        Some(Resolved {
            in_scope: self.same_origin(&parsed),
            url,
        })
    }

    fn relative(&self, path: &str) -> Resolved {
        let url = if path.starts_with('/') {
            format!("{}{}", self.root, path)
        } else {
            format!("{}/{}", self.root, path)
        };
        Resolved { url, in_scope: true }
    }

    fn same_origin(&self, other: &Url) -> bool {
        // port_or_known_default makes "https://a" and "https://a:443" equal
        self.parsed.scheme() == other.scheme()
            && self.parsed.host_str() == other.host_str()
            && self.parsed.port_or_known_default() == other.port_or_known_default()
    }
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why keep the string AND the parsed Url?
//    - The string is what relative paths are glued onto, so the result looks
//      exactly like the site the operator typed
//    - The parsed Url is what we compare origins with
//
// 2. What is port_or_known_default()?
//    - port() is None when the URL uses the scheme's default port
//    - port_or_known_default() fills in 80 / 443, so "https://a" and
//      "https://a:443" compare equal
//
// 3. Why does Url::parse("/docs") fail?
//    - A URL without a scheme needs a base to be resolved against
//    - The RelativeUrlWithoutBase error is exactly how we detect a relative
//      reference
// -----------------------------------------------------------------------------
