// src/parse/sitemap.rs
// =============================================================================
// This module reads sitemap.xml documents.
//
// Two document kinds exist (https://www.sitemaps.org/protocol.html):
//
//   <urlset>                          <sitemapindex>
//     <url><loc>page</loc></url>        <sitemap><loc>child.xml</loc></sitemap>
//   </urlset>                         </sitemapindex>
//
// We use `quick-xml`, a pull parser: the document is read one event at a
// time and SitemapEntries hands out each <loc> as soon as its closing tag is
// seen. The crawler can therefore start dispatching the first pages while the
// rest of a large sitemap is still unparsed.
//
// Rust concepts:
// - Iterator: implementing next() gives us for loops, map, collect, ...
// - Lifetimes: the iterator borrows the document text ('a)
// =============================================================================

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// One <loc> found in a sitemap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapEntry {
    /// A page from a <urlset>
    Page(String),
    /// A child sitemap from a <sitemapindex>
    Sitemap(String),
}

/// Why a document could not be read
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error("root element is neither <urlset> nor <sitemapindex>")]
    NotASitemap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    Url,
    Sitemap,
}

/// Streams the entries of one sitemap document
pub struct SitemapEntries<'a> {
    reader: Reader<&'a [u8]>,
    saw_root: bool,
    // Depth of the element currently open, root = 1
    depth: usize,
    parent: Option<Parent>,
    in_loc: bool,
    loc: String,
    done: bool,
}

impl<'a> SitemapEntries<'a> {
    pub fn new(xml: &'a str) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        Self {
            reader,
            saw_root: false,
            depth: 0,
            parent: None,
            in_loc: false,
            loc: String::new(),
            done: false,
        }
    }

    fn next_entry(&mut self) -> Result<Option<SitemapEntry>, SitemapError> {
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => {
                    self.depth += 1;
                    let name = e.local_name();
                    if !self.saw_root {
                        match name.as_ref() {
                            b"urlset" | b"sitemapindex" => self.saw_root = true,
                            _ => return Err(SitemapError::NotASitemap),
                        }
                        continue;
                    }
                    // <url>/<sitemap> sit at depth 2, their own <loc> at depth 3;
                    // deeper <loc>s belong to extensions such as <image:image>
                    match (name.as_ref(), self.depth) {
                        (b"url", 2) => self.parent = Some(Parent::Url),
                        (b"sitemap", 2) => self.parent = Some(Parent::Sitemap),
                        (b"loc", 3) if self.parent.is_some() => {
                            self.in_loc = true;
                            self.loc.clear();
                        }
                        _ => {}
                    }
                }
                Event::Text(text) if self.in_loc => {
                    self.loc.push_str(&text.unescape()?);
                }
                Event::CData(data) if self.in_loc => {
                    self.loc.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
                Event::End(e) => {
                    let depth = self.depth;
                    self.depth = self.depth.saturating_sub(1);
                    match (e.local_name().as_ref(), depth) {
                        (b"loc", 3) => self.in_loc = false,
                        (b"url", 2) | (b"sitemap", 2) => {
                            let parent = self.parent.take();
                            let loc = std::mem::take(&mut self.loc);
                            let loc = loc.trim();
                            if loc.is_empty() {
                                continue;
                            }
                            return Ok(match parent {
                                Some(Parent::Sitemap) => {
                                    Some(SitemapEntry::Sitemap(loc.to_string()))
                                }
                                _ => Some(SitemapEntry::Page(loc.to_string())),
                            });
                        }
                        _ => {}
                    }
                }
                // <urlset/> with no children is a valid empty sitemap
                Event::Empty(e) if !self.saw_root => match e.local_name().as_ref() {
                    b"urlset" | b"sitemapindex" => self.saw_root = true,
                    _ => return Err(SitemapError::NotASitemap),
                },
                Event::Eof => {
                    if !self.saw_root {
                        return Err(SitemapError::NotASitemap);
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }
}

impl Iterator for SitemapEntries<'_> {
    type Item = Result<SitemapEntry, SitemapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                // A broken document yields its error once, then ends
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
