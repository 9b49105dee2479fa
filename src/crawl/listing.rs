// src/crawl/listing.rs
// =============================================================================
// Reads directory index pages ("Index of /data/") served by Apache, nginx
// and friends.
//
// How it works:
// 1. Decide whether an HTML page is a directory index at all
// 2. Pull every <a href> out of it
// 3. Keep only links that point strictly below the listing itself, which
//    drops "Parent Directory", the column sort links (?C=N;O=D) and anything
//    on another host
//
// Everything here is synchronous: scraper's Html is not Send, so it must
// never be held across an .await in the walker.
// =============================================================================

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

/// One entry of a directory index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub url: Url,
    /// Sub-listing (the link ends with '/')
    pub is_dir: bool,
}

/// Whether an HTML page looks like a generated directory index.
pub fn looks_like_index(html: &str) -> bool {
    let document = Html::parse_document(html);

    // Both selectors are constants, so parsing them cannot fail.
    let heading = Selector::parse("title, h1").expect("static selector");
    let anchors = Selector::parse("a").expect("static selector");

    let titled = document
        .select(&heading)
        .any(|element| element.text().collect::<String>().trim().to_lowercase().starts_with("index of"));

    titled
        || document.select(&anchors).any(|element| {
            element.text().collect::<String>().trim().eq_ignore_ascii_case("parent directory")
        })
}

/// Extracts the entries of a directory index.
///
/// Parameters:
///   html: the index page
///   base: the listing URL, ending with '/'
///
/// Entries keep page order; duplicates (icon + name links) are dropped.
pub fn extract_index_entries(html: &str, base: &Url) -> Vec<IndexEntry> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("static selector");

    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_entry(base, href) else {
            continue;
        };

        if seen.insert(url.clone()) {
            entries.push(IndexEntry {
                is_dir: url.path().ends_with('/'),
                url,
            });
        }
    }

    entries
}

// Resolves an href and keeps it only if it lives under `base`.
fn resolve_entry(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with('?')
        || href.starts_with("mailto:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    url.set_query(None);

    let below = url.origin() == base.origin()
        && url.path().len() > base.path().len()
        && url.path().starts_with(base.path());

    below.then_some(url)
}

/// The URL a listing's relative links resolve against: the page URL with a
/// trailing '/', without query or fragment.
pub fn listing_base(url: &Url) -> Url {
    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}
