// src/crawl/walker.rs
// =============================================================================
// Walks a remote location and builds the crawl tree.
//
// How it works:
// 1. GET the starting URL
// 2. If it is a directory index, read its entries; otherwise it is a file
// 3. Sub-listings are fetched and read the same way, down to max_depth
// 4. Plain entries are probed with HEAD (no body is downloaded) and sniffed
//    from their name and Content-Type
//
// Children of one listing are probed concurrently, but `buffered` keeps
// them in page order so the tree matches the listing exactly.
//
// Recursion goes strictly downwards (an entry must live below its listing),
// so there is no need for a visited set.
// =============================================================================

use std::time::Duration;

use anyhow::{anyhow, Result};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Response};
use tracing::{debug, info, warn};
use url::Url;

use super::listing::{extract_index_entries, listing_base, looks_like_index, IndexEntry};
use super::sniff::{file_name_from_disposition, sniff_file_types};
use crate::config::CrawlConfig;
use crate::tree::{last_segment, FileNode, Listing, Node};

/// Crawls `start_url` into a tree.
///
/// Fails only if the starting URL itself cannot be fetched; problems with
/// individual children are logged and the child is kept with what is known
/// about it.
pub async fn crawl(start_url: &str, config: &CrawlConfig) -> Result<Node> {
    let start = Url::parse(start_url)
        .map_err(|e| anyhow!("Invalid URL '{}': {}", start_url, e))?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;

    let walker = Walker { client, config };

    info!(url = %start, max_depth = config.max_depth, "starting crawl");
    let page = walker.get(&start).await?;
    Ok(walker.node_from_page(page, 1).await)
}

struct Walker<'c> {
    client: Client,
    config: &'c CrawlConfig,
}

// What a GET told us. The body is only read for HTML responses.
struct Page {
    url: Url,
    content_type: Option<String>,
    disposition: Option<String>,
    html: Option<String>,
}

impl<'c> Walker<'c> {
    async fn get(&self, url: &Url) -> Result<Page> {
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP {}", response.status()));
        }

        let (url, content_type, disposition) = describe(&response);
        let is_html = content_type
            .as_deref()
            .map(|ct| ct.to_lowercase().starts_with("text/html"))
            .unwrap_or(false);

        let html = if is_html {
            Some(response.text().await?)
        } else {
            None
        };

        Ok(Page {
            url,
            content_type,
            disposition,
            html,
        })
    }

    async fn head(&self, url: &Url) -> Result<FileNode> {
        let response = self.client.head(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP {}", response.status()));
        }

        let (url, content_type, disposition) = describe(&response);
        Ok(file_node(&url, content_type.as_deref(), disposition.as_deref()))
    }

    // Turns a fetched page into a listing (if it is an index) or a file.
    async fn node_from_page(&self, page: Page, depth: usize) -> Node {
        let entries = match page.html.as_deref() {
            Some(html) if looks_like_index(html) => {
                let base = listing_base(&page.url);
                let entries = extract_index_entries(html, &base);
                Some((base, entries))
            }
            _ => None,
        };

        match entries {
            Some((base, entries)) => self.read_listing(base, entries, depth).await,
            None => Node::File(file_node(
                &page.url,
                page.content_type.as_deref(),
                page.disposition.as_deref(),
            )),
        }
    }

    async fn read_listing(&self, base: Url, entries: Vec<IndexEntry>, depth: usize) -> Node {
        info!(url = %base, depth, entries = entries.len(), "reading listing");

        if self.config.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
        }

        let children: Vec<Node> = stream::iter(entries)
            .map(|entry| self.visit(entry, depth))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        Node::Listing(Listing {
            url: base.to_string(),
            children,
        })
    }

    // Boxed because sub-listings recurse back into read_listing.
    fn visit(&self, entry: IndexEntry, depth: usize) -> BoxFuture<'_, Node> {
        async move {
            if entry.is_dir {
                self.visit_dir(entry.url, depth).await
            } else {
                self.visit_file(entry.url).await
            }
        }
        .boxed()
    }

    async fn visit_dir(&self, url: Url, depth: usize) -> Node {
        let empty = |url: &Url| {
            Node::Listing(Listing {
                url: url.to_string(),
                children: Vec::new(),
            })
        };

        if depth >= self.config.max_depth {
            debug!(url = %url, depth, "max depth reached, not descending");
            return empty(&url);
        }

        match self.get(&url).await {
            Ok(page) => self.node_from_page(page, depth + 1).await,
            Err(e) => {
                warn!(url = %url, error = %e, "failed to fetch sub-listing");
                empty(&url)
            }
        }
    }

    async fn visit_file(&self, url: Url) -> Node {
        match self.head(&url).await {
            Ok(file) => Node::File(file),
            Err(e) => {
                warn!(url = %url, error = %e, "failed to probe file, sniffing from name only");
                Node::File(file_node(&url, None, None))
            }
        }
    }
}

// Final URL and the headers sniffing cares about.
fn describe(response: &Response) -> (Url, Option<String>, Option<String>) {
    let header = |name: HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    (
        response.url().clone(),
        header(CONTENT_TYPE),
        header(CONTENT_DISPOSITION),
    )
}

/// Builds a file node from what is known about a remote file.
pub(crate) fn file_node(url: &Url, content_type: Option<&str>, disposition: Option<&str>) -> FileNode {
    let file_name = disposition
        .and_then(file_name_from_disposition)
        .unwrap_or_else(|| last_segment(url.as_str()));
    let file_types = sniff_file_types(&file_name, content_type);

    FileNode::new(url.to_string(), Some(file_name), file_types)
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. buffered vs buffer_unordered
//    - Both run up to N futures at once
//    - buffered yields results in the order the futures were created, which
//      is what keeps children in listing order
//
// 2. Why BoxFuture for visit()?
//    - An async fn that (indirectly) awaits itself would have an infinitely
//      sized future type
//    - Boxing the recursive step gives it a fixed size
//
// 3. HEAD for files
//    - Only headers are needed for sniffing, so file bodies are never
//      downloaded
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_node_from_url() {
        let url = Url::parse("https://example.com/data/dem.tif").unwrap();
        let node = file_node(&url, Some("image/tiff"), None);
        assert_eq!(node.file_name.as_deref(), Some("dem.tif"));
        assert_eq!(node.file_types.len(), 1);
        assert_eq!(node.file_types[0].ext, "tiff");
    }

    #[test]
    fn test_file_node_prefers_disposition_name() {
        let url = Url::parse("https://example.com/download?id=42").unwrap();
        let node = file_node(&url, None, Some(r#"attachment; filename="roads.shp""#));
        assert_eq!(node.file_name.as_deref(), Some("roads.shp"));
        assert_eq!(node.base_name(), "roads");
    }

    #[tokio::test]
    async fn test_invalid_start_url() {
        let err = crawl("not a url", &CrawlConfig::default()).await.unwrap_err();
        assert!(err.to_string().contains("Invalid URL"));
    }
}
