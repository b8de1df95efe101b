use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use collector_core::Record;
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::RenderedItem;

/// Produces the capture timestamp (ISO-8601).
pub type CaptureClock = Arc<dyn Fn() -> String + Send + Sync>;

pub fn utc_now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("invalid base url {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

/// Where the interesting nodes live inside one rendered item.
/// Defaults follow the X/Twitter timeline markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSelectors {
    pub permalink: String,
    pub body: String,
    pub author: String,
    pub author_link: String,
    pub display_name: String,
    pub timestamp: String,
    /// Path token preceding the item id in a permalink.
    pub id_marker: String,
    /// Base for resolving relative permalinks.
    pub base_url: String,
}

impl Default for FeedSelectors {
    fn default() -> Self {
        Self {
            permalink: r#"a[href*="/status/"]"#.to_string(),
            body: r#"[data-testid="tweetText"]"#.to_string(),
            author: r#"[data-testid="User-Name"]"#.to_string(),
            author_link: r#"a[href^="/"]"#.to_string(),
            display_name: "span".to_string(),
            timestamp: "time".to_string(),
            id_marker: "/status/".to_string(),
            base_url: "https://x.com".to_string(),
        }
    }
}

pub trait Extractor: Send + Sync {
    /// `None` means the item is unusable (ad, partial render, ...).
    fn extract(&self, item: &RenderedItem) -> Option<Record>;
}

pub struct FeedItemExtractor {
    permalink: Selector,
    body: Selector,
    author: Selector,
    author_link: Selector,
    display_name: Selector,
    timestamp: Selector,
    id_marker: String,
    base_url: Url,
    clock: CaptureClock,
}

impl FeedItemExtractor {
    pub fn new(selectors: &FeedSelectors) -> Result<Self, SelectorError> {
        Self::with_clock(selectors, Arc::new(utc_now_iso))
    }

    pub fn with_clock(selectors: &FeedSelectors, clock: CaptureClock) -> Result<Self, SelectorError> {
        let base_url = Url::parse(&selectors.base_url).map_err(|err| SelectorError::InvalidBaseUrl {
            url: selectors.base_url.clone(),
            message: err.to_string(),
        })?;
        Ok(Self {
            permalink: parse_selector(&selectors.permalink)?,
            body: parse_selector(&selectors.body)?,
            author: parse_selector(&selectors.author)?,
            author_link: parse_selector(&selectors.author_link)?,
            display_name: parse_selector(&selectors.display_name)?,
            timestamp: parse_selector(&selectors.timestamp)?,
            id_marker: selectors.id_marker.clone(),
            base_url,
            clock,
        })
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|err| SelectorError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

impl Extractor for FeedItemExtractor {
    fn extract(&self, item: &RenderedItem) -> Option<Record> {
        let fragment = Html::parse_fragment(&item.html);
        let root = fragment.root_element();

        let source_url = root
            .select(&self.permalink)
            .filter_map(|link| link.value().attr("href"))
            .find_map(|href| self.base_url.join(href).ok())?;
        let item_id = item_id_from_permalink(source_url.as_str(), &self.id_marker)?;

        let body = root.select(&self.body).next()?;
        let content = inner_text(body);

        let author = root.select(&self.author).next()?;
        let author_handle = author
            .select(&self.author_link)
            .next()
            .and_then(|link| link.value().attr("href"))
            .and_then(last_path_segment)
            .unwrap_or("unknown")
            .to_string();
        let author_display_name = author
            .select(&self.display_name)
            .next()
            .map(inner_text)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| author_handle.clone());

        let captured_at = (self.clock)();
        let created_at = root
            .select(&self.timestamp)
            .find_map(|time| time.value().attr("datetime"))
            .map(str::trim)
            .filter(|stamp| !stamp.is_empty())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| captured_at.clone());

        Some(Record {
            item_id: item_id.to_string(),
            content,
            author_handle,
            author_display_name,
            created_at,
            source_url: source_url.to_string(),
            captured_at,
        })
    }
}

/// The id is the path segment right after `marker`, without query or fragment.
pub fn item_id_from_permalink<'a>(url: &'a str, marker: &str) -> Option<&'a str> {
    let (_, rest) = url.split_once(marker)?;
    let id = rest.split(['/', '?', '#']).next()?;
    (!id.is_empty()).then_some(id)
}

fn last_path_segment(href: &str) -> Option<&str> {
    let path = href.split(['?', '#']).next()?;
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}

/// Text as a browser's `innerText` would roughly give it: text nodes in
/// document order, `<br>` as a newline.
fn inner_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(*element, &mut out);
    out
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) if element.name().eq_ignore_ascii_case("br") => out.push('\n'),
            Node::Element(_) => collect_text(child, out),
            _ => {}
        }
    }
}
