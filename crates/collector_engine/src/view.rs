use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use collector_logging::collector_debug;
use scraper::{Html, Selector};

use crate::decode::{decode_html, DecodeError};
use crate::extract::{parse_selector, SelectorError};
use crate::RenderedItem;

pub const DEFAULT_ITEM_SELECTOR: &str = r#"article[data-testid="tweet"]"#;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("cannot read snapshot {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

/// Source of the currently rendered feed items.
pub trait FeedView: Send + Sync {
    fn rendered_items(&self) -> Result<Vec<RenderedItem>, ViewError>;
}

/// Splits a full page into its rendered items.
pub struct PageSplitter {
    item: Selector,
}

impl PageSplitter {
    pub fn new(item_selector: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            item: parse_selector(item_selector)?,
        })
    }

    pub fn split(&self, page_html: &str) -> Vec<RenderedItem> {
        let document = Html::parse_document(page_html);
        document
            .select(&self.item)
            .map(|item| RenderedItem::new(item.html()))
            .collect()
    }
}

/// Reads an HTML snapshot of the feed page on every enumeration.
///
/// A browser-side exporter keeps the file in sync with what is on screen,
/// so each scan sees the view as it is at that moment.
pub struct SnapshotFileView {
    path: PathBuf,
    splitter: PageSplitter,
}

impl SnapshotFileView {
    pub fn new(path: impl Into<PathBuf>, item_selector: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            path: path.into(),
            splitter: PageSplitter::new(item_selector)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedView for SnapshotFileView {
    fn rendered_items(&self) -> Result<Vec<RenderedItem>, ViewError> {
        let bytes = fs::read(&self.path).map_err(|source| ViewError::Read {
            path: self.path.clone(),
            source,
        })?;
        let decoded = decode_html(&bytes).map_err(|source| ViewError::Decode {
            path: self.path.clone(),
            source,
        })?;
        let items = self.splitter.split(&decoded.html);
        collector_debug!(
            "Snapshot {:?}: {} item(s), decoded as {}",
            self.path,
            items.len(),
            decoded.encoding_label
        );
        Ok(items)
    }
}

/// In-memory view whose contents can be swapped between scans.
#[derive(Default)]
pub struct StaticView {
    items: Mutex<Vec<RenderedItem>>,
}

impl StaticView {
    pub fn new(items: Vec<RenderedItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    pub fn replace(&self, items: Vec<RenderedItem>) {
        if let Ok(mut guard) = self.items.lock() {
            *guard = items;
        }
    }
}

impl FeedView for StaticView {
    fn rendered_items(&self) -> Result<Vec<RenderedItem>, ViewError> {
        Ok(self
            .items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default())
    }
}
