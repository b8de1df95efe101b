#![allow(dead_code)]

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use collector_core::{Record, StoredSettings};
use collector_engine::{
    AgentEvent, CaptureClock, EventSink, FeedItemExtractor, FeedSelectors, FeedView,
    RenderedItem, StaticView, SubmitError, SubmitFailure, Transport, ViewError,
};

pub const CAPTURED_AT: &str = "2024-05-01T12:00:00.000Z";

pub fn tweet_html(id: &str, handle: &str, display: &str, text: &str, datetime: Option<&str>) -> String {
    let time = datetime
        .map(|dt| format!(r#"<time datetime="{dt}">2h</time>"#))
        .unwrap_or_default();
    format!(
        r#"<article data-testid="tweet">
  <div data-testid="User-Name">
    <a href="/{handle}"><span>{display}</span></a>
    <a href="/{handle}/status/{id}">{time}</a>
  </div>
  <div data-testid="tweetText"><span>{text}</span></div>
</article>"#
    )
}

pub fn item(id: &str, text: &str) -> RenderedItem {
    RenderedItem::new(tweet_html(
        id,
        "alice",
        "Alice",
        text,
        Some("2024-05-01T10:00:00.000Z"),
    ))
}

pub fn fixed_clock() -> CaptureClock {
    Arc::new(|| CAPTURED_AT.to_string())
}

pub fn extractor() -> FeedItemExtractor {
    FeedItemExtractor::with_clock(&FeedSelectors::default(), fixed_clock()).unwrap()
}

pub fn settings(keywords: &[&str], accounts: &[&str], enabled: bool) -> StoredSettings {
    StoredSettings {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        monitored_accounts: accounts.iter().map(|a| a.to_string()).collect(),
        enabled,
        ..StoredSettings::default()
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AgentEvent>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<AgentEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: AgentEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Records every batch instead of touching the network.
#[derive(Default)]
pub struct FakeTransport {
    pub batches: Mutex<Vec<Vec<String>>>,
    pub calls: AtomicUsize,
    pub fail_with: Option<SubmitFailure>,
    pub delay: Option<Duration>,
}

impl FakeTransport {
    pub fn failing(kind: SubmitFailure) -> Self {
        Self {
            fail_with: Some(kind),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent_ids(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn post_batch(
        &self,
        _endpoint: &str,
        records: &[Record],
    ) -> Result<serde_json::Value, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(kind) = &self.fail_with {
            return Err(SubmitError {
                kind: kind.clone(),
                message: "fake failure".to_string(),
            });
        }
        self.batches
            .lock()
            .unwrap()
            .push(records.iter().map(|r| r.item_id.clone()).collect());
        Ok(serde_json::json!({ "success": true, "count": records.len() }))
    }

    async fn health(&self, _endpoint: &str) -> Result<serde_json::Value, SubmitError> {
        Ok(serde_json::json!({ "status": "healthy" }))
    }
}

/// In-memory view that can be told to fail, like a snapshot that vanished.
#[derive(Default)]
pub struct SwitchableView {
    items: StaticView,
    failing: AtomicBool,
}

impl SwitchableView {
    pub fn new(items: Vec<RenderedItem>) -> Self {
        Self {
            items: StaticView::new(items),
            failing: AtomicBool::new(false),
        }
    }

    pub fn replace(&self, items: Vec<RenderedItem>) {
        self.items.replace(items);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl FeedView for SwitchableView {
    fn rendered_items(&self) -> Result<Vec<RenderedItem>, ViewError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ViewError::Read {
                path: PathBuf::from("feed.html"),
                source: io::Error::new(io::ErrorKind::NotFound, "snapshot missing"),
            });
        }
        self.items.rendered_items()
    }
}
