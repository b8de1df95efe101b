use collector_core::{is_relevant, Batch, Config, SeenSet};
use collector_logging::{collector_debug, collector_trace, current_scan_pass, set_scan_pass};

use crate::extract::Extractor;
use crate::view::{FeedView, ViewError};
use crate::{RenderedItem, ScanStats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub batch: Batch,
    pub stats: ScanStats,
}

/// Runs extract -> dedup -> relevance over the rendered view.
///
/// An id enters the seen set as soon as it is extracted, before the
/// relevance check. Items judged irrelevant are therefore never looked at
/// again, even if the keyword or account lists change later.
pub struct Scanner {
    extractor: Box<dyn Extractor>,
    seen: SeenSet,
    passes: u64,
}

impl Scanner {
    pub fn new(extractor: Box<dyn Extractor>) -> Self {
        Self {
            extractor,
            seen: SeenSet::new(),
            passes: 0,
        }
    }

    pub fn scan(&mut self, view: &dyn FeedView, config: &Config) -> Result<ScanOutcome, ViewError> {
        let items = view.rendered_items()?;
        Ok(self.scan_items(&items, config))
    }

    pub fn scan_items(&mut self, items: &[RenderedItem], config: &Config) -> ScanOutcome {
        self.passes += 1;
        set_scan_pass(self.passes);

        let mut stats = ScanStats {
            pass: self.passes,
            rendered: items.len(),
            ..ScanStats::default()
        };
        let mut batch = Batch::new();

        for item in items {
            let Some(record) = self.extractor.extract(item) else {
                stats.unusable += 1;
                continue;
            };
            if !self.seen.insert(record.item_id.as_str()) {
                stats.already_seen += 1;
                continue;
            }
            if !is_relevant(&record, config) {
                stats.irrelevant += 1;
                continue;
            }
            collector_trace!(
                "pass={} collected item_id={}",
                current_scan_pass(),
                record.item_id
            );
            batch.push(record);
        }

        stats.collected = batch.len();
        collector_debug!(
            "pass={} rendered={} unusable={} seen={} irrelevant={} collected={} seen_total={}",
            stats.pass,
            stats.rendered,
            stats.unusable,
            stats.already_seen,
            stats.irrelevant,
            stats.collected,
            self.seen.len()
        );
        ScanOutcome { batch, stats }
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }
}
