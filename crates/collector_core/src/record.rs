use serde::{Deserialize, Serialize};

/// One collected feed item.
///
/// Field names on the wire follow the collector endpoint's schema
/// (`tweet_id`, `author_username`, `url`, `collected_at`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "tweet_id")]
    pub item_id: String,
    pub content: String,
    #[serde(rename = "author_username")]
    pub author_handle: String,
    pub author_display_name: String,
    /// Source-reported timestamp, or the capture time when the item had none.
    pub created_at: String,
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(rename = "collected_at")]
    pub captured_at: String,
}

/// Records produced by one scan pass, in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Batch {
    records: Vec<Record>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.item_id.as_str())
    }
}

impl FromIterator<Record> for Batch {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
