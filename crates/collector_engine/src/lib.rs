//! Collector engine: extraction, scanning, submission and the agent driver.
mod agent;
mod decode;
mod events;
mod extract;
mod scan;
mod store;
mod submit;
mod transport;
mod types;
mod view;

pub use agent::{Agent, AgentError, AgentHandle, AgentParts, AgentSettings};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use events::{AgentEvent, EventSink, LogEventSink};
pub use extract::{
    item_id_from_permalink, utc_now_iso, CaptureClock, Extractor, FeedItemExtractor,
    FeedSelectors, SelectorError,
};
pub use scan::{ScanOutcome, Scanner};
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore, StoreError};
pub use submit::Submitter;
pub use transport::{ReqwestTransport, Transport, TransportSettings, COLLECT_PATH, HEALTH_PATH};
pub use types::{Accepted, RenderedItem, ScanAck, ScanStats, SubmitError, SubmitFailure};
pub use view::{
    FeedView, PageSplitter, SnapshotFileView, StaticView, ViewError, DEFAULT_ITEM_SELECTOR,
};
