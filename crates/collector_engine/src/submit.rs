use std::sync::Arc;

use collector_core::Batch;
use collector_logging::{collector_debug, collector_info, collector_warn};

use crate::events::EventSink;
use crate::store::ConfigStore;
use crate::transport::Transport;
use crate::{Accepted, SubmitError};

/// Ships a batch once, then reports the outcome.
///
/// Delivery is at-most-once: a failed batch is dropped, never retried or
/// re-queued, and its ids stay in the seen set.
pub struct Submitter {
    transport: Arc<dyn Transport>,
    counter: Arc<dyn ConfigStore>,
    sink: Arc<dyn EventSink>,
}

impl Submitter {
    pub fn new(
        transport: Arc<dyn Transport>,
        counter: Arc<dyn ConfigStore>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            transport,
            counter,
            sink,
        }
    }

    pub async fn submit(&self, endpoint: &str, batch: &Batch) -> Result<Accepted, SubmitError> {
        if batch.is_empty() {
            return Ok(Accepted { accepted: 0 });
        }

        let count = batch.len();
        collector_info!("Sending {} item(s) to {}", count, endpoint);
        match self.transport.post_batch(endpoint, batch.records()).await {
            Ok(reply) => {
                collector_debug!("Collector reply: {}", reply);
                // Counter writes are fire-and-forget.
                if let Err(err) = self.counter.add_collected(count as u64) {
                    collector_warn!("Failed to update collected count: {}", err);
                }
                self.sink.on_collected(count);
                Ok(Accepted { accepted: count })
            }
            Err(err) => {
                collector_warn!("Dropping batch of {} item(s): {}", count, err);
                self.sink.on_error(&err.to_string());
                Err(err)
            }
        }
    }
}
