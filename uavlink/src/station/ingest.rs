//! Inbound frame handling.

use tracing::{debug, warn};

use crate::link::LinkMessage;
use crate::telemetry::{TelemetryRecord, TelemetryStore};

/// Decode one text frame and record it.
///
/// Returns the stored record, or `None` if the frame was malformed and
/// discarded.
pub fn handle_frame(text: &str, store: &TelemetryStore) -> Option<TelemetryRecord> {
    match LinkMessage::decode(text) {
        Ok(LinkMessage::PositionUpdate(sample)) => {
            let record = store.update(sample);
            debug!(position = %sample, "Received position update");
            Some(record)
        }
        Err(e) => {
            warn!(error = %e, "Discarding malformed frame");
            None
        }
    }
}
