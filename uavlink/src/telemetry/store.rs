//! Single-slot, thread-safe holder of the latest position sample.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::position::PositionSample;

/// The latest sample and when the station received it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub sample: PositionSample,
    pub received_at: DateTime<Utc>,
}

/// Latest-sample store shared by the ingestion path and status readers.
///
/// Records are replaced whole under a write lock, so a reader sees either the
/// previous record or the new one, never a mix of the two.
#[derive(Debug, Default)]
pub struct TelemetryStore {
    record: RwLock<Option<TelemetryRecord>>,
    updates: AtomicU64,
}

impl TelemetryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored record with `sample` stamped with the current time.
    ///
    /// Timestamps never go backwards: if the wall clock steps back, the new
    /// record reuses the previous timestamp.
    pub fn update(&self, sample: PositionSample) -> TelemetryRecord {
        let mut slot = self.record.write().unwrap_or_else(|e| e.into_inner());

        let now = Utc::now();
        let received_at = match slot.as_ref() {
            Some(previous) if previous.received_at > now => previous.received_at,
            _ => now,
        };

        let record = TelemetryRecord {
            sample,
            received_at,
        };
        *slot = Some(record);
        self.updates.fetch_add(1, Ordering::Relaxed);
        record
    }

    /// The latest record, or `None` before the first update.
    pub fn read(&self) -> Option<TelemetryRecord> {
        *self.record.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of updates since startup.
    pub fn update_count(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }
}
