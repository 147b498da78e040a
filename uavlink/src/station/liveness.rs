//! "Waiting for mover..." announcer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::link::{ConnectionState, LinkState};

/// Default interval between liveness polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Periodically reports that the station is waiting while no mover is
/// connected.
///
/// Polling runs at startup and resumes after every disconnect; it stops as
/// soon as the link reaches `Connected`. Clones share the poll counter.
#[derive(Clone)]
pub struct LivenessWatch {
    link: Arc<LinkState>,
    poll_interval: Duration,
    polls: Arc<AtomicU64>,
}

impl LivenessWatch {
    pub fn new(link: Arc<LinkState>, poll_interval: Duration) -> Self {
        Self {
            link,
            poll_interval,
            polls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Total number of "waiting" polls so far.
    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::Relaxed)
    }

    /// Spawn the watch. It runs until `cancellation` fires.
    pub fn start(&self, cancellation: CancellationToken) -> JoinHandle<()> {
        let link = Arc::clone(&self.link);
        let polls = Arc::clone(&self.polls);
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            run(link, poll_interval, polls, cancellation).await;
        })
    }
}

async fn run(
    link: Arc<LinkState>,
    poll_interval: Duration,
    polls: Arc<AtomicU64>,
    cancellation: CancellationToken,
) {
    let mut state_rx = link.watch();

    loop {
        while *state_rx.borrow_and_update() != ConnectionState::Connected {
            polls.fetch_add(1, Ordering::Relaxed);
            info!("Waiting for mover...");

            tokio::select! {
                _ = cancellation.cancelled() => return,
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }
        info!("Mover connected");

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => return,
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if *state_rx.borrow_and_update() != ConnectionState::Connected {
                        info!("Mover disconnected");
                        break;
                    }
                }
            }
        }
    }
}
