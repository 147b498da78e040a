//! Motion supervisor and motion loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::MotionConfig;
use super::sink::PositionSink;
use crate::link::{ConnectionState, LinkError, LinkState};
use crate::position::{
    has_arrived, speed_to_step_deg, step_toward, PositionGenerator, PositionSample,
    SharedPosition,
};

/// Why a motion loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionExit {
    /// Shutdown was requested.
    Cancelled,
    /// The link left `Connected` while the loop was running.
    LinkLost,
    /// A position report could not be delivered.
    SendFailed,
}

/// State shared between the supervisor and the motion loop it spawns.
struct MotionContext<S, G> {
    sink: Arc<S>,
    link: Arc<LinkState>,
    generator: Mutex<G>,
    position: SharedPosition,
    config: MotionConfig,
    running: AtomicBool,
    loops_started: AtomicU64,
}

/// Drives the simulated mover while the link is up.
///
/// The current position lives in a [`SharedPosition`] that outlives any
/// single motion loop, so a reconnect resumes from wherever the mover was.
pub struct MoverDriver<S, G> {
    context: Arc<MotionContext<S, G>>,
}

impl<S, G> MoverDriver<S, G>
where
    S: PositionSink,
    G: PositionGenerator + 'static,
{
    /// Create a driver reporting through `sink` and following `link`.
    pub fn new(sink: Arc<S>, link: Arc<LinkState>, generator: G, config: MotionConfig) -> Self {
        let position = SharedPosition::new(config.start);
        Self {
            context: Arc::new(MotionContext {
                sink,
                link,
                generator: Mutex::new(generator),
                position,
                config,
                running: AtomicBool::new(false),
                loops_started: AtomicU64::new(0),
            }),
        }
    }

    /// Handle to the mover's current position.
    pub fn position(&self) -> SharedPosition {
        self.context.position.clone()
    }

    /// Whether a motion loop is active right now.
    pub fn is_running(&self) -> bool {
        self.context.running.load(Ordering::SeqCst)
    }

    /// Number of motion loops started so far.
    pub fn loops_started(&self) -> u64 {
        self.context.loops_started.load(Ordering::SeqCst)
    }

    /// Start the supervisor.
    ///
    /// Returns a handle that completes once `cancellation` fires and the
    /// active motion loop (if any) has wound down.
    pub fn start(&self, cancellation: CancellationToken) -> JoinHandle<()> {
        let context = Arc::clone(&self.context);
        tokio::spawn(async move { supervise(context, cancellation).await })
    }
}

async fn supervise<S, G>(context: Arc<MotionContext<S, G>>, cancellation: CancellationToken)
where
    S: PositionSink,
    G: PositionGenerator + 'static,
{
    info!("Mover driver started");
    let mut state_rx = context.link.watch();
    let mut motion: Option<JoinHandle<MotionExit>> = None;

    loop {
        let connected = *state_rx.borrow_and_update() == ConnectionState::Connected;
        if connected && motion.is_none() {
            motion = spawn_motion(&context, &cancellation);
        }

        tokio::select! {
            _ = cancellation.cancelled() => break,
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            exit = join_motion(&mut motion) => {
                motion = None;
                match exit {
                    Ok(exit) => debug!(?exit, "Motion loop finished"),
                    Err(e) => warn!(error = %e, "Motion loop panicked"),
                }
            }
        }
    }

    if let Some(handle) = motion.take() {
        if let Err(e) = handle.await {
            warn!(error = %e, "Motion loop panicked during shutdown");
        }
    }
    info!("Mover driver stopped");
}

/// Resolve when the active loop ends; never resolves if there is none.
async fn join_motion(
    motion: &mut Option<JoinHandle<MotionExit>>,
) -> Result<MotionExit, JoinError> {
    match motion {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

fn spawn_motion<S, G>(
    context: &Arc<MotionContext<S, G>>,
    cancellation: &CancellationToken,
) -> Option<JoinHandle<MotionExit>>
where
    S: PositionSink,
    G: PositionGenerator + 'static,
{
    if context
        .running
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return None;
    }
    let loop_id = context.loops_started.fetch_add(1, Ordering::SeqCst) + 1;
    info!(loop_id, position = %context.position.get(), "Starting motion loop");

    let context = Arc::clone(context);
    let cancellation = cancellation.clone();
    Some(tokio::spawn(async move {
        let exit = run_motion(&context, &cancellation).await;
        context.running.store(false, Ordering::SeqCst);
        exit
    }))
}

async fn run_motion<S, G>(
    context: &MotionContext<S, G>,
    cancellation: &CancellationToken,
) -> MotionExit
where
    S: PositionSink,
    G: PositionGenerator,
{
    let config = &context.config;
    let step_deg = speed_to_step_deg(config.speed_mps, config.step_interval);

    loop {
        if let Some(exit) = context.interrupted(cancellation) {
            return exit;
        }

        let origin = context.position.get();
        let waypoint = context
            .generator
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .next_waypoint(&origin);
        info!(%origin, %waypoint, "New waypoint generated");

        loop {
            if let Some(exit) = context.interrupted(cancellation) {
                return exit;
            }

            let next = step_toward(&context.position.get(), &waypoint, step_deg);
            context.position.set(next);
            if let Err(exit) = context.report(&next).await {
                return exit;
            }

            if has_arrived(&next, &waypoint) {
                break;
            }
            if !sleep_or_cancel(config.step_interval, cancellation).await {
                return MotionExit::Cancelled;
            }
        }

        info!(%waypoint, dwell_secs = config.dwell.as_secs(), "Reached waypoint");
        if let Err(exit) = dwell(context, &waypoint, cancellation).await {
            return exit;
        }
    }
}

/// Hold at `waypoint` for the configured dwell.
///
/// The held position is re-sent every step interval; the station treats a
/// silent session as lost.
async fn dwell<S, G>(
    context: &MotionContext<S, G>,
    waypoint: &PositionSample,
    cancellation: &CancellationToken,
) -> Result<(), MotionExit>
where
    S: PositionSink,
{
    let config = &context.config;
    let until = Instant::now() + config.dwell;

    loop {
        let remaining = until.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(());
        }
        if !sleep_or_cancel(remaining.min(config.step_interval), cancellation).await {
            return Err(MotionExit::Cancelled);
        }
        if Instant::now() >= until {
            return Ok(());
        }
        if let Some(exit) = context.interrupted(cancellation) {
            return Err(exit);
        }
        context.report(waypoint).await?;
    }
}

impl<S, G> MotionContext<S, G> {
    /// Send one position report.
    ///
    /// `NotConnected` means the link is already down or reconnecting, so the
    /// state is left for the link manager to drive. Any other failure marks
    /// the link `Disconnected`.
    async fn report(&self, sample: &PositionSample) -> Result<(), MotionExit>
    where
        S: PositionSink,
    {
        match self.sink.send_position(sample).await {
            Ok(()) => {
                debug!(position = %sample, "Sent position update");
                Ok(())
            }
            Err(LinkError::NotConnected(state)) => {
                debug!(%state, "Link not connected, position update dropped");
                Err(MotionExit::LinkLost)
            }
            Err(e) => {
                warn!(error = %e, "Failed to send position update");
                self.link.mark_disconnected();
                Err(MotionExit::SendFailed)
            }
        }
    }

    fn interrupted(&self, cancellation: &CancellationToken) -> Option<MotionExit> {
        if cancellation.is_cancelled() {
            Some(MotionExit::Cancelled)
        } else if !self.link.is_connected() {
            Some(MotionExit::LinkLost)
        } else {
            None
        }
    }
}

/// Returns `false` if cancelled before `duration` elapsed.
async fn sleep_or_cancel(duration: Duration, cancellation: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancellation.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
