//! `uavlink mover` - run the simulated mover.

use std::sync::Arc;

use clap::Args;
use tracing::info;
use uavlink::config::{ConfigFile, LinkSettings, MoverSettings};
use uavlink::link::{websocket_url, ConnectionState, LinkManager, WebSocketTransport};
use uavlink::mover::MoverDriver;
use uavlink::position::RandomWaypointGenerator;

use super::common::{join_task, SHUTDOWN_GRACE};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Mover arguments. Each overrides the matching config value.
#[derive(Debug, Args)]
pub struct MoverArgs {
    /// Ground station URL (e.g. http://localhost:6000)
    #[arg(long)]
    pub url: Option<String>,

    /// Waypoint distance in kilometres
    #[arg(long)]
    pub radius_km: Option<f64>,

    /// Ground speed in metres per second
    #[arg(long)]
    pub speed_mps: Option<f64>,

    /// Give up after this many consecutive failed connection attempts (0 = never)
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

impl MoverArgs {
    /// Merge command-line overrides into the file settings.
    pub fn apply(&self, config: &ConfigFile) -> Result<(MoverSettings, LinkSettings), CliError> {
        let mut mover = config.mover.clone();
        let mut link = config.link.clone();

        if let Some(url) = &self.url {
            websocket_url(url).map_err(|e| CliError::InvalidArgument(e.to_string()))?;
            mover.url = url.clone();
        }
        if let Some(radius_km) = self.radius_km {
            if !(radius_km.is_finite() && radius_km > 0.0) {
                return Err(CliError::InvalidArgument(format!(
                    "--radius-km must be positive, got {}",
                    radius_km
                )));
            }
            mover.radius_km = radius_km;
        }
        if let Some(speed_mps) = self.speed_mps {
            if !(speed_mps.is_finite() && speed_mps > 0.0) {
                return Err(CliError::InvalidArgument(format!(
                    "--speed-mps must be positive, got {}",
                    speed_mps
                )));
            }
            mover.speed_mps = speed_mps;
        }
        if let Some(max_attempts) = self.max_attempts {
            link.max_attempts = max_attempts;
        }

        Ok((mover, link))
    }
}

/// Run the mover until Ctrl+C, or until the link gives up.
pub async fn run(args: MoverArgs, runner: CliRunner) -> Result<(), CliError> {
    runner.log_startup("mover");
    let (mover_settings, link_settings) = args.apply(runner.config())?;
    let motion = mover_settings.to_motion_config();

    let manager = Arc::new(LinkManager::new(
        WebSocketTransport::default(),
        mover_settings.url.clone(),
        link_settings.to_retry_policy(),
    ));
    manager.state().on_transition(|transition| {
        if transition.is_connect() {
            println!("Connected to ground station");
        } else if transition.from == ConnectionState::Connected && transition.is_disconnect() {
            println!("Link down, retrying connection");
        }
    });

    let driver = MoverDriver::new(
        Arc::clone(&manager),
        Arc::clone(manager.state()),
        RandomWaypointGenerator::new(motion.radius_km),
        motion,
    );
    let position = driver.position();

    println!("Mover reporting to {}", mover_settings.url);
    println!("Press Ctrl+C to stop.");

    let cancellation = runner.shutdown_token()?;
    let link_task = manager.start(cancellation.clone());
    let motion_task = driver.start(cancellation.clone());

    // The link task only ends early when it gives up; take the driver down too.
    let link_result = join_task("link manager", link_task, &cancellation, SHUTDOWN_GRACE).await?;
    cancellation.cancel();
    join_task("motion driver", motion_task, &cancellation, SHUTDOWN_GRACE).await?;
    manager.disconnect().await;

    info!(
        sent = manager.messages_sent(),
        position = %position.get(),
        "Mover session finished"
    );
    println!("Mover stopped at {}.", position.get());

    match link_result {
        Some(Err(e)) => Err(e.into()),
        _ => Ok(()),
    }
}
