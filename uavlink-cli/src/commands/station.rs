//! `uavlink station` - run the ground station.

use std::sync::Arc;

use clap::Args;
use tracing::info;
use uavlink::config::StationSettings;
use uavlink::link::LinkState;
use uavlink::station::StationServer;
use uavlink::telemetry::TelemetryStore;

use super::common::{join_task, SHUTDOWN_GRACE};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Station arguments. Each overrides the `[station]` config value.
#[derive(Debug, Args)]
pub struct StationArgs {
    /// Address to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,
}

impl StationArgs {
    /// Merge command-line overrides into the file settings.
    pub fn apply(&self, settings: &StationSettings) -> StationSettings {
        let mut settings = settings.clone();
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        settings
    }
}

/// Run the station until Ctrl+C.
pub async fn run(args: StationArgs, runner: CliRunner) -> Result<(), CliError> {
    runner.log_startup("station");
    let config = args.apply(&runner.config().station).to_station_config();

    let link = Arc::new(LinkState::new());
    let store = Arc::new(TelemetryStore::new());
    let server = StationServer::bind(&config, Arc::clone(&link), Arc::clone(&store)).await?;

    println!("Ground station listening on {}", server.local_addr());
    println!("Press Ctrl+C to stop.");

    let cancellation = runner.shutdown_token()?;
    let handle = server.start(cancellation.clone());

    let result = join_task("station", handle, &cancellation, SHUTDOWN_GRACE).await?;

    info!(
        samples = store.update_count(),
        "Station session finished"
    );
    if let Some(record) = store.read() {
        println!(
            "Last position: {} at {}",
            record.sample,
            record.received_at.to_rfc3339()
        );
    }
    println!("Ground station stopped.");

    match result {
        Some(Err(e)) => Err(e.into()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_values() {
        let file = StationSettings::default();
        let args = StationArgs {
            host: Some("127.0.0.1".to_string()),
            port: Some(7000),
        };

        let merged = args.apply(&file);
        assert_eq!(merged.host, "127.0.0.1");
        assert_eq!(merged.port, 7000);
        assert_eq!(merged.liveness_poll_secs, file.liveness_poll_secs);
    }

    #[test]
    fn test_no_flags_keeps_file_values() {
        let file = StationSettings {
            port: 6100,
            ..StationSettings::default()
        };
        let args = StationArgs {
            host: None,
            port: None,
        };
        assert_eq!(args.apply(&file), file);
    }
}
