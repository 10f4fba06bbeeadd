use crate::config::Config;
use crate::error::Result;
use crate::events::SourceEvent;
use tokio::sync::mpsc;

use super::dry_run::DryRunSource;
use super::niri::NiriSource;

/// Trait for compositor window sources that can run in different modes
#[async_trait::async_trait]
pub trait WindowSource {
    /// Run the source, forwarding every window change to `events`
    async fn run(self: Box<Self>, events: mpsc::UnboundedSender<SourceEvent>) -> Result<()>;
}

/// Factory function to create a window source based on the config and the dry_run flag
pub fn create_window_source(config: &Config, dry_run: bool) -> Result<Box<dyn WindowSource + Send>> {
    if dry_run || config.source.mode == "dry_run" {
        return Ok(Box::new(DryRunSource::new(
            config.source.dry_run_interval_ms,
        )));
    }

    match config.source.mode.as_str() {
        "niri" => Ok(Box::new(NiriSource::new())),
        other => Err(crate::bridge_error!(
            service_unavailable,
            "источник окон '{}' не поддерживается",
            other
        )),
    }
}
