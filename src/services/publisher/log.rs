use crate::config::BusConfig;
use crate::error::Result;
use crate::events::NotificationEvent;
use tracing::info;

use super::r#trait::NotificationPublisher;

/// Публикатор для режима сухого запуска: только пишет сигнал в лог
pub struct LogPublisher {
    object_path: String,
    interface: String,
}

impl LogPublisher {
    pub fn new(bus: &BusConfig) -> Self {
        info!("Dry-run режим - сигналы D-Bus только логируются");
        Self {
            object_path: bus.object_path.clone(),
            interface: bus.interface.clone(),
        }
    }
}

impl NotificationPublisher for LogPublisher {
    fn publish(&self, event: NotificationEvent) -> Result<()> {
        info!(
            "[DRY RUN] {} {}.{}",
            self.object_path, self.interface, event
        );
        Ok(())
    }
}
