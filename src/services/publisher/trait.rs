use crate::config::Config;
use crate::error::Result;
use crate::events::NotificationEvent;

use super::dbus::DbusPublisher;
use super::log::LogPublisher;

/// Отправка уведомлений об активном окне.
///
/// Delivery is fire-and-forget: an `Err` only means the event could not be
/// handed over. Callers log it and carry on.
pub trait NotificationPublisher {
    fn publish(&self, event: NotificationEvent) -> Result<()>;
}

impl<P: NotificationPublisher + ?Sized> NotificationPublisher for Box<P> {
    fn publish(&self, event: NotificationEvent) -> Result<()> {
        (**self).publish(event)
    }
}

/// Factory function to create a publisher based on the dry_run flag
pub async fn create_publisher(
    config: &Config,
    dry_run: bool,
) -> Result<Box<dyn NotificationPublisher + Send>> {
    if dry_run {
        Ok(Box::new(LogPublisher::new(&config.bus)))
    } else {
        Ok(Box::new(DbusPublisher::connect(&config.bus).await?))
    }
}
