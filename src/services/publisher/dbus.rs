use crate::config::BusConfig;
use crate::debug_if_enabled;
use crate::error::{BridgeError, Result};
use crate::events::NotificationEvent;
use tokio::sync::mpsc;
use tracing::{info, warn};
use zbus::Connection;

use super::r#trait::NotificationPublisher;

/// Публикует уведомления сигналами D-Bus в сессионной шине.
///
/// Events go through an unbounded queue drained by a single sender task, so
/// signals leave in emission order and `publish` never blocks the monitor.
pub struct DbusPublisher {
    event_tx: mpsc::UnboundedSender<NotificationEvent>,
}

impl DbusPublisher {
    pub async fn connect(bus: &BusConfig) -> Result<Self> {
        info!("Подключение к сессионной шине D-Bus");

        let connection = Connection::session().await.map_err(BridgeError::DBus)?;

        if let Some(name) = connection.unique_name() {
            info!("Подключены к D-Bus как {}", name);
        }

        Ok(Self::spawn(
            connection,
            bus.object_path.clone(),
            bus.interface.clone(),
        ))
    }

    fn spawn(connection: Connection, object_path: String, interface: String) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        tokio::spawn(Self::sender_task(connection, object_path, interface, event_rx));
        Self::with_sender(event_tx)
    }

    fn with_sender(event_tx: mpsc::UnboundedSender<NotificationEvent>) -> Self {
        Self { event_tx }
    }

    async fn sender_task(
        connection: Connection,
        object_path: String,
        interface: String,
        mut event_rx: mpsc::UnboundedReceiver<NotificationEvent>,
    ) {
        info!("Публикация сигналов {} на {} запущена", interface, object_path);

        while let Some(event) = event_rx.recv().await {
            let sent = connection
                .emit_signal(
                    None::<()>,
                    object_path.as_str(),
                    interface.as_str(),
                    event.kind.member(),
                    &event.body(),
                )
                .await;

            match sent {
                Ok(()) => debug_if_enabled!("Сигнал отправлен: {}", event),
                // Доставка best-effort: без повторов
                Err(e) => warn!("Не удалось отправить сигнал {}: {}", event, e),
            }
        }

        info!("Публикация сигналов остановлена");
    }
}

impl NotificationPublisher for DbusPublisher {
    fn publish(&self, event: NotificationEvent) -> Result<()> {
        self.event_tx.send(event).map_err(|e| {
            crate::bridge_error!(
                channel_closed,
                "отправитель D-Bus остановлен, событие {} потеряно",
                e.0
            )
        })
    }
}
