use crate::config::BusConfig;
use crate::error::Result;
use crate::events::{NotificationEvent, NotificationKind, WindowInfo};
use crate::debug_if_enabled;
use futures::StreamExt;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};
use zbus::message::Type as MessageType;
use zbus::{Connection, MatchRule, MessageStream};

/// Пауза перед переподключением к шине
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Слушатель сигналов активного окна: сторона потребителя (движка AHK).
/// Держит последнее известное активное окно.
pub struct SignalListener {
    bus: BusConfig,
    current: Arc<RwLock<Option<WindowInfo>>>,
}

impl SignalListener {
    pub fn new(bus: BusConfig) -> Self {
        Self {
            bus,
            current: Arc::new(RwLock::new(None)),
        }
    }

    #[allow(dead_code)]
    pub fn current_window(&self) -> Option<WindowInfo> {
        self.current.read().clone()
    }

    pub async fn run(self) -> Result<()> {
        info!("Запуск слушателя сигналов {}", self.bus.interface);

        loop {
            match self.listen().await {
                Ok(()) => warn!("Поток сигналов D-Bus завершился"),
                Err(e) => warn!("Ошибка слушателя D-Bus: {}", e),
            }
            sleep(RECONNECT_DELAY).await;
        }
    }

    async fn listen(&self) -> Result<()> {
        let connection = Connection::session().await?;

        let rule = MatchRule::builder()
            .msg_type(MessageType::Signal)
            .interface(self.bus.interface.as_str())?
            .path(self.bus.object_path.as_str())?
            .build();
        let mut stream = MessageStream::for_match_rule(rule, &connection, None).await?;

        info!("Слушаем сигналы {} на {}", self.bus.interface, self.bus.object_path);

        while let Some(message) = stream.next().await {
            let message = message?;
            let header = message.header();
            let Some(member) = header.member() else {
                continue;
            };

            let kind = match member.as_str().parse::<NotificationKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    debug_if_enabled!("Пропускаем сигнал: {}", e);
                    continue;
                }
            };

            match message.body().deserialize::<(String, String)>() {
                Ok((window_class, window_title)) => self.apply(NotificationEvent {
                    kind,
                    window_class,
                    window_title,
                }),
                Err(e) => warn!("Не удалось разобрать аргументы сигнала {}: {}", member, e),
            }
        }

        Ok(())
    }

    pub fn apply(&self, event: NotificationEvent) {
        info!("Сигнал: {}", event);

        if event.kind.updates_active_window() {
            let window = WindowInfo::new(event.window_class, event.window_title);
            info!("Активное окно: {}", window);
            *self.current.write() = Some(window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn event(kind: NotificationKind, class: &str, title: &str) -> NotificationEvent {
        NotificationEvent::new(kind, &WindowInfo::new(class, title))
    }

    #[test]
    fn test_only_changed_and_initial_update_state() {
        let listener = SignalListener::new(Config::default().bus);
        assert_eq!(listener.current_window(), None);

        listener.apply(event(NotificationKind::Created, "firefox", ""));
        assert_eq!(listener.current_window(), None);

        listener.apply(event(NotificationKind::Initial, "kitty", "kitty ~"));
        assert_eq!(listener.current_window(), Some(WindowInfo::new("kitty", "kitty ~")));

        listener.apply(event(NotificationKind::Changed, "firefox", "Mozilla Firefox"));
        listener.apply(event(NotificationKind::Destroyed, "kitty", "kitty ~"));
        assert_eq!(
            listener.current_window(),
            Some(WindowInfo::new("firefox", "Mozilla Firefox"))
        );
    }
}
