use crate::error::Result;
use crate::events::{SourceEvent, WindowHandle, WindowInfo};
use tokio::sync::mpsc;
use tokio::time::{interval, sleep, Duration};
use tracing::info;

use super::r#trait::WindowSource;

/// Класс, настоящий заголовок и через сколько он появляется после открытия окна
const FAKE_WINDOWS: &[(&str, &str, u64)] = &[
    ("org.kde.konsole", "~ : zsh — Konsole", 30),
    ("firefox", "Mozilla Firefox", 180),
    ("code", "main.rs - ahk-active-window - Visual Studio Code", 700),
    ("org.telegram.desktop", "Telegram", 1200),
];

/// Эмуляция композитора: окна открываются без заголовка, получают фокус,
/// затем настоящий заголовок, и закрываются на следующем цикле
pub struct DryRunSource {
    period: Duration,
}

impl DryRunSource {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period: Duration::from_millis(period_ms),
        }
    }

    fn send(events: &mpsc::UnboundedSender<SourceEvent>, event: SourceEvent) -> Result<()> {
        events
            .send(event)
            .map_err(|_| crate::bridge_error!(channel_closed, "получатель событий dry-run закрыт"))
    }

    async fn run_impl(self, events: mpsc::UnboundedSender<SourceEvent>) -> Result<()> {
        info!("Dry-run режим - источник окон работает в режиме эмуляции");

        Self::send(
            &events,
            SourceEvent::Snapshot {
                windows: Vec::new(),
                focused: None,
            },
        )?;

        let mut ticker = interval(self.period);
        let mut previous: Option<WindowHandle> = None;
        let mut next_id = 1u64;

        for &(class, title, title_delay_ms) in FAKE_WINDOWS.iter().cycle() {
            ticker.tick().await;

            let window = WindowHandle(next_id);
            next_id += 1;

            info!("Dry-run: эмулируем новое окно {} ({})", window, class);
            Self::send(
                &events,
                SourceEvent::Opened {
                    window,
                    info: WindowInfo::new(class, ""),
                    focused: false,
                },
            )?;
            Self::send(
                &events,
                SourceEvent::FocusChanged {
                    window: Some(window),
                },
            )?;

            if let Some(old) = previous.replace(window) {
                Self::send(&events, SourceEvent::Closed { window: old })?;
            }

            sleep(Duration::from_millis(title_delay_ms)).await;
            Self::send(
                &events,
                SourceEvent::Opened {
                    window,
                    info: WindowInfo::new(class, title),
                    focused: false,
                },
            )?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl WindowSource for DryRunSource {
    async fn run(self: Box<Self>, events: mpsc::UnboundedSender<SourceEvent>) -> Result<()> {
        (*self).run_impl(events).await
    }
}
