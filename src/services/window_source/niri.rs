use crate::error::Result;
use crate::events::{SourceEvent, WindowHandle, WindowInfo};
use crate::trace_if_enabled;
use niri_ipc::socket::Socket;
use niri_ipc::{Event, Request, Response, Window};
use tokio::sync::mpsc;
use tracing::info;

use super::r#trait::WindowSource;

/// Источник окон на потоке событий IPC композитора niri
pub struct NiriSource;

impl NiriSource {
    pub fn new() -> Self {
        Self
    }

    /// Блокирующее чтение потока событий; выполняется вне рантайма
    fn read_events(events: mpsc::UnboundedSender<SourceEvent>) -> Result<()> {
        let mut socket = Socket::connect().map_err(|e| {
            crate::bridge_error!(compositor, "не удалось подключиться к сокету niri: {}", e)
        })?;

        match socket.send(Request::EventStream)? {
            Ok(Response::Handled) => {}
            Ok(other) => {
                return Err(crate::bridge_error!(
                    compositor,
                    "неожиданный ответ niri на запрос потока событий: {:?}",
                    other
                ))
            }
            Err(message) => {
                return Err(crate::bridge_error!(
                    compositor,
                    "niri отклонил запрос потока событий: {}",
                    message
                ))
            }
        }

        info!("Подключены к потоку событий niri");

        let mut read_event = socket.read_events();
        loop {
            let event = read_event()?;
            let Some(source_event) = translate(event) else {
                continue;
            };

            trace_if_enabled!("niri: {:?}", source_event);
            if events.send(source_event).is_err() {
                info!("Получатель событий закрыт, отключаемся от niri");
                return Ok(());
            }
        }
    }
}

fn window_entry(window: &Window) -> (WindowHandle, WindowInfo) {
    (
        WindowHandle(window.id),
        WindowInfo::new(
            window.app_id.clone().unwrap_or_default(),
            window.title.clone().unwrap_or_default(),
        ),
    )
}

/// Переводит событие niri в изменение окон; прочие события не нужны
fn translate(event: Event) -> Option<SourceEvent> {
    match event {
        Event::WindowsChanged { windows } => Some(SourceEvent::Snapshot {
            focused: windows
                .iter()
                .find(|window| window.is_focused)
                .map(|window| WindowHandle(window.id)),
            windows: windows.iter().map(window_entry).collect(),
        }),
        // Окно в фокусе снимает фокус с остальных; отдельного WindowFocusChanged niri не шлёт
        Event::WindowOpenedOrChanged { window } => {
            let focused = window.is_focused;
            let (window, info) = window_entry(&window);
            Some(SourceEvent::Opened {
                window,
                info,
                focused,
            })
        }
        Event::WindowClosed { id } => Some(SourceEvent::Closed {
            window: WindowHandle(id),
        }),
        Event::WindowFocusChanged { id } => Some(SourceEvent::FocusChanged {
            window: id.map(WindowHandle),
        }),
        _ => None,
    }
}

#[async_trait::async_trait]
impl WindowSource for NiriSource {
    async fn run(self: Box<Self>, events: mpsc::UnboundedSender<SourceEvent>) -> Result<()> {
        info!("Запуск источника окон niri");

        tokio::task::spawn_blocking(move || Self::read_events(events))
            .await
            .map_err(|e| {
                crate::bridge_error!(internal, "поток чтения niri аварийно завершился: {}", e)
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LifecycleEvent;
    use crate::services::lifecycle::WindowDirectory;
    use niri_ipc::WindowLayout;
    use crate::services::window_source::WindowTable;

    #[test]
    fn test_translate_close_and_focus() {
        assert_eq!(
            translate(Event::WindowClosed { id: 7 }),
            Some(SourceEvent::Closed {
                window: WindowHandle(7)
            })
        );
        assert_eq!(
            translate(Event::WindowFocusChanged { id: Some(3) }),
            Some(SourceEvent::FocusChanged {
                window: Some(WindowHandle(3))
            })
        );
        assert_eq!(
            translate(Event::WindowFocusChanged { id: None }),
            Some(SourceEvent::FocusChanged { window: None })
        );
    }

    #[test]
    fn test_translate_focused_open_moves_focus() {
        let mut window = Window {
            id: 2,
            title: Some(String::new()),
            app_id: Some("firefox".to_string()),
            pid: None,
            workspace_id: Some(1),
            is_focused: true,
            is_floating: false,
            is_urgent: false,
            layout: WindowLayout {
                pos_in_scrolling_layout: None,
                tile_size: (800.0, 600.0),
                window_size: (800, 600),
                tile_pos_in_workspace_view: None,
                window_offset_in_tile: (0.0, 0.0),
            },
            focus_timestamp: None,
        };

        let opened = translate(Event::WindowOpenedOrChanged {
            window: window.clone(),
        });
        assert_eq!(
            opened,
            Some(SourceEvent::Opened {
                window: WindowHandle(2),
                info: WindowInfo::new("firefox", ""),
                focused: true,
            })
        );

        let mut table = WindowTable::new();
        table.apply(SourceEvent::Snapshot {
            windows: vec![(WindowHandle(1), WindowInfo::new("kitty", "kitty ~"))],
            focused: Some(WindowHandle(1)),
        });
        assert_eq!(
            table.apply(opened.unwrap()).to_vec(),
            vec![LifecycleEvent::Added(WindowHandle(2)), LifecycleEvent::Activated]
        );

        window.title = Some("Mozilla Firefox".to_string());
        let retitled = translate(Event::WindowOpenedOrChanged { window }).unwrap();
        assert_eq!(
            table.apply(retitled).to_vec(),
            vec![LifecycleEvent::CaptionChanged(WindowHandle(2))]
        );
        assert_eq!(table.active_window(), Some(WindowHandle(2)));
    }

    #[test]
    fn test_translate_empty_snapshot() {
        assert_eq!(
            translate(Event::WindowsChanged {
                windows: Vec::new()
            }),
            Some(SourceEvent::Snapshot {
                windows: Vec::new(),
                focused: None,
            })
        );
    }
}
