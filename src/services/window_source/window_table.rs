use crate::events::{LifecycleEvent, SourceEvent, WindowHandle, WindowInfo};
use crate::services::lifecycle::WindowDirectory;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Обычно одно-два события на изменение; снимок может дать больше
pub type LifecycleBatch = SmallVec<[LifecycleEvent; 2]>;

/// Зеркало окон композитора: класс и заголовок каждого окна плюс фокус.
///
/// Applying a [`SourceEvent`] updates the table first and then returns the
/// lifecycle events for the monitor, so handlers always read the new state.
#[derive(Debug, Default)]
pub struct WindowTable {
    windows: HashMap<WindowHandle, WindowInfo>,
    focused: Option<WindowHandle>,
}

impl WindowTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn apply(&mut self, event: SourceEvent) -> LifecycleBatch {
        let mut batch = LifecycleBatch::new();

        match event {
            SourceEvent::Snapshot { windows, focused } => {
                let incoming: HashMap<WindowHandle, WindowInfo> = windows.into_iter().collect();

                let mut vanished: Vec<WindowHandle> = self
                    .windows
                    .keys()
                    .filter(|window| !incoming.contains_key(window))
                    .copied()
                    .collect();
                vanished.sort();
                for window in vanished {
                    if let Some(last_known) = self.windows.remove(&window) {
                        batch.push(LifecycleEvent::Removed { window, last_known });
                    }
                }

                let mut handles: Vec<WindowHandle> = incoming.keys().copied().collect();
                handles.sort();
                for window in handles {
                    let info = incoming[&window].clone();
                    match self.windows.insert(window, info.clone()) {
                        None => batch.push(LifecycleEvent::Adopted(window)),
                        Some(previous) if previous.title != info.title => {
                            batch.push(LifecycleEvent::CaptionChanged(window))
                        }
                        Some(_) => {}
                    }
                }

                let focused = focused.filter(|window| self.windows.contains_key(window));
                if self.focused != focused {
                    self.focused = focused;
                    batch.push(LifecycleEvent::Activated);
                }
            }
            SourceEvent::Opened {
                window,
                info,
                focused,
            } => {
                let title = info.title.clone();
                match self.windows.insert(window, info) {
                    None => batch.push(LifecycleEvent::Added(window)),
                    Some(previous) if previous.title != title => {
                        batch.push(LifecycleEvent::CaptionChanged(window))
                    }
                    // Изменился только класс или иные свойства окна
                    Some(_) => {}
                }

                // Activated идёт после Added, чтобы окно уже было подписано
                if focused && self.focused != Some(window) {
                    self.focused = Some(window);
                    batch.push(LifecycleEvent::Activated);
                }
            }
            SourceEvent::Closed { window } => {
                if let Some(last_known) = self.windows.remove(&window) {
                    if self.focused == Some(window) {
                        self.focused = None;
                    }
                    batch.push(LifecycleEvent::Removed { window, last_known });
                }
            }
            SourceEvent::FocusChanged { window } => {
                if self.focused != window {
                    self.focused = window;
                    batch.push(LifecycleEvent::Activated);
                }
            }
        }

        batch
    }
}

impl WindowDirectory for WindowTable {
    fn active_window(&self) -> Option<WindowHandle> {
        self.focused
    }

    fn window(&self, window: WindowHandle) -> Option<WindowInfo> {
        self.windows.get(&window).cloned()
    }
}
