use crate::events::{LifecycleEvent, WindowHandle, WindowInfo};

/// Read-only view of the compositor's windows.
///
/// The monitor re-reads class, title and focus through this trait every time a
/// handler or timer runs, it never caches them.
pub trait WindowDirectory {
    fn active_window(&self) -> Option<WindowHandle>;

    fn window(&self, window: WindowHandle) -> Option<WindowInfo>;

    fn active_window_info(&self) -> Option<(WindowHandle, WindowInfo)> {
        let window = self.active_window()?;
        self.window(window).map(|info| (window, info))
    }
}

/// Обработчик событий жизненного цикла окон
pub trait LifecycleObserver {
    fn on_activated(&mut self, windows: &dyn WindowDirectory);

    fn on_added(&mut self, windows: &dyn WindowDirectory, window: WindowHandle);

    fn on_adopted(&mut self, windows: &dyn WindowDirectory, window: WindowHandle);

    fn on_removed(
        &mut self,
        windows: &dyn WindowDirectory,
        window: WindowHandle,
        last_known: &WindowInfo,
    );

    fn on_caption_changed(&mut self, windows: &dyn WindowDirectory, window: WindowHandle);

    fn dispatch(&mut self, windows: &dyn WindowDirectory, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Activated => self.on_activated(windows),
            LifecycleEvent::Added(window) => self.on_added(windows, window),
            LifecycleEvent::Adopted(window) => self.on_adopted(windows, window),
            LifecycleEvent::Removed { window, last_known } => {
                self.on_removed(windows, window, &last_known)
            }
            LifecycleEvent::CaptionChanged(window) => self.on_caption_changed(windows, window),
        }
    }
}
