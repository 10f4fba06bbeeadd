use std::fmt;

/// Непрозрачный идентификатор окна, выданный композитором
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Информация об окне
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct WindowInfo {
    pub class: String,
    pub title: String,
}

impl WindowInfo {
    pub fn new(class: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            title: title.into(),
        }
    }

    #[allow(dead_code)]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class.is_empty() {
            write!(f, "\"{}\"", self.title)
        } else {
            write!(f, "\"{}\" ({})", self.title, self.class)
        }
    }
}

/// Сырые изменения, которые сообщает источник окон (композитор)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// Полный список окон, обычно первым сообщением после подключения
    Snapshot {
        windows: Vec<(WindowHandle, WindowInfo)>,
        focused: Option<WindowHandle>,
    },
    /// Окно открыто либо изменилось (заголовок, класс).
    /// `focused` переносит фокус на это окно.
    Opened {
        window: WindowHandle,
        info: WindowInfo,
        focused: bool,
    },
    Closed {
        window: WindowHandle,
    },
    FocusChanged {
        window: Option<WindowHandle>,
    },
}

/// Событие жизненного цикла окна, которое получает монитор
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Activated,
    Added(WindowHandle),
    /// Окно существовало до подключения: только подписка на заголовок
    Adopted(WindowHandle),
    Removed {
        window: WindowHandle,
        last_known: WindowInfo,
    },
    CaptionChanged(WindowHandle),
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleEvent::Activated => write!(f, "activated"),
            LifecycleEvent::Added(window) => write!(f, "added {}", window),
            LifecycleEvent::Adopted(window) => write!(f, "adopted {}", window),
            LifecycleEvent::Removed { window, last_known } => {
                write!(f, "removed {} {}", window, last_known)
            }
            LifecycleEvent::CaptionChanged(window) => write!(f, "caption changed {}", window),
        }
    }
}
