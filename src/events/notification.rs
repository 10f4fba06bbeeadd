use super::WindowInfo;
use std::fmt;
use std::str::FromStr;

/// Вид уведомления; имя совпадает с именем D-Bus сигнала
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Created,
    Changed,
    Destroyed,
    Initial,
}

impl NotificationKind {
    pub fn member(&self) -> &'static str {
        match self {
            NotificationKind::Created => "Created",
            NotificationKind::Changed => "Changed",
            NotificationKind::Destroyed => "Destroyed",
            NotificationKind::Initial => "Initial",
        }
    }

    /// Сообщает ли событие о новом активном окне
    pub fn updates_active_window(&self) -> bool {
        matches!(self, NotificationKind::Changed | NotificationKind::Initial)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.member())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(NotificationKind::Created),
            "Changed" => Ok(NotificationKind::Changed),
            "Destroyed" => Ok(NotificationKind::Destroyed),
            "Initial" => Ok(NotificationKind::Initial),
            other => Err(format!("неизвестный сигнал: {}", other)),
        }
    }
}

/// Уведомление для шины: вид + класс и заголовок окна
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub window_class: String,
    pub window_title: String,
}

impl NotificationEvent {
    pub fn new(kind: NotificationKind, window: &WindowInfo) -> Self {
        Self {
            kind,
            window_class: window.class.clone(),
            window_title: window.title.clone(),
        }
    }

    /// Тело сигнала: (класс, заголовок)
    pub fn body(&self) -> (&str, &str) {
        (self.window_class.as_str(), self.window_title.as_str())
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(\"{}\", \"{}\")",
            self.kind, self.window_class, self.window_title
        )
    }
}
