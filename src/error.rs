use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка D-Bus: {0}")]
    DBus(#[from] zbus::Error),

    #[error("Ошибка IPC композитора: {0}")]
    Compositor(String),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Канал закрыт: {0}")]
    ChannelClosed(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! bridge_error {
    (compositor, $($arg:tt)*) => {
        $crate::error::BridgeError::Compositor(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::BridgeError::ServiceUnavailable(format!($($arg)*))
    };
    (channel_closed, $($arg:tt)*) => {
        $crate::error::BridgeError::ChannelClosed(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::BridgeError::Internal(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_macro_formats_message() {
        let err = bridge_error!(compositor, "сокет {} недоступен", "niri");
        assert!(matches!(err, BridgeError::Compositor(ref msg) if msg == "сокет niri недоступен"));
        assert_eq!(err.to_string(), "Ошибка IPC композитора: сокет niri недоступен");
    }

    #[test]
    fn test_internal_error_macro() {
        let err = bridge_error!(internal, "поток {} упал", "niri");
        assert!(matches!(err, BridgeError::Internal(ref msg) if msg == "поток niri упал"));
    }
}
