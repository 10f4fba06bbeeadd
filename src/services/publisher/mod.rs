mod dbus;
mod log;
mod r#trait;

pub use self::r#trait::{create_publisher, NotificationPublisher};
