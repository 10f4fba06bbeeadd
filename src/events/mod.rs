pub mod notification;
pub mod window;

pub use notification::{NotificationEvent, NotificationKind};
pub use window::{LifecycleEvent, SourceEvent, WindowHandle, WindowInfo};
