pub mod active_client_monitor;
pub mod bridge;
pub mod lifecycle;
pub mod publisher;
pub mod retry_sequencer;
pub mod scheduler;
pub mod signal_listener;
pub mod title_quality;
pub mod window_source;
pub mod window_tracker;

pub use bridge::BridgeService;
pub use publisher::create_publisher;
pub use retry_sequencer::RetrySequencer;
pub use signal_listener::SignalListener;
pub use window_source::create_window_source;
