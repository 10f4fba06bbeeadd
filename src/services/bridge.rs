use crate::error::Result;
use crate::events::{LifecycleEvent, SourceEvent};
use crate::services::active_client_monitor::ActiveClientMonitor;
use crate::services::lifecycle::LifecycleObserver;
use crate::services::publisher::NotificationPublisher;
use crate::services::retry_sequencer::RetrySequencer;
use crate::services::scheduler::{Timer, TokioScheduler};
use crate::services::window_source::WindowTable;
use crate::{debug_if_enabled, trace_if_enabled};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Цикл моста: единственная задача, владеющая монитором и таблицей окон.
///
/// Source events and fired timers are processed one at a time on this task,
/// so the monitor never needs locking.
pub struct BridgeService<P: NotificationPublisher> {
    monitor: ActiveClientMonitor<TokioScheduler, P>,
    table: WindowTable,
    source_rx: mpsc::UnboundedReceiver<SourceEvent>,
    timer_rx: mpsc::UnboundedReceiver<Timer>,
}

impl<P: NotificationPublisher> BridgeService<P> {
    pub fn new(
        sequencer: RetrySequencer,
        publisher: P,
        source_rx: mpsc::UnboundedReceiver<SourceEvent>,
    ) -> Self {
        let (scheduler, timer_rx) = TokioScheduler::channel();
        Self {
            monitor: ActiveClientMonitor::new(sequencer, scheduler, publisher),
            table: WindowTable::new(),
            source_rx,
            timer_rx,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        info!("Мост активного окна запущен, ожидаем состояние композитора");

        let mut connected = false;

        loop {
            tokio::select! {
                source_event = self.source_rx.recv() => {
                    let Some(event) = source_event else {
                        warn!("Источник окон закрыл канал");
                        return Err(crate::bridge_error!(channel_closed, "источник окон остановлен"));
                    };

                    self.apply(event, !connected);

                    // Начальное состояние публикуется, когда таблица окон уже заполнена
                    if !connected {
                        connected = true;
                        info!("Состояние композитора получено: {} окон", self.table.len());
                        self.monitor.start();
                    }
                }
                Some(timer) = self.timer_rx.recv() => {
                    self.monitor.handle_timer(&self.table, timer);
                }
            }
        }
    }

    fn apply(&mut self, event: SourceEvent, initial: bool) {
        trace_if_enabled!("Событие источника: {:?}", event);

        for lifecycle in self.table.apply(event) {
            // Фокус из первого состояния сообщается сигналом Initial
            if initial && lifecycle == LifecycleEvent::Activated {
                continue;
            }
            debug_if_enabled!("Событие окна: {}", lifecycle);
            self.monitor.dispatch(&self.table, lifecycle);
        }
    }
}
