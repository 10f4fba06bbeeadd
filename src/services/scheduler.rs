use crate::events::WindowHandle;
use std::fmt;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

/// Фаза перепроверки заголовка
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryPhase {
    /// Быстрая перепроверка с номером попытки (с 1)
    Fast(u8),
    Slow,
}

/// Отложенное действие монитора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Публикация начального состояния после старта
    Initial,
    /// Повторная оценка активного окна после уничтожения окна
    Reevaluate,
    /// Перепроверка заголовка окна; `epoch` отличает прогоны отслеживания
    Check {
        window: WindowHandle,
        epoch: u64,
        phase: RetryPhase,
    },
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timer::Initial => write!(f, "initial"),
            Timer::Reevaluate => write!(f, "reevaluate"),
            Timer::Check {
                window,
                epoch,
                phase: RetryPhase::Fast(attempt),
            } => write!(f, "fast check #{} of {} (epoch {})", attempt, window, epoch),
            Timer::Check {
                window,
                epoch,
                phase: RetryPhase::Slow,
            } => write!(f, "slow poll of {} (epoch {})", window, epoch),
        }
    }
}

/// Планировщик отложенных действий.
///
/// Monitor code never sleeps: it asks the scheduler to hand a [`Timer`] back
/// after `delay` and re-reads all state when it fires. There is no cancel
/// operation, stale timers are recognised and dropped by the monitor.
pub trait Scheduler {
    fn schedule_after(&self, delay: Duration, timer: Timer);
}

/// Планировщик на таймерах tokio: по истечении задержки таймер отправляется
/// обратно в канал, который читает цикл моста.
#[derive(Clone)]
pub struct TokioScheduler {
    timer_tx: mpsc::UnboundedSender<Timer>,
}

impl TokioScheduler {
    pub fn new(timer_tx: mpsc::UnboundedSender<Timer>) -> Self {
        Self { timer_tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Timer>) {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        (Self::new(timer_tx), timer_rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, timer: Timer) {
        let tx = self.timer_tx.clone();
        tokio::spawn(async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }
            // Получатель закрыт только при остановке моста
            let _ = tx.send(timer);
        });
    }
}

#[cfg(test)]
pub(crate) mod virtual_clock {
    use super::{Scheduler, Timer};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Default)]
    struct Queue {
        now: Duration,
        seq: u64,
        pending: Vec<(Duration, u64, Timer)>,
    }

    /// Планировщик с виртуальными часами для детерминированных тестов
    #[derive(Clone, Default)]
    pub struct VirtualScheduler {
        queue: Rc<RefCell<Queue>>,
    }

    impl VirtualScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn now(&self) -> Duration {
            self.queue.borrow().now
        }

        /// Снимает самый ранний таймер со сроком не позже `until` и переводит часы на его срок
        pub fn pop_due(&self, until: Duration) -> Option<(Duration, Timer)> {
            let mut queue = self.queue.borrow_mut();
            let idx = queue
                .pending
                .iter()
                .enumerate()
                .filter(|(_, (due, _, _))| *due <= until)
                .min_by_key(|(_, (due, seq, _))| (*due, *seq))
                .map(|(idx, _)| idx)?;
            let (due, _, timer) = queue.pending.remove(idx);
            queue.now = due;
            Some((due, timer))
        }

        pub fn set_now(&self, now: Duration) {
            let mut queue = self.queue.borrow_mut();
            if now > queue.now {
                queue.now = now;
            }
        }

        pub fn pending(&self) -> Vec<(Duration, Timer)> {
            let mut pending: Vec<_> = self
                .queue
                .borrow()
                .pending
                .iter()
                .map(|(due, seq, timer)| (*due, *seq, *timer))
                .collect();
            pending.sort_by_key(|(due, seq, _)| (*due, *seq));
            pending.into_iter().map(|(due, _, timer)| (due, timer)).collect()
        }
    }

    impl Scheduler for VirtualScheduler {
        fn schedule_after(&self, delay: Duration, timer: Timer) {
            let mut queue = self.queue.borrow_mut();
            let due = queue.now + delay;
            let seq = queue.seq;
            queue.seq += 1;
            queue.pending.push((due, seq, timer));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::virtual_clock::VirtualScheduler;
    use super::*;

    #[test]
    fn test_virtual_scheduler_orders_by_due_time() {
        let scheduler = VirtualScheduler::new();
        scheduler.schedule_after(Duration::from_millis(150), Timer::Reevaluate);
        scheduler.schedule_after(Duration::from_millis(50), Timer::Initial);
        scheduler.schedule_after(Duration::from_millis(150), Timer::Initial);

        assert!(scheduler.pop_due(Duration::from_millis(10)).is_none());
        assert_eq!(
            scheduler.pop_due(Duration::from_secs(1)),
            Some((Duration::from_millis(50), Timer::Initial))
        );
        assert_eq!(scheduler.now(), Duration::from_millis(50));
        // Одинаковый срок: порядок постановки сохраняется
        assert_eq!(
            scheduler.pop_due(Duration::from_secs(1)),
            Some((Duration::from_millis(150), Timer::Reevaluate))
        );
        assert_eq!(
            scheduler.pop_due(Duration::from_secs(1)),
            Some((Duration::from_millis(150), Timer::Initial))
        );
        assert!(scheduler.pending().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_delivers_after_delay() {
        let (scheduler, mut timer_rx) = TokioScheduler::channel();
        scheduler.schedule_after(Duration::from_millis(500), Timer::Reevaluate);
        scheduler.schedule_after(Duration::ZERO, Timer::Initial);

        assert_eq!(timer_rx.recv().await, Some(Timer::Initial));
        let started = tokio::time::Instant::now();
        assert_eq!(timer_rx.recv().await, Some(Timer::Reevaluate));
        assert!(started.elapsed() >= Duration::from_millis(499));
    }
}
