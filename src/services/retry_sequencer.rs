use crate::config::RetryConfig;
use crate::events::WindowHandle;
use crate::services::scheduler::{RetryPhase, Scheduler, Timer};
use crate::services::window_tracker::TrackState;
use tokio::time::Duration;
use tracing::warn;

/// Планирует перепроверки заголовка: несколько быстрых попыток с растущими
/// задержками, затем бесконечный (или ограниченный настройкой) медленный опрос.
#[derive(Debug, Clone)]
pub struct RetrySequencer {
    fast_delays: Vec<Duration>,
    slow_interval: Duration,
    max_slow_polls: Option<u32>,
}

impl Default for RetrySequencer {
    fn default() -> Self {
        Self::new(
            vec![
                Duration::from_millis(50),
                Duration::from_millis(150),
                Duration::from_millis(350),
            ],
            Duration::from_millis(500),
            None,
        )
    }
}

impl RetrySequencer {
    pub fn new(
        fast_delays: Vec<Duration>,
        slow_interval: Duration,
        max_slow_polls: Option<u32>,
    ) -> Self {
        Self {
            fast_delays,
            slow_interval,
            max_slow_polls,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.fast_delays(),
            config.slow_poll_interval(),
            config.max_slow_polls,
        )
    }

    pub fn fast_attempts(&self) -> u8 {
        u8::try_from(self.fast_delays.len()).unwrap_or(u8::MAX)
    }

    /// Задержка перед проверкой данной фазы, отсчитанная от предыдущей проверки
    pub fn delay_for(&self, phase: RetryPhase) -> Duration {
        match phase {
            RetryPhase::Fast(attempt) => self
                .fast_delays
                .get(usize::from(attempt.max(1)) - 1)
                .copied()
                .unwrap_or(self.slow_interval),
            RetryPhase::Slow => self.slow_interval,
        }
    }

    /// Планирует первую быструю перепроверку
    pub fn start_fast_retry<S: Scheduler + ?Sized>(
        &self,
        scheduler: &S,
        window: WindowHandle,
        epoch: u64,
    ) -> TrackState {
        if self.fast_attempts() == 0 {
            self.schedule(scheduler, window, epoch, RetryPhase::Slow);
            return TrackState::SlowPoll { ticks: 0 };
        }
        self.schedule(scheduler, window, epoch, RetryPhase::Fast(1));
        TrackState::FastRetry(1)
    }

    /// Проверка не дала пригодного заголовка: планирует следующую и возвращает
    /// новое состояние окна. `Abandoned` означает, что опрос исчерпан.
    pub fn after_failed_check<S: Scheduler + ?Sized>(
        &self,
        scheduler: &S,
        window: WindowHandle,
        epoch: u64,
        state: TrackState,
    ) -> TrackState {
        match state {
            TrackState::FastRetry(attempt) if attempt < self.fast_attempts() => {
                let next = attempt + 1;
                self.schedule(scheduler, window, epoch, RetryPhase::Fast(next));
                TrackState::FastRetry(next)
            }
            TrackState::FastRetry(_) => {
                self.schedule(scheduler, window, epoch, RetryPhase::Slow);
                TrackState::SlowPoll { ticks: 0 }
            }
            TrackState::SlowPoll { ticks } => {
                let ticks = ticks.saturating_add(1);
                if self.max_slow_polls.is_some_and(|max| ticks >= max) {
                    warn!(
                        "Заголовок окна {} так и не стабилизировался за {} медленных опросов, прекращаем",
                        window, ticks
                    );
                    return TrackState::Abandoned;
                }
                self.schedule(scheduler, window, epoch, RetryPhase::Slow);
                TrackState::SlowPoll { ticks }
            }
            other => other,
        }
    }

    fn schedule<S: Scheduler + ?Sized>(
        &self,
        scheduler: &S,
        window: WindowHandle,
        epoch: u64,
        phase: RetryPhase,
    ) {
        scheduler.schedule_after(
            self.delay_for(phase),
            Timer::Check {
                window,
                epoch,
                phase,
            },
        );
    }
}
