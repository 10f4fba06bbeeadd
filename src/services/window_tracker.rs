use crate::events::WindowHandle;
use std::collections::HashMap;
use std::fmt;

/// Состояние отслеживания заголовка конкретного окна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackState {
    Untracked,
    /// Ожидается быстрая перепроверка с этим номером попытки
    FastRetry(u8),
    /// Медленный опрос; `ticks` — сколько медленных проверок уже не удалось
    SlowPoll { ticks: u32 },
    Resolved,
    Abandoned,
}

impl TrackState {
    /// Окно входит в множество опрашиваемых
    pub fn is_polled(&self) -> bool {
        matches!(self, TrackState::FastRetry(_) | TrackState::SlowPoll { .. })
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackState::Untracked => write!(f, "untracked"),
            TrackState::FastRetry(attempt) => write!(f, "fast-retry({})", attempt),
            TrackState::SlowPoll { ticks } => write!(f, "slow-poll({})", ticks),
            TrackState::Resolved => write!(f, "resolved"),
            TrackState::Abandoned => write!(f, "abandoned"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Tracked {
    state: TrackState,
    epoch: u64,
}

/// WindowTracker holds the derived polling state of the monitor.
///
/// Responsibilities (strict):
/// - Remember which window was last activated with a suspicious title.
/// - Keep a tagged [`TrackState`] per live window handle; the polled set is
///   every handle in `FastRetry` or `SlowPoll`.
/// - Hand out epochs so that timers of an earlier tracking run can be told apart.
/// - Do NOT read titles, schedule timers or publish anything.
#[derive(Debug, Default)]
pub struct WindowTracker {
    last_active: Option<WindowHandle>,
    windows: HashMap<WindowHandle, Tracked>,
    next_epoch: u64,
}

impl WindowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_active(&self) -> Option<WindowHandle> {
        self.last_active
    }

    pub fn state(&self, window: WindowHandle) -> TrackState {
        self.windows
            .get(&window)
            .map(|tracked| tracked.state)
            .unwrap_or(TrackState::Untracked)
    }

    pub fn is_polled(&self, window: WindowHandle) -> bool {
        self.state(window).is_polled()
    }

    pub fn polled(&self) -> Vec<WindowHandle> {
        let mut polled: Vec<WindowHandle> = self
            .windows
            .iter()
            .filter(|(_, tracked)| tracked.state.is_polled())
            .map(|(window, _)| *window)
            .collect();
        polled.sort();
        polled
    }

    /// Таймер относится к текущему прогону отслеживания окна
    pub fn is_current(&self, window: WindowHandle, epoch: u64) -> bool {
        self.windows
            .get(&window)
            .is_some_and(|tracked| tracked.epoch == epoch && tracked.state.is_polled())
    }

    /// Активация окна: все остальные опрашиваемые окна бросаются.
    /// Для подозрительного заголовка окно запоминается и получает новую эпоху.
    pub fn activate(&mut self, window: WindowHandle, needs_retry: bool) -> Option<u64> {
        self.abandon_all_except(Some(window));

        if needs_retry {
            let epoch = self.next_epoch;
            self.next_epoch += 1;
            self.last_active = Some(window);
            self.windows.insert(
                window,
                Tracked {
                    state: TrackState::FastRetry(1),
                    epoch,
                },
            );
            Some(epoch)
        } else {
            self.last_active = None;
            // Повторная активация с хорошим заголовком завершает прежний опрос
            if let Some(tracked) = self.windows.get_mut(&window) {
                if tracked.state.is_polled() {
                    tracked.state = TrackState::Resolved;
                }
            }
            None
        }
    }

    /// Активного окна нет: бросаем всё
    pub fn deactivate(&mut self) {
        self.abandon_all_except(None);
        self.last_active = None;
    }

    /// Бросает опрос всех окон, кроме `keep`; возвращает брошенные окна
    pub fn abandon_all_except(&mut self, keep: Option<WindowHandle>) -> Vec<WindowHandle> {
        let mut abandoned = Vec::new();
        for (window, tracked) in self.windows.iter_mut() {
            if Some(*window) != keep && tracked.state.is_polled() {
                tracked.state = TrackState::Abandoned;
                abandoned.push(*window);
            }
        }
        if let Some(last) = self.last_active {
            if Some(last) != keep {
                self.last_active = None;
            }
        }
        abandoned.sort();
        abandoned
    }

    pub fn advance(&mut self, window: WindowHandle, state: TrackState) {
        if let Some(tracked) = self.windows.get_mut(&window) {
            tracked.state = state;
        }
        if !state.is_polled() && self.last_active == Some(window) {
            self.last_active = None;
        }
    }

    pub fn resolve(&mut self, window: WindowHandle) {
        self.advance(window, TrackState::Resolved);
    }

    pub fn abandon(&mut self, window: WindowHandle) {
        self.advance(window, TrackState::Abandoned);
    }

    /// Окно уничтожено: забываем его полностью
    pub fn forget(&mut self, window: WindowHandle) -> TrackState {
        if self.last_active == Some(window) {
            self.last_active = None;
        }
        self.windows
            .remove(&window)
            .map(|tracked| tracked.state)
            .unwrap_or(TrackState::Untracked)
    }
}
