//! ActiveClientMonitor: the notification state machine.
//!
//! For every lifecycle event it decides what to publish and whether the new
//! active window needs its title re-checked. Per-window state lives in
//! [`WindowTracker`] and moves only through the handlers below:
//!
//! ```text
//! Untracked -> FastRetry(1..n) -> SlowPoll -> Resolved | Abandoned
//! ```
//!
//! `Resolved` publishes exactly one `Changed`; `Abandoned` publishes nothing.

use crate::events::{NotificationEvent, NotificationKind, WindowHandle, WindowInfo};
use crate::services::lifecycle::{LifecycleObserver, WindowDirectory};
use crate::services::publisher::NotificationPublisher;
use crate::services::retry_sequencer::RetrySequencer;
use crate::services::scheduler::{RetryPhase, Scheduler, Timer};
use crate::services::title_quality::is_usable;
use crate::services::window_tracker::{TrackState, WindowTracker};
use crate::{debug_if_enabled, trace_if_enabled};
use std::collections::HashSet;
use tokio::time::Duration;
use tracing::{info, warn};

pub struct ActiveClientMonitor<S: Scheduler, P: NotificationPublisher> {
    tracker: WindowTracker,
    sequencer: RetrySequencer,
    scheduler: S,
    publisher: P,
    // Окна, на изменения заголовка которых мы подписаны
    subscribed: HashSet<WindowHandle>,
    started: bool,
}

impl<S: Scheduler, P: NotificationPublisher> ActiveClientMonitor<S, P> {
    pub fn new(sequencer: RetrySequencer, scheduler: S, publisher: P) -> Self {
        Self {
            tracker: WindowTracker::new(),
            sequencer,
            scheduler,
            publisher,
            subscribed: HashSet::new(),
            started: false,
        }
    }

    /// Планирует публикацию начального состояния; повторный вызов ничего не делает
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.scheduler.schedule_after(Duration::ZERO, Timer::Initial);
    }

    #[allow(dead_code)]
    pub fn tracker(&self) -> &WindowTracker {
        &self.tracker
    }

    #[allow(dead_code)]
    pub fn state(&self, window: WindowHandle) -> TrackState {
        self.tracker.state(window)
    }

    #[allow(dead_code)]
    pub fn is_subscribed(&self, window: WindowHandle) -> bool {
        self.subscribed.contains(&window)
    }

    pub fn handle_timer(&mut self, windows: &dyn WindowDirectory, timer: Timer) {
        trace_if_enabled!("Сработал таймер: {}", timer);

        match timer {
            Timer::Initial => self.emit_initial_state(windows),
            Timer::Reevaluate => self.on_activated(windows),
            Timer::Check {
                window,
                epoch,
                phase,
            } => self.recheck_title(windows, window, epoch, phase),
        }
    }

    fn emit_initial_state(&mut self, windows: &dyn WindowDirectory) {
        match windows.active_window_info() {
            Some((window, info)) => {
                info!("Начальное активное окно {}: {}", window, info);
                self.emit(NotificationKind::Initial, &info);
            }
            None => info!("Активного окна нет, начальное состояние не публикуется"),
        }
    }

    fn recheck_title(
        &mut self,
        windows: &dyn WindowDirectory,
        window: WindowHandle,
        epoch: u64,
        phase: RetryPhase,
    ) {
        // Таймер от прежнего прогона: окно уже разрешено, брошено или перезапущено
        if !self.tracker.is_current(window, epoch) {
            trace_if_enabled!("Таймер окна {} устарел (epoch {}), пропускаем", window, epoch);
            return;
        }

        let active = windows.active_window();

        if phase == RetryPhase::Slow {
            for abandoned in self.tracker.abandon_all_except(active) {
                debug_if_enabled!("Окно {} больше не активно, опрос прекращён", abandoned);
            }
        }

        if active != Some(window) {
            debug_if_enabled!("Окно {} больше не активно, перепроверки прекращены", window);
            self.tracker.abandon(window);
            return;
        }

        let Some(info) = windows.window(window) else {
            self.tracker.abandon(window);
            return;
        };

        if is_usable(&info.class, &info.title) {
            info!("Заголовок окна {} стабилизировался: {}", window, info);
            self.tracker.resolve(window);
            self.emit(NotificationKind::Changed, &info);
            return;
        }

        let next =
            self.sequencer
                .after_failed_check(&self.scheduler, window, epoch, self.tracker.state(window));
        debug_if_enabled!("Заголовок окна {} всё ещё временный ({}), далее {}", window, info, next);
        self.tracker.advance(window, next);
    }

    fn emit(&self, kind: NotificationKind, info: &WindowInfo) {
        let event = NotificationEvent::new(kind, info);
        debug_if_enabled!("Публикация: {}", event);

        // Ошибка публикации не влияет на состояние отслеживания
        if let Err(e) = self.publisher.publish(event) {
            warn!("Не удалось опубликовать {} для {}: {}", kind, info, e);
        }
    }
}

impl<S: Scheduler, P: NotificationPublisher> LifecycleObserver for ActiveClientMonitor<S, P> {
    fn on_activated(&mut self, windows: &dyn WindowDirectory) {
        let Some((window, info)) = windows.active_window_info() else {
            debug_if_enabled!("Активного окна нет");
            self.tracker.deactivate();
            return;
        };

        info!("Активное окно изменено на {}: {}", window, info);
        self.emit(NotificationKind::Changed, &info);

        let needs_retry = !is_usable(&info.class, &info.title);
        if let Some(epoch) = self.tracker.activate(window, needs_retry) {
            debug_if_enabled!("Заголовок окна {} похож на временный, запускаем перепроверки", window);
            let state = self.sequencer.start_fast_retry(&self.scheduler, window, epoch);
            self.tracker.advance(window, state);
        }
    }

    fn on_added(&mut self, windows: &dyn WindowDirectory, window: WindowHandle) {
        let Some(info) = windows.window(window) else {
            warn!("Добавленное окно {} не найдено у композитора", window);
            return;
        };

        debug_if_enabled!("Создано окно {}: {}", window, info);
        self.emit(NotificationKind::Created, &info);
        self.subscribed.insert(window);
    }

    fn on_adopted(&mut self, _windows: &dyn WindowDirectory, window: WindowHandle) {
        debug_if_enabled!("Подписка на заголовок существующего окна {}", window);
        self.subscribed.insert(window);
    }

    fn on_removed(
        &mut self,
        _windows: &dyn WindowDirectory,
        window: WindowHandle,
        last_known: &WindowInfo,
    ) {
        let state = self.tracker.forget(window);
        self.subscribed.remove(&window);

        debug_if_enabled!("Окно {} уничтожено (состояние {}): {}", window, state, last_known);
        self.emit(NotificationKind::Destroyed, last_known);

        // Композитор мог уже передать фокус другому окну
        self.scheduler.schedule_after(Duration::ZERO, Timer::Reevaluate);
    }

    fn on_caption_changed(&mut self, windows: &dyn WindowDirectory, window: WindowHandle) {
        if !self.subscribed.contains(&window) {
            trace_if_enabled!("Окно {} без подписки, заголовок игнорируется", window);
            return;
        }

        if windows.active_window() != Some(window) {
            trace_if_enabled!("Заголовок фонового окна {} изменён, игнорируем", window);
            return;
        }

        let Some(info) = windows.window(window) else {
            return;
        };

        if self.tracker.is_polled(window) && is_usable(&info.class, &info.title) {
            debug_if_enabled!("Окно {} получило настоящий заголовок, опрос не нужен", window);
            self.tracker.resolve(window);
        }

        self.emit(NotificationKind::Changed, &info);
    }
}
