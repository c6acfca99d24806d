//! Session engine implementation.
//!
//! The session engine is a tick-counting state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` once
//! per logical second while the session is running ([`SessionTimer`] does
//! this with a tokio interval task).
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running <-> Paused
//!    ^          |
//!    +----------+  (stop resets elapsed time; mode and focus count survive)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(config);
//! engine.start();
//! // Once per second:
//! engine.tick(); // Notifies the observer; switches mode when time is up.
//! ```
//!
//! [`SessionTimer`]: super::SessionTimer

use std::fmt;
use std::rc::Weak;

use serde::{Deserialize, Serialize};

use crate::config::TimerConfig;
use crate::error::ConfigError;

/// The three timed phases of a Pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Mode {
    /// Human-readable label, suitable for notifications and titles.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Focus => "Focus",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of a session, orthogonal to [`Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Stopped,
    Running,
    Paused,
}

/// Observer contract for session events. All methods default to no-ops.
///
/// The engine holds the observer weakly and never extends its lifetime;
/// at most one observer is registered at a time.
///
/// Ordering within a single tick: `elapsed_time_updated` (if the engine
/// is running) precedes any mode-completion notifications, and
/// `will_change_mode` always precedes `did_change_mode`. Callbacks must
/// not re-enter the engine's command surface.
pub trait SessionObserver {
    /// Fired on each tick while running, with the updated elapsed time.
    fn elapsed_time_updated(&self, _elapsed_secs: u64) {}

    /// Fired once per completed mode, before the switch is committed.
    /// An observer reading the engine's mode at this point would still
    /// see `from`.
    fn will_change_mode(&self, _from: Mode, _to: Mode) {}

    /// Fired once per completed mode, after the switch is committed.
    fn did_change_mode(&self, _to: Mode) {}
}

/// The Pomodoro session state machine.
///
/// Owns its [`TimerConfig`]; remaining time is derived from the config
/// on every query, never cached, so duration edits apply to the mode in
/// progress. Invalid commands (e.g. `pause()` while stopped) are
/// silently absorbed as no-ops - no engine operation can fail.
///
/// Not thread-safe: all commands and ticks must run on one logical
/// thread.
#[derive(Debug)]
pub struct SessionEngine {
    config: TimerConfig,
    state: SessionState,
    mode: Mode,
    elapsed_secs: u64,
    /// Completed focus sessions since the last long break.
    focus_count: u32,
    observer: Option<Weak<dyn SessionObserver>>,
}

impl SessionEngine {
    /// Create a stopped engine in focus mode.
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            state: SessionState::Stopped,
            mode: Mode::Focus,
            elapsed_secs: 0,
            focus_count: 0,
            observer: None,
        }
    }

    /// Register the observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: Weak<dyn SessionObserver>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Seconds elapsed within the current mode.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Completed focus sessions since the last long break. Always less
    /// than the configured focus limit.
    pub fn focus_count(&self) -> u32 {
        self.focus_count
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Live-reconfiguration hook: edits are visible to the very next
    /// duration lookup.
    pub fn config_mut(&mut self) -> &mut TimerConfig {
        &mut self.config
    }

    pub fn duration_secs(&self, mode: Mode) -> u64 {
        self.config.duration_secs(mode)
    }

    /// Delegates to [`TimerConfig::set_duration_secs`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `secs` is zero.
    pub fn set_duration_secs(&mut self, mode: Mode, secs: u64) -> Result<(), ConfigError> {
        self.config.set_duration_secs(mode, secs)
    }

    /// Time remaining in the current mode, recomputed live as
    /// `duration - elapsed`. May be negative for at most one tick before
    /// the mode completion is processed.
    pub fn time_remaining_secs(&self) -> i64 {
        self.config.duration_secs(self.mode) as i64 - self.elapsed_secs as i64
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume the session. No-op if already running. Neither
    /// elapsed time nor mode is reset, so resuming from paused continues
    /// where it left off.
    pub fn start(&mut self) {
        if self.state == SessionState::Running {
            return;
        }
        self.state = SessionState::Running;
        tracing::debug!(mode = %self.mode, elapsed = self.elapsed_secs, "session started");
    }

    /// Pause the session. No-op unless running. Elapsed time and mode
    /// are preserved.
    pub fn pause(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        self.state = SessionState::Paused;
        tracing::debug!(mode = %self.mode, elapsed = self.elapsed_secs, "session paused");
    }

    /// Stop the session and reset elapsed time. No-op if already
    /// stopped. Mode and focus count are preserved across a stop; only a
    /// completed focus/long-break cycle resets the focus count.
    pub fn stop(&mut self) {
        if self.state == SessionState::Stopped {
            return;
        }
        self.state = SessionState::Stopped;
        self.elapsed_secs = 0;
        tracing::debug!(mode = %self.mode, "session stopped");
    }

    /// One logical second. While running, advances elapsed time and
    /// notifies the observer; completes the current mode once its
    /// configured duration is exhausted.
    pub fn tick(&mut self) {
        if self.state == SessionState::Running {
            self.elapsed_secs += 1;
            tracing::trace!(elapsed = self.elapsed_secs, "tick");
            self.notify(|observer| observer.elapsed_time_updated(self.elapsed_secs));
        }
        if self.time_remaining_secs() <= 0 {
            self.complete_mode();
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Switch to the next mode per the Pomodoro cadence: `focus_limit`
    /// focus sessions separated by short breaks, then one long break,
    /// then the cycle restarts.
    fn complete_mode(&mut self) {
        self.elapsed_secs = 0;
        let new_mode = match self.mode {
            Mode::Focus => {
                self.focus_count += 1;
                if self.focus_count < self.config.focus_limit() {
                    Mode::ShortBreak
                } else {
                    self.focus_count = 0;
                    Mode::LongBreak
                }
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Focus,
        };
        tracing::debug!(from = %self.mode, to = %new_mode, "mode completed");
        self.notify(|observer| observer.will_change_mode(self.mode, new_mode));
        self.mode = new_mode;
        self.notify(|observer| observer.did_change_mode(new_mode));
    }

    fn notify(&self, f: impl FnOnce(&dyn SessionObserver)) {
        if let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) {
            f(observer.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Recorded {
        Elapsed(u64),
        WillChange(Mode, Mode),
        DidChange(Mode),
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: RefCell<Vec<Recorded>>,
    }

    impl SessionObserver for RecordingObserver {
        fn elapsed_time_updated(&self, elapsed_secs: u64) {
            self.events.borrow_mut().push(Recorded::Elapsed(elapsed_secs));
        }
        fn will_change_mode(&self, from: Mode, to: Mode) {
            self.events.borrow_mut().push(Recorded::WillChange(from, to));
        }
        fn did_change_mode(&self, to: Mode) {
            self.events.borrow_mut().push(Recorded::DidChange(to));
        }
    }

    /// Reference fixture: focus=5s, shortBreak=2s, longBreak=3s, limit=2.
    fn fixture_engine() -> (SessionEngine, Rc<RecordingObserver>) {
        let config = TimerConfig::new(5, 2, 3, 2).unwrap();
        let mut engine = SessionEngine::new(config);
        let observer = Rc::new(RecordingObserver::default());
        let weak: Weak<dyn SessionObserver> = Rc::<RecordingObserver>::downgrade(&observer);
        engine.set_observer(weak);
        (engine, observer)
    }

    fn tick_n(engine: &mut SessionEngine, n: u64) {
        for _ in 0..n {
            engine.tick();
        }
    }

    #[test]
    fn durations_set_and_get() {
        let (mut engine, _observer) = fixture_engine();
        assert_eq!(engine.duration_secs(Mode::Focus), 5);
        assert_eq!(engine.duration_secs(Mode::ShortBreak), 2);
        assert_eq!(engine.duration_secs(Mode::LongBreak), 3);

        engine.set_duration_secs(Mode::Focus, 10).unwrap();
        engine.set_duration_secs(Mode::ShortBreak, 4).unwrap();
        engine.set_duration_secs(Mode::LongBreak, 6).unwrap();

        assert_eq!(engine.duration_secs(Mode::Focus), 10);
        assert_eq!(engine.duration_secs(Mode::ShortBreak), 4);
        assert_eq!(engine.duration_secs(Mode::LongBreak), 6);
    }

    #[test]
    fn start_pause_stop_transitions() {
        let (mut engine, _observer) = fixture_engine();
        assert_eq!(engine.state(), SessionState::Stopped);

        engine.start();
        assert_eq!(engine.state(), SessionState::Running);

        engine.pause();
        assert_eq!(engine.state(), SessionState::Paused);

        engine.start();
        assert_eq!(engine.state(), SessionState::Running);

        engine.stop();
        assert_eq!(engine.state(), SessionState::Stopped);
    }

    #[test]
    fn commands_are_idempotent() {
        let (mut engine, _observer) = fixture_engine();
        engine.start();
        tick_n(&mut engine, 2);
        engine.start(); // no-op
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.elapsed_secs(), 2);

        engine.pause();
        engine.pause(); // no-op
        assert_eq!(engine.state(), SessionState::Paused);
        assert_eq!(engine.elapsed_secs(), 2);

        engine.stop();
        engine.stop(); // no-op
        assert_eq!(engine.state(), SessionState::Stopped);
        assert_eq!(engine.elapsed_secs(), 0);
    }

    #[test]
    fn pause_while_stopped_is_absorbed() {
        let (mut engine, _observer) = fixture_engine();
        engine.pause();
        assert_eq!(engine.state(), SessionState::Stopped);
    }

    #[test]
    fn pause_preserves_elapsed_time() {
        let (mut engine, _observer) = fixture_engine();
        engine.start();
        tick_n(&mut engine, 3);
        engine.pause();
        assert_eq!(engine.elapsed_secs(), 3);

        // Ticks while paused change nothing.
        engine.tick();
        assert_eq!(engine.elapsed_secs(), 3);

        // Resuming continues where it left off.
        engine.start();
        engine.tick();
        assert_eq!(engine.elapsed_secs(), 4);
    }

    #[test]
    fn stop_resets_elapsed_but_preserves_mode_and_focus_count() {
        let (mut engine, _observer) = fixture_engine();
        engine.start();
        tick_n(&mut engine, 6); // focus done at t=5, one second into the short break
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.focus_count(), 1);
        assert_eq!(engine.elapsed_secs(), 1);

        engine.stop();
        assert_eq!(engine.elapsed_secs(), 0);
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.focus_count(), 1);
    }

    #[test]
    fn reference_scenario_full_cycle() {
        let (mut engine, _observer) = fixture_engine();
        engine.start();
        assert_eq!(engine.mode(), Mode::Focus);
        assert_eq!(engine.elapsed_secs(), 0);

        tick_n(&mut engine, 5); // t=5: focus -> short break
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.elapsed_secs(), 0);
        assert_eq!(engine.focus_count(), 1);

        tick_n(&mut engine, 2); // t=7: short break -> focus
        assert_eq!(engine.mode(), Mode::Focus);
        assert_eq!(engine.elapsed_secs(), 0);

        tick_n(&mut engine, 5); // t=12: second focus ends -> long break
        assert_eq!(engine.mode(), Mode::LongBreak);
        assert_eq!(engine.focus_count(), 0);

        tick_n(&mut engine, 3); // t=15: long break -> focus
        assert_eq!(engine.mode(), Mode::Focus);
        assert_eq!(engine.elapsed_secs(), 0);
    }

    #[test]
    fn event_ordering_on_mode_completion() {
        let (mut engine, observer) = fixture_engine();
        engine.start();
        tick_n(&mut engine, 5);

        let events = observer.events.borrow();
        assert_eq!(
            *events,
            vec![
                Recorded::Elapsed(1),
                Recorded::Elapsed(2),
                Recorded::Elapsed(3),
                Recorded::Elapsed(4),
                Recorded::Elapsed(5),
                Recorded::WillChange(Mode::Focus, Mode::ShortBreak),
                Recorded::DidChange(Mode::ShortBreak),
            ]
        );
    }

    #[test]
    fn live_reconfiguration_changes_remaining_time() {
        let (mut engine, _observer) = fixture_engine();
        engine.start();
        tick_n(&mut engine, 2);
        assert_eq!(engine.time_remaining_secs(), 3);

        engine.set_duration_secs(Mode::Focus, 10).unwrap();
        assert_eq!(engine.time_remaining_secs(), 8);
    }

    #[test]
    fn shortened_duration_overshoots_at_most_one_tick() {
        let (mut engine, _observer) = fixture_engine();
        engine.start();
        tick_n(&mut engine, 2);

        // Shrink the active mode below the already-elapsed time.
        engine.set_duration_secs(Mode::Focus, 1).unwrap();
        assert_eq!(engine.time_remaining_secs(), -1);

        // The next tick processes the completion and resets elapsed time.
        engine.tick();
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.elapsed_secs(), 0);
        assert!(engine.time_remaining_secs() > 0);
    }

    #[test]
    fn tick_while_stopped_changes_nothing() {
        let (mut engine, observer) = fixture_engine();
        tick_n(&mut engine, 3);
        assert_eq!(engine.elapsed_secs(), 0);
        assert_eq!(engine.mode(), Mode::Focus);
        assert!(observer.events.borrow().is_empty());
    }

    #[test]
    fn engine_survives_dropped_observer() {
        let (mut engine, observer) = fixture_engine();
        drop(observer);
        engine.start();
        tick_n(&mut engine, 6);
        assert_eq!(engine.mode(), Mode::ShortBreak);
    }

    #[test]
    fn registering_observer_replaces_previous() {
        let (mut engine, first) = fixture_engine();
        let second = Rc::new(RecordingObserver::default());
        let weak: Weak<dyn SessionObserver> = Rc::<RecordingObserver>::downgrade(&second);
        engine.set_observer(weak);

        engine.start();
        engine.tick();
        assert!(first.events.borrow().is_empty());
        assert_eq!(*second.events.borrow(), vec![Recorded::Elapsed(1)]);
    }

    #[test]
    fn mode_labels() {
        assert_eq!(Mode::Focus.to_string(), "Focus");
        assert_eq!(Mode::ShortBreak.to_string(), "Short Break");
        assert_eq!(Mode::LongBreak.to_string(), "Long Break");
    }

    proptest! {
        /// One long break after every `limit` completed focus sessions,
        /// and the focus count never reaches the limit.
        #[test]
        fn long_break_cadence(limit in 1u32..=8, cycles in 1usize..=4) {
            let config = TimerConfig::new(1, 1, 1, limit).unwrap();
            let mut engine = SessionEngine::new(config);
            engine.start();

            // With one-second modes, every tick completes a mode; a full
            // cycle (focus..short..focus, long) takes 2 * limit ticks.
            let mut long_breaks = 0;
            let mut prev = engine.mode();
            for _ in 0..(2 * limit as usize * cycles) {
                engine.tick();
                prop_assert!(engine.focus_count() < limit);
                let current = engine.mode();
                if prev != Mode::LongBreak && current == Mode::LongBreak {
                    long_breaks += 1;
                }
                prev = current;
            }

            prop_assert_eq!(long_breaks, cycles);
            prop_assert_eq!(engine.mode(), Mode::Focus);
            prop_assert_eq!(engine.elapsed_secs(), 0);
            prop_assert_eq!(engine.focus_count(), 0);
        }

        /// Remaining time is always derived as duration minus elapsed.
        #[test]
        fn remaining_is_always_derived(duration in 1u64..=600, ticks in 0u64..=100) {
            let config = TimerConfig::new(duration, 1, 1, 4).unwrap();
            let mut engine = SessionEngine::new(config);
            engine.start();
            for _ in 0..ticks.min(duration - 1) {
                engine.tick();
            }
            prop_assert_eq!(
                engine.time_remaining_secs(),
                engine.duration_secs(engine.mode()) as i64 - engine.elapsed_secs() as i64
            );
        }
    }
}
