//! Async tick driver for the session engine.
//!
//! [`SessionTimer`] owns the recurring one-second tick task. The task is
//! spawned on `start()`, aborted synchronously on `pause()`/`stop()` and
//! on drop, so no tick can outlive a transition out of the running state.
//!
//! Everything runs on one logical thread: the task is spawned with
//! `spawn_local`, so the caller must be inside a tokio `LocalSet` on a
//! current-thread runtime.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::engine::{SessionEngine, SessionState};
use crate::config::TimerConfig;

/// Drives a [`SessionEngine`] at 1 Hz.
///
/// The tick is a logical counter, not a wall-clock measurement: a missed
/// interval slot is delayed, never burst, so the engine sees monotonic
/// one-second steps.
pub struct SessionTimer {
    engine: Rc<RefCell<SessionEngine>>,
    tick_task: Option<JoinHandle<()>>,
}

impl SessionTimer {
    pub fn new(config: TimerConfig) -> Self {
        Self::with_engine(SessionEngine::new(config))
    }

    pub fn with_engine(engine: SessionEngine) -> Self {
        Self {
            engine: Rc::new(RefCell::new(engine)),
            tick_task: None,
        }
    }

    /// Shared handle to the engine, e.g. for registering an observer.
    ///
    /// The engine is borrowed mutably for the duration of each tick, so
    /// observer callbacks must not borrow it re-entrantly.
    pub fn engine(&self) -> &Rc<RefCell<SessionEngine>> {
        &self.engine
    }

    /// Start or resume the session and spawn the tick task. No-op if
    /// already running; the existing task is left untouched.
    pub fn start(&mut self) {
        if self.engine.borrow().state() == SessionState::Running {
            return;
        }
        self.engine.borrow_mut().start();
        let engine = Rc::clone(&self.engine);
        self.tick_task = Some(tokio::task::spawn_local(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; the session
            // second starts now.
            interval.tick().await;
            loop {
                interval.tick().await;
                engine.borrow_mut().tick();
            }
        }));
    }

    /// Pause the session and cancel the tick task. No-op unless running.
    pub fn pause(&mut self) {
        if self.engine.borrow().state() != SessionState::Running {
            return;
        }
        self.engine.borrow_mut().pause();
        self.cancel_tick();
    }

    /// Stop the session, reset elapsed time and cancel the tick task.
    /// No-op if already stopped.
    pub fn stop(&mut self) {
        if self.engine.borrow().state() == SessionState::Stopped {
            return;
        }
        self.engine.borrow_mut().stop();
        self.cancel_tick();
    }

    fn cancel_tick(&mut self) {
        if let Some(task) = self.tick_task.take() {
            task.abort();
        }
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.cancel_tick();
    }
}
