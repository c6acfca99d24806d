//! # Tomata Core Library
//!
//! This library provides the core logic for the Tomata Pomodoro timer:
//! a countdown session engine that alternates focus and break modes with
//! a configurable long-break cadence. Presentation layers (CLI, GUI,
//! system notifications) sit on top of this crate and interact with it
//! through three surfaces:
//!
//! - configure it via [`TimerConfig`]
//! - drive it via `start`/`pause`/`stop` commands
//! - observe its transition events via [`SessionObserver`]
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: the timer state machine. Pure and caller-ticked;
//!   one call to `tick()` is one logical second.
//! - [`SessionTimer`]: async driver that owns the recurring one-second
//!   tick task for an engine.
//! - [`TimerConfig`]: the four tunable durations/limits, persisted as TOML.

pub mod config;
pub mod error;
pub mod timer;

pub use config::TimerConfig;
pub use error::ConfigError;
pub use timer::{Mode, SessionEngine, SessionObserver, SessionState, SessionTimer};
