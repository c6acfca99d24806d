use std::rc::{Rc, Weak};

use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use tomata_core::{Mode, SessionObserver, SessionTimer, TimerConfig};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a session in the foreground until interrupted (Ctrl-C)
    Run {
        /// Focus duration in seconds (overrides config)
        #[arg(long)]
        focus: Option<u64>,
        /// Short break duration in seconds (overrides config)
        #[arg(long)]
        short_break: Option<u64>,
        /// Long break duration in seconds (overrides config)
        #[arg(long)]
        long_break: Option<u64>,
        /// Focus sessions before a long break (overrides config)
        #[arg(long)]
        focus_limit: Option<u32>,
        /// Suppress per-second elapsed output
        #[arg(long)]
        quiet: bool,
    },
}

/// Prints session events as JSON lines; the engine holds it weakly.
struct JsonLineObserver {
    quiet: bool,
}

impl SessionObserver for JsonLineObserver {
    fn elapsed_time_updated(&self, elapsed_secs: u64) {
        if self.quiet {
            return;
        }
        emit(json!({
            "type": "elapsed",
            "elapsed_secs": elapsed_secs,
            "at": Utc::now(),
        }));
    }

    fn will_change_mode(&self, from: Mode, to: Mode) {
        emit(json!({
            "type": "will_change_mode",
            "from": from,
            "to": to,
            "ended": from.label(),
            "at": Utc::now(),
        }));
    }

    fn did_change_mode(&self, to: Mode) {
        emit(json!({
            "type": "mode_changed",
            "mode": to,
            "label": to.label(),
            "at": Utc::now(),
        }));
    }
}

fn emit(value: serde_json::Value) {
    println!("{value}");
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run {
            focus,
            short_break,
            long_break,
            focus_limit,
            quiet,
        } => run_session(focus, short_break, long_break, focus_limit, quiet),
    }
}

fn run_session(
    focus: Option<u64>,
    short_break: Option<u64>,
    long_break: Option<u64>,
    focus_limit: Option<u32>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = TimerConfig::load()?;
    if let Some(secs) = focus {
        config.set_duration_secs(Mode::Focus, secs)?;
    }
    if let Some(secs) = short_break {
        config.set_duration_secs(Mode::ShortBreak, secs)?;
    }
    if let Some(secs) = long_break {
        config.set_duration_secs(Mode::LongBreak, secs)?;
    }
    if let Some(limit) = focus_limit {
        config.set_focus_limit(limit)?;
    }
    tracing::debug!(?config, "session configuration resolved");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();

    runtime.block_on(local.run_until(async move {
        let observer: Rc<dyn SessionObserver> = Rc::new(JsonLineObserver { quiet });
        let mut timer = SessionTimer::new(config);
        {
            let weak: Weak<dyn SessionObserver> = Rc::downgrade(&observer);
            let mut engine = timer.engine().borrow_mut();
            engine.set_observer(weak);
        }

        timer.start();
        {
            let engine = timer.engine().borrow();
            emit(json!({
                "type": "session_started",
                "mode": engine.mode(),
                "duration_secs": engine.duration_secs(engine.mode()),
                "at": Utc::now(),
            }));
        }

        tokio::signal::ctrl_c().await?;
        timer.stop();
        emit(json!({
            "type": "session_stopped",
            "at": Utc::now(),
        }));
        Ok::<(), Box<dyn std::error::Error>>(())
    }))?;

    Ok(())
}
