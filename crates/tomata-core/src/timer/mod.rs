mod driver;
mod engine;

pub use driver::SessionTimer;
pub use engine::{Mode, SessionEngine, SessionObserver, SessionState};
