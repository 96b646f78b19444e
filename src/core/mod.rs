// The real-time trainer engine. Everything in here is driven by timestamps
// the host passes in; no threads, no timers, no audio handles.

pub mod clock;
pub mod echo;
pub mod exercise;
pub mod scoring;
pub mod session;

pub use echo::Phase;
pub use exercise::{Exercise, Level, MAX_BARS, MIN_BARS, STEPS_PER_BAR, Step};
pub use scoring::{ScoreReport, StepResult};
pub use session::{Config, MAX_BPM, MIN_BPM, Session};
