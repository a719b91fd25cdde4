pub mod clock;
pub mod pattern;
pub mod runner;
pub mod scheduler;

pub use clock::{ClockSource, SimulatedClock, SystemClock};
pub use pattern::{find_pattern, flamenco_patterns, RhythmPattern};
pub use runner::SchedulerLoop;
pub use scheduler::{BeatScheduler, ScheduledBeat, Timing};
