use thiserror::Error;

/// Misuse of the scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("already running")]
    AlreadyRunning,
    #[error("not configured")]
    NotConfigured,
    #[error("cannot reconfigure while active")]
    ReconfigureWhileActive,
}

/// The clock source could not be brought up
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("clock unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    ClockUnavailable(#[from] ClockError),

    #[error("tempo must be a positive number of beats per minute, got {0}")]
    InvalidTempo(f64),

    #[error("schedule horizon {horizon_secs}s must be at least twice the poll interval {poll_ms}ms")]
    InvalidTiming { poll_ms: u64, horizon_secs: f64 },

    #[error("failed to spawn scheduler thread: {0}")]
    Worker(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("a pattern needs at least one beat")]
    NoBeats,

    #[error("accent {position} lies outside beats 1..={beat_count}")]
    AccentOutOfRange { position: u32, beat_count: u32 },

    #[error("subdivision must be at least 1")]
    ZeroSubdivision,

    #[error("accent mask has {mask_len} entries but the pattern has {beat_count} beats")]
    MaskLength { mask_len: usize, beat_count: u32 },

    #[error("give accents either as positions or as a mask, not both")]
    MaskAndAccents,
}
