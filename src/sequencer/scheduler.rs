use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, trace};

use super::clock::ClockSource;
use super::pattern::RhythmPattern;
use crate::error::{ClockError, SchedulerError, StateError};

/// How often the poll loop wakes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);
/// How far ahead of the clock beats are committed (seconds)
pub const DEFAULT_SCHEDULE_HORIZON: f64 = 0.1;

/// Poll interval and lookahead horizon. The horizon is at least twice the
/// poll interval so a late wake never discovers a beat after its time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    poll_interval: Duration,
    horizon_secs: f64,
}

impl Timing {
    pub fn new(poll_interval: Duration, horizon_secs: f64) -> Result<Self, SchedulerError> {
        let poll_secs = poll_interval.as_secs_f64();
        if poll_interval.is_zero() || !horizon_secs.is_finite() || horizon_secs < 2.0 * poll_secs
        {
            return Err(SchedulerError::InvalidTiming {
                poll_ms: poll_interval.as_millis() as u64,
                horizon_secs,
            });
        }
        Ok(Self {
            poll_interval,
            horizon_secs,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn horizon_secs(&self) -> f64 {
        self.horizon_secs
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            horizon_secs: DEFAULT_SCHEDULE_HORIZON,
        }
    }
}

/// One committed beat: logical beat number (1-based), the absolute clock
/// time it must sound at, and whether the pattern accents it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledBeat {
    pub number: u32,
    pub time: f64,
    pub accent: bool,
}

pub type BeatCallback = Box<dyn FnMut(ScheduledBeat) + Send>;

/// Lookahead beat scheduler.
///
/// Each `tick()` commits every beat whose time falls before
/// `clock.now() + horizon`, handing it to the callback with its absolute
/// time, and recomputes the display beat from elapsed time alone. Nothing
/// here sleeps; the poll cadence belongs to whoever calls `tick()`
/// (see `SchedulerLoop`).
pub struct BeatScheduler {
    clock: Option<Arc<dyn ClockSource>>,
    timing: Timing,
    pattern: Option<RhythmPattern>,
    tempo_bpm: f64,
    seconds_per_beat: f64,
    start_time: f64,
    next_time: f64,
    beats_scheduled: u64,
    last_beat: u32,
    display_beat: u32,
    on_beat: Option<BeatCallback>,
    running: bool,
}

impl BeatScheduler {
    pub fn new(clock: Arc<dyn ClockSource>, timing: Timing) -> Self {
        let mut scheduler = Self::detached(timing);
        scheduler.clock = Some(clock);
        scheduler
    }

    /// A scheduler with no clock yet; `start()` reports the clock as unavailable
    pub fn detached(timing: Timing) -> Self {
        Self {
            clock: None,
            timing,
            pattern: None,
            tempo_bpm: 0.0,
            seconds_per_beat: 0.0,
            start_time: 0.0,
            next_time: 0.0,
            beats_scheduled: 0,
            last_beat: 0,
            display_beat: 0,
            on_beat: None,
            running: false,
        }
    }

    #[cfg(test)]
    pub fn attach_clock(&mut self, clock: Arc<dyn ClockSource>) -> Result<(), SchedulerError> {
        if self.running {
            return Err(StateError::ReconfigureWhileActive.into());
        }
        self.clock = Some(clock);
        Ok(())
    }

    /// Replace pattern and tempo. Refused while running; stop first.
    pub fn configure(&mut self, pattern: RhythmPattern, tempo_bpm: f64) -> Result<(), SchedulerError> {
        if self.running {
            return Err(StateError::ReconfigureWhileActive.into());
        }
        if !(tempo_bpm.is_finite() && tempo_bpm > 0.0) {
            return Err(SchedulerError::InvalidTempo(tempo_bpm));
        }
        debug!(
            "Scheduler configured: {} ({} beats) at {} bpm",
            pattern.name(),
            pattern.beat_count(),
            tempo_bpm
        );
        self.pattern = Some(pattern);
        self.tempo_bpm = tempo_bpm;
        self.seconds_per_beat = 60.0 / tempo_bpm;
        Ok(())
    }

    /// Begin scheduling from the clock's current time. Beat 1 lands at
    /// that instant; the first tick runs before this returns.
    pub fn start<F>(&mut self, on_beat: F) -> Result<(), SchedulerError>
    where
        F: FnMut(ScheduledBeat) + Send + 'static,
    {
        if self.running {
            return Err(StateError::AlreadyRunning.into());
        }
        let beat_count = match &self.pattern {
            Some(pattern) => pattern.beat_count(),
            None => return Err(StateError::NotConfigured.into()),
        };
        let clock = self
            .clock
            .clone()
            .ok_or_else(|| ClockError::Unavailable("no clock attached".to_string()))?;
        clock.resume()?;

        let now = clock.now();
        self.start_time = now;
        self.next_time = now;
        self.beats_scheduled = 0;
        // Sentinel: the beat before 1, so the first committed beat is 1
        self.last_beat = beat_count;
        self.display_beat = 0;
        self.on_beat = Some(Box::new(on_beat));
        self.running = true;

        info!("Scheduler started at t={:.3}s, {} bpm", now, self.tempo_bpm);
        self.tick();
        Ok(())
    }

    /// Halt scheduling and clear the display beat. Safe to repeat.
    pub fn stop(&mut self) {
        self.display_beat = 0;
        if !self.running {
            return;
        }
        self.running = false;
        self.on_beat = None;
        info!(
            "Scheduler stopped after {} beats",
            self.beats_scheduled
        );
    }

    /// One poll: refresh the display beat, then drain every beat inside the
    /// horizon. Returns how many beats were committed.
    pub fn tick(&mut self) -> usize {
        if !self.running {
            return 0;
        }
        let (Some(clock), Some(pattern)) = (self.clock.as_ref(), self.pattern.as_ref()) else {
            return 0;
        };

        let now = clock.now();
        let elapsed = (now - self.start_time).max(0.0);
        let beat_index = (elapsed / self.seconds_per_beat).floor() as u64;
        let beat_count = pattern.beat_count();
        self.display_beat = (beat_index % beat_count as u64) as u32 + 1;

        let horizon = now + self.timing.horizon_secs;
        let mut committed = 0;
        while self.next_time < horizon {
            let number = (self.last_beat % beat_count) + 1;
            let beat = ScheduledBeat {
                number,
                time: self.next_time,
                accent: pattern.is_accent(number),
            };
            if let Some(on_beat) = self.on_beat.as_mut() {
                on_beat(beat);
            }

            self.beats_scheduled += 1;
            // Anchored to the start time so rounding never accumulates
            self.next_time =
                self.start_time + self.beats_scheduled as f64 * self.seconds_per_beat;
            self.last_beat = number;
            committed += 1;
        }

        if committed > 1 {
            trace!("Committed {} beats in one tick at t={:.3}s", committed, now);
        }
        committed
    }

    /// Beat sounding right now (1-based), 0 when stopped
    pub fn current_beat(&self) -> u32 {
        self.display_beat
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub fn is_configured(&self) -> bool {
        self.pattern.is_some()
    }

    #[cfg(test)]
    pub fn pattern(&self) -> Option<&RhythmPattern> {
        self.pattern.as_ref()
    }

    #[cfg(test)]
    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm
    }

    #[cfg(test)]
    pub fn seconds_per_beat(&self) -> f64 {
        self.seconds_per_beat
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    #[cfg(test)]
    pub fn next_scheduled_time(&self) -> f64 {
        self.next_time
    }

    #[cfg(test)]
    pub fn last_scheduled_beat(&self) -> u32 {
        self.last_beat
    }
}
