use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::ClockError;
use crate::sequencer::ClockSource;

/// Clock driven by the output stream: time is frames rendered / sample rate.
///
/// The audio callback advances it once per buffer, so `now()` moves in
/// buffer-sized steps. While suspended the callback emits silence and the
/// frame count holds still.
pub struct AudioClock {
    frames: AtomicU64,
    sample_rate: f64,
    active: AtomicBool,
    failure: Mutex<Option<String>>,
}

impl AudioClock {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            frames: AtomicU64::new(0),
            sample_rate,
            active: AtomicBool::new(false),
            failure: Mutex::new(None),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Absolute output frame for a clock time
    pub fn frame_at(&self, seconds: f64) -> u64 {
        (seconds * self.sample_rate).round().max(0.0) as u64
    }

    pub(crate) fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::AcqRel);
    }

    /// Record a device failure; later resume() calls report it
    pub(crate) fn mark_failed(&self, reason: String) {
        self.active.store(false, Ordering::Release);
        *self.failure.lock() = Some(reason);
    }
}

impl ClockSource for AudioClock {
    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate
    }

    fn resume(&self) -> Result<(), ClockError> {
        if let Some(reason) = self.failure.lock().as_ref() {
            return Err(ClockError::Unavailable(reason.clone()));
        }
        self.active.store(true, Ordering::Release);
        Ok(())
    }

    fn suspend(&self) {
        self.active.store(false, Ordering::Release);
    }

    fn failure(&self) -> Option<String> {
        self.failure.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_follows_rendered_frames() {
        let clock = AudioClock::new(48000.0);
        clock.advance(24000);
        assert_eq!(clock.now(), 0.5);
        assert_eq!(clock.frame_at(0.5), 24000);
        assert_eq!(clock.frame_at(-1.0), 0);
    }

    #[test]
    fn failure_blocks_resume() {
        let clock = AudioClock::new(44100.0);
        clock.resume().unwrap();
        assert!(clock.is_active());
        assert_eq!(clock.failure(), None);
        clock.mark_failed("device unplugged".to_string());
        assert!(!clock.is_active());
        assert_eq!(clock.failure().as_deref(), Some("device unplugged"));
        assert!(clock.resume().is_err());
    }
}
