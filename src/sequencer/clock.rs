use std::time::Instant;

use parking_lot::Mutex;

use crate::error::ClockError;

/// Monotonic time base the scheduler plans against.
///
/// `now()` is in seconds from an arbitrary origin and never goes backwards
/// while the clock is active. `resume()`/`suspend()` are idempotent.
pub trait ClockSource: Send + Sync {
    fn now(&self) -> f64;

    fn resume(&self) -> Result<(), ClockError>;

    fn suspend(&self);

    /// Why the clock stopped delivering time, if it failed after resuming
    fn failure(&self) -> Option<String> {
        None
    }
}

/// Wall clock backed by `Instant`, for running without an audio device.
/// Time keeps advancing while suspended; only the flag changes.
pub struct SystemClock {
    origin: Instant,
    active: Mutex<bool>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            active: Mutex::new(false),
        }
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        *self.active.lock()
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn resume(&self) -> Result<(), ClockError> {
        *self.active.lock() = true;
        Ok(())
    }

    fn suspend(&self) {
        *self.active.lock() = false;
    }
}

/// Manually advanced clock for dry runs and tests.
///
/// Time only moves through `set`/`advance`, and only forwards. While
/// suspended, advancing is ignored. `fail_with` stands in for a lost
/// device: the clock freezes and `resume()` reports the failure.
pub struct SimulatedClock {
    state: Mutex<SimulatedState>,
}

struct SimulatedState {
    now: f64,
    active: bool,
    failure: Option<String>,
    resumes: usize,
}

impl SimulatedClock {
    pub fn new(start: f64) -> Self {
        Self {
            state: Mutex::new(SimulatedState {
                now: start,
                active: false,
                failure: None,
                resumes: 0,
            }),
        }
    }

    /// Jump to an absolute time; earlier times are clamped to now
    pub fn set(&self, t: f64) {
        let mut state = self.state.lock();
        if state.active && t > state.now {
            state.now = t;
        }
    }

    #[cfg(test)]
    pub fn advance(&self, dt: f64) {
        let mut state = self.state.lock();
        if state.active && dt > 0.0 {
            state.now += dt;
        }
    }

    #[cfg(test)]
    pub fn fail_with(&self, reason: impl Into<String>) {
        let mut state = self.state.lock();
        state.active = false;
        state.failure = Some(reason.into());
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    /// Number of successful resume() calls
    #[cfg(test)]
    pub fn resumes(&self) -> usize {
        self.state.lock().resumes
    }
}

impl ClockSource for SimulatedClock {
    fn now(&self) -> f64 {
        self.state.lock().now
    }

    fn resume(&self) -> Result<(), ClockError> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.failure {
            return Err(ClockError::Unavailable(reason.clone()));
        }
        state.active = true;
        state.resumes += 1;
        Ok(())
    }

    fn suspend(&self) {
        self.state.lock().active = false;
    }

    fn failure(&self) -> Option<String> {
        self.state.lock().failure.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_clock_is_monotonic() {
        let clock = SimulatedClock::new(1.0);
        clock.resume().unwrap();
        clock.set(2.5);
        clock.set(2.0);
        assert_eq!(clock.now(), 2.5);
        clock.advance(-1.0);
        assert_eq!(clock.now(), 2.5);
        clock.advance(0.25);
        assert_eq!(clock.now(), 2.75);
    }

    #[test]
    fn simulated_clock_freezes_while_suspended() {
        let clock = SimulatedClock::new(0.0);
        clock.advance(1.0);
        assert_eq!(clock.now(), 0.0);
        clock.resume().unwrap();
        clock.resume().unwrap();
        assert!(clock.is_active());
        clock.advance(1.0);
        clock.suspend();
        clock.suspend();
        clock.advance(1.0);
        assert_eq!(clock.now(), 1.0);
    }

    #[test]
    fn failed_clock_refuses_resume() {
        let clock = SimulatedClock::new(0.0);
        clock.fail_with("no device");
        assert_eq!(
            clock.resume(),
            Err(ClockError::Unavailable("no device".to_string()))
        );
        assert!(!clock.is_active());
        assert_eq!(clock.failure().as_deref(), Some("no device"));
    }

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock::new();
        clock.resume().unwrap();
        assert!(clock.is_active());
        let a = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(clock.now() > a);
        clock.suspend();
        assert!(!clock.is_active());
        assert_eq!(clock.failure(), None);
    }
}
