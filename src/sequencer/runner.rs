use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, select, tick, Sender};
use log::{debug, warn};
use parking_lot::Mutex;

use super::pattern::RhythmPattern;
use super::scheduler::{BeatScheduler, ScheduledBeat};
use crate::error::{SchedulerError, StateError};

/// The one live poll timer of a `SchedulerLoop`
struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Drives a `BeatScheduler` from a background thread that wakes every poll
/// interval and runs one tick. At most one worker exists at a time.
///
/// The beat callback runs on the worker thread with the scheduler locked,
/// so it must not call back into this loop.
pub struct SchedulerLoop {
    scheduler: Arc<Mutex<BeatScheduler>>,
    worker: Option<Worker>,
}

impl SchedulerLoop {
    pub fn new(scheduler: BeatScheduler) -> Self {
        Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            worker: None,
        }
    }

    pub fn configure(&self, pattern: RhythmPattern, tempo_bpm: f64) -> Result<(), SchedulerError> {
        self.scheduler.lock().configure(pattern, tempo_bpm)
    }

    pub fn start<F>(&mut self, on_beat: F) -> Result<(), SchedulerError>
    where
        F: FnMut(ScheduledBeat) + Send + 'static,
    {
        if self.scheduler.lock().is_running() {
            return Err(StateError::AlreadyRunning.into());
        }
        // A stopped scheduler may still have a worker winding down
        self.halt_worker();

        let poll_interval = {
            let mut scheduler = self.scheduler.lock();
            scheduler.start(on_beat)?;
            scheduler.timing().poll_interval()
        };

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticker = tick(poll_interval);
        let scheduler = self.scheduler.clone();
        let spawned = thread::Builder::new()
            .name("compas-scheduler".to_string())
            .spawn(move || loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => {
                        let mut scheduler = scheduler.lock();
                        if !scheduler.is_running() {
                            break;
                        }
                        scheduler.tick();
                    }
                }
            });

        match spawned {
            Ok(handle) => {
                debug!("Scheduler loop polling every {:?}", poll_interval);
                self.worker = Some(Worker { stop_tx, handle });
                Ok(())
            }
            Err(e) => {
                self.scheduler.lock().stop();
                Err(e.into())
            }
        }
    }

    /// Stop scheduling and tear down the poll thread. Safe to repeat.
    pub fn stop(&mut self) {
        self.scheduler.lock().stop();
        self.halt_worker();
    }

    pub fn current_beat(&self) -> u32 {
        self.scheduler.lock().current_beat()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.lock().is_running()
    }

    fn halt_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.try_send(());
            if worker.handle.join().is_err() {
                warn!("Scheduler thread panicked");
            }
        }
    }

    #[cfg(test)]
    pub fn tempo_bpm(&self) -> f64 {
        self.scheduler.lock().tempo_bpm()
    }

    #[cfg(test)]
    fn has_worker(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for SchedulerLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
