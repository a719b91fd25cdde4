use std::sync::Arc;

use parking_lot::RwLock;

use super::clock::AudioClock;
use crate::command::{AudioCommand, CommandSender};
use crate::sequencer::{ClockSource, ScheduledBeat};
use crate::synth::{SoundKey, SoundSet};

/// Turns scheduled beats into sample-accurate voice starts on the audio
/// thread. Cloned into the scheduler's beat callback.
#[derive(Clone)]
pub struct ClickTrigger {
    sender: CommandSender,
    clock: Arc<AudioClock>,
    sounds: Arc<RwLock<SoundSet>>,
    fallback: bool,
}

impl ClickTrigger {
    pub fn new(
        sender: CommandSender,
        clock: Arc<AudioClock>,
        sounds: Arc<RwLock<SoundSet>>,
        fallback: bool,
    ) -> Self {
        Self {
            sender,
            clock,
            sounds,
            fallback,
        }
    }

    /// Queue every voice for this beat at the beat's absolute time.
    /// Returns the number of voices sent.
    pub fn trigger(&self, beat: &ScheduledBeat) -> usize {
        let at_frame = self.clock.frame_at(beat.time);
        let voices = self.sounds.read().voices(beat.accent, self.fallback);
        let mut sent = 0;
        for instrument in voices {
            let sound = SoundKey {
                instrument,
                accent: beat.accent,
            };
            if self.sender.send(AudioCommand::Schedule { at_frame, sound }) {
                sent += 1;
            }
        }
        sent
    }

    /// Cancel voices queued for `seconds` or later
    pub fn cancel_from(&self, seconds: f64) {
        self.sender
            .send(AudioCommand::CancelFrom(self.clock.frame_at(seconds)));
    }

    /// Cancel everything that has not started sounding yet
    pub fn cancel_pending(&self) {
        self.cancel_from(self.clock.now());
    }
}
