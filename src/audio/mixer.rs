use std::sync::Arc;

use crate::command::AudioCommand;
use crate::synth::SampleBank;

/// Default per-instrument playback gain
pub const DEFAULT_VOLUME: f32 = 0.7;

/// One buffer pinned to an absolute start frame
struct Voice {
    samples: Arc<Vec<f32>>,
    start_frame: u64,
    gain: f32,
}

impl Voice {
    fn sample_at(&self, frame: u64) -> f32 {
        if frame < self.start_frame {
            return 0.0;
        }
        let index = (frame - self.start_frame) as usize;
        self.samples.get(index).map_or(0.0, |s| s * self.gain)
    }

    fn end_frame(&self) -> u64 {
        self.start_frame + self.samples.len() as u64
    }
}

/// Sample-accurate voice scheduler living on the audio thread
pub struct VoiceMixer {
    bank: SampleBank,
    voices: Vec<Voice>,
    volumes: [f32; 4],
}

impl VoiceMixer {
    pub fn new(bank: SampleBank, volumes: [f32; 4]) -> Self {
        Self {
            bank,
            voices: Vec::with_capacity(64),
            volumes: volumes.map(|v| v.clamp(0.0, 1.0)),
        }
    }

    /// Apply a control command. `now_frame` is the first frame of the
    /// buffer about to be rendered; voices already late start there, and a
    /// cancel never reaches voices that started before it.
    pub fn apply(&mut self, cmd: AudioCommand, now_frame: u64) {
        match cmd {
            AudioCommand::Schedule { at_frame, sound } => {
                self.voices.push(Voice {
                    samples: self.bank.get(sound),
                    start_frame: at_frame.max(now_frame),
                    gain: self.volumes[sound.instrument.index()],
                });
            }
            AudioCommand::CancelFrom(frame) => {
                let from = frame.max(now_frame);
                self.voices.retain(|v| v.start_frame < from);
            }
        }
    }

    /// Mono mix for one frame
    pub fn render_frame(&self, frame: u64) -> f32 {
        soft_clip(self.voices.iter().map(|v| v.sample_at(frame)).sum())
    }

    /// Forget voices that finished before `frame`
    pub fn prune(&mut self, frame: u64) {
        self.voices.retain(|v| v.end_frame() > frame);
    }

    #[cfg(test)]
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }
}

/// Soft clipping function to prevent harsh digital clipping
fn soft_clip(x: f32) -> f32 {
    if x > 1.0 {
        1.0 - (-x + 1.0).exp() * 0.5
    } else if x < -1.0 {
        -1.0 + (x + 1.0).exp() * 0.5
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{Instrument, SoundKey};

    const PALO_ACCENT: SoundKey = SoundKey {
        instrument: Instrument::Palo,
        accent: true,
    };

    fn mixer() -> VoiceMixer {
        VoiceMixer::new(SampleBank::tones(1000.0), [1.0; 4])
    }

    #[test]
    fn voice_starts_on_its_frame() {
        let mut mixer = mixer();
        mixer.apply(
            AudioCommand::Schedule {
                at_frame: 500,
                sound: PALO_ACCENT,
            },
            0,
        );
        assert_eq!(mixer.render_frame(499), 0.0);
        assert!((mixer.render_frame(500) - 0.3).abs() < 1e-6);
        mixer.prune(600);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn late_voice_plays_immediately() {
        let mut mixer = mixer();
        mixer.apply(
            AudioCommand::Schedule {
                at_frame: 10,
                sound: PALO_ACCENT,
            },
            200,
        );
        assert!((mixer.render_frame(200) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn cancel_drops_only_future_voices() {
        let mut mixer = mixer();
        for at_frame in [100, 300, 500] {
            mixer.apply(
                AudioCommand::Schedule {
                    at_frame,
                    sound: PALO_ACCENT,
                },
                0,
            );
        }
        mixer.apply(AudioCommand::CancelFrom(300), 150);
        assert_eq!(mixer.active_voices(), 1);
        assert!(mixer.render_frame(150) != 0.0);
        assert_eq!(mixer.render_frame(300), 0.0);
    }

    #[test]
    fn cancel_issued_late_lets_started_voices_ring() {
        let mut mixer = mixer();
        for at_frame in [120, 180] {
            mixer.apply(
                AudioCommand::Schedule {
                    at_frame,
                    sound: PALO_ACCENT,
                },
                0,
            );
        }
        // cancel stamped at 100 but applied once rendering reached 150
        mixer.apply(AudioCommand::CancelFrom(100), 150);
        assert_eq!(mixer.active_voices(), 1);

        let mut only_first = self::mixer();
        only_first.apply(
            AudioCommand::Schedule {
                at_frame: 120,
                sound: PALO_ACCENT,
            },
            0,
        );
        assert!(mixer.render_frame(150) != 0.0);
        assert_eq!(mixer.render_frame(200), only_first.render_frame(200));
    }

    #[test]
    fn volume_scales_voices() {
        let mut volumes = [1.0; 4];
        volumes[Instrument::Palo.index()] = 0.5;
        volumes[Instrument::Jaleo.index()] = 3.0;
        let mut mixer = VoiceMixer::new(SampleBank::tones(1000.0), volumes);
        assert_eq!(mixer.volumes[Instrument::Jaleo.index()], 1.0);
        mixer.apply(
            AudioCommand::Schedule {
                at_frame: 0,
                sound: PALO_ACCENT,
            },
            0,
        );
        assert!((mixer.render_frame(0) - 0.15).abs() < 1e-6);
    }

    #[test]
    fn soft_clip_bounds_output() {
        assert_eq!(soft_clip(0.5), 0.5);
        assert!(soft_clip(3.0) < 1.0);
        assert!(soft_clip(-3.0) > -1.0);
    }
}
