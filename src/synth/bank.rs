use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::{info, warn};

use super::instrument::Instrument;
use super::tone::render_tone;
use super::wav::load_wav;
use crate::samples::{resolve_sample_path, SampleConfig};

/// Identifies one playable buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundKey {
    pub instrument: Instrument,
    pub accent: bool,
}

/// Accent and regular buffers for every instrument, decoded once up front.
/// Either all eight come from WAV files or all are synthesized tones.
pub struct SampleBank {
    // [instrument][0 = regular, 1 = accent]
    buffers: [[Arc<Vec<f32>>; 2]; 4],
    fallback: bool,
}

impl SampleBank {
    /// Load every configured sample; if any one fails, use tones for all
    pub fn load(config: &SampleConfig, dirs: &[PathBuf], sample_rate: f32) -> Self {
        match Self::load_samples(config, dirs, sample_rate) {
            Ok(bank) => {
                info!("Loaded {} samples", Instrument::ALL.len() * 2);
                bank
            }
            Err(e) => {
                warn!("Falling back to synthesized clicks: {:#}", e);
                Self::tones(sample_rate)
            }
        }
    }

    fn load_samples(config: &SampleConfig, dirs: &[PathBuf], sample_rate: f32) -> Result<Self> {
        let load = |instrument: Instrument, accent: bool| -> Result<Arc<Vec<f32>>> {
            let name = config.paths(instrument).for_accent(accent);
            let path = resolve_sample_path(name, dirs)
                .ok_or_else(|| anyhow!("Sample not found: {}", name))?;
            Ok(Arc::new(load_wav(&path, sample_rate)?))
        };

        let mut buffers = Vec::with_capacity(4);
        for instrument in Instrument::ALL {
            buffers.push([load(instrument, false)?, load(instrument, true)?]);
        }
        let buffers: [[Arc<Vec<f32>>; 2]; 4] = buffers
            .try_into()
            .map_err(|_| anyhow!("Incomplete sample bank"))?;

        Ok(Self {
            buffers,
            fallback: false,
        })
    }

    /// Synthesized tones for every instrument
    pub fn tones(sample_rate: f32) -> Self {
        let render = |instrument: Instrument, accent: bool| {
            Arc::new(render_tone(
                instrument.tone_frequency(accent),
                instrument.waveform(),
                sample_rate,
            ))
        };
        let buffers = Instrument::ALL.map(|i| [render(i, false), render(i, true)]);
        Self {
            buffers,
            fallback: true,
        }
    }

    pub fn get(&self, key: SoundKey) -> Arc<Vec<f32>> {
        self.buffers[key.instrument.index()][key.accent as usize].clone()
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}
