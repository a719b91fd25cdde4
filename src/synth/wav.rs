use std::path::Path;

use anyhow::{bail, Context, Result};

/// Load a WAV file as mono f32 at `target_sr`
pub fn load_wav(path: &Path, target_sr: f32) -> Result<Vec<f32>> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV: {}", path.display()))?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    let wav_sr = spec.sample_rate as f32;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1u32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<_, _>>()
                .with_context(|| format!("Corrupt WAV data: {}", path.display()))?
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .with_context(|| format!("Corrupt WAV data: {}", path.display()))?,
    };

    if samples.is_empty() {
        bail!("WAV file is empty: {}", path.display());
    }

    let mono: Vec<f32> = if channels > 1 {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    if (wav_sr - target_sr).abs() > 1.0 {
        Ok(resample_linear(&mono, wav_sr, target_sr))
    } else {
        Ok(mono)
    }
}

fn resample_linear(mono: &[f32], from_sr: f32, to_sr: f32) -> Vec<f32> {
    let ratio = from_sr as f64 / to_sr as f64;
    let new_len = (mono.len() as f64 / ratio) as usize;
    (0..new_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            let s0 = mono.get(idx).copied().unwrap_or(0.0);
            let s1 = mono.get(idx + 1).copied().unwrap_or(s0);
            s0 + (s1 - s0) * frac
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn write_test_wav(path: &Path, sample_rate: u32, channels: u16, frames: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in frames {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_is_averaged_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clap.wav");
        write_test_wav(&path, 48000, 2, &[16384, 0, -16384, -16384]);

        let mono = load_wav(&path, 48000.0).unwrap();
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.25).abs() < 1e-4);
        assert!((mono[1] + 0.5).abs() < 1e-4);
    }

    #[test]
    fn resamples_to_target_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palo.wav");
        write_test_wav(&path, 24000, 1, &[0, 16384, 0, -16384]);

        let out = load_wav(&path, 48000.0).unwrap();
        assert_eq!(out.len(), 8);
        assert!((out[1] - 0.25).abs() < 1e-4);
    }

    #[test]
    fn missing_or_empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_wav(&dir.path().join("nope.wav"), 48000.0).is_err());

        let empty = dir.path().join("empty.wav");
        write_test_wav(&empty, 48000, 1, &[]);
        assert!(load_wav(&empty, 48000.0).is_err());
    }
}
