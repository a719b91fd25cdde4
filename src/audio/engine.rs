use std::sync::Arc;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use log::{error, info};

use super::clock::AudioClock;
use super::mixer::VoiceMixer;
use crate::command::CommandReceiver;
use crate::samples::{search_dirs, SampleConfig};
use crate::synth::SampleBank;

/// Audio engine owning the output stream. The stream's frame counter is the
/// clock the beat scheduler runs against.
pub struct AudioEngine {
    _stream: Stream,
    clock: Arc<AudioClock>,
    fallback: bool,
}

impl AudioEngine {
    /// Open the default output device, load the sample bank at the device
    /// rate and start streaming (silence until the clock is resumed)
    pub fn new(
        command_rx: CommandReceiver,
        samples: &SampleConfig,
        volumes: [f32; 4],
    ) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No output device available")?;

        let config = device
            .default_output_config()
            .context("No usable output configuration")?;
        let sample_rate = config.sample_rate().0 as f32;
        info!(
            "Audio output: {} at {} Hz",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate
        );

        let clock = Arc::new(AudioClock::new(sample_rate as f64));
        let bank = SampleBank::load(samples, &search_dirs(), sample_rate);
        let fallback = bank.is_fallback();
        let mixer = VoiceMixer::new(bank, volumes);

        let stream = match config.sample_format() {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config.into(),
                command_rx,
                mixer,
                clock.clone(),
            )?,
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config.into(),
                command_rx,
                mixer,
                clock.clone(),
            )?,
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config.into(),
                command_rx,
                mixer,
                clock.clone(),
            )?,
            format => anyhow::bail!("Unsupported sample format: {:?}", format),
        };

        stream.play().context("Failed to start output stream")?;

        Ok(Self {
            _stream: stream,
            clock,
            fallback,
        })
    }

    pub fn clock(&self) -> Arc<AudioClock> {
        self.clock.clone()
    }

    /// True when clicks are synthesized tones rather than samples
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        command_rx: CommandReceiver,
        mut mixer: VoiceMixer,
        clock: Arc<AudioClock>,
    ) -> Result<Stream>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let channels = config.channels as usize;
        let error_clock = clock.clone();

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let base = clock.frames();
                while let Some(cmd) = command_rx.try_recv() {
                    mixer.apply(cmd, base);
                }

                if !clock.is_active() {
                    for sample in data.iter_mut() {
                        *sample = T::EQUILIBRIUM;
                    }
                    return;
                }

                let frames = data.len() / channels;
                for (i, frame) in data.chunks_mut(channels).enumerate() {
                    let value = T::from_sample(mixer.render_frame(base + i as u64));
                    for channel_sample in frame.iter_mut() {
                        *channel_sample = value;
                    }
                }

                mixer.prune(base + frames as u64);
                clock.advance(frames as u64);
            },
            move |err| {
                error!("Audio stream error: {}", err);
                error_clock.mark_failed(err.to_string());
            },
            None,
        )?;

        Ok(stream)
    }
}
