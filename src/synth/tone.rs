use super::instrument::Waveform;

/// Fallback click length in seconds
pub const TONE_DURATION: f32 = 0.1;
const TONE_START_GAIN: f32 = 0.3;
const TONE_END_GAIN: f32 = 0.01;

/// Render a short synthesized click: the oscillator under an exponential
/// gain ramp from 0.3 down to 0.01 over the tone's length.
pub fn render_tone(frequency: f32, waveform: Waveform, sample_rate: f32) -> Vec<f32> {
    let len = (sample_rate * TONE_DURATION) as usize;
    let mut out = Vec::with_capacity(len);
    let mut phase = 0.0f32;

    for i in 0..len {
        let t = i as f32 / sample_rate;
        let gain = TONE_START_GAIN * (TONE_END_GAIN / TONE_START_GAIN).powf(t / TONE_DURATION);

        let osc = match waveform {
            Waveform::Sine => (phase * std::f32::consts::TAU).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };
        out.push(osc * gain);

        phase = (phase + frequency / sample_rate).fract();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_length_and_envelope() {
        let tone = render_tone(800.0, Waveform::Square, 48000.0);
        assert_eq!(tone.len(), 4800);
        assert!((tone[0].abs() - 0.3).abs() < 1e-6);
        let tail = tone[tone.len() - 1].abs();
        assert!(tail < 0.011 && tail > 0.009, "tail {}", tail);
    }

    #[test]
    fn sine_starts_at_zero_and_stays_in_range() {
        let tone = render_tone(150.0, Waveform::Sine, 44100.0);
        assert_eq!(tone[0], 0.0);
        assert!(tone.iter().all(|s| s.abs() <= 0.3 + 1e-6));
    }
}
