use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Percussion voices a beat can sound on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Palo,
    Jaleo,
    Castanets,
    Cajon,
}

/// Fallback tone oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
}

impl Instrument {
    pub const ALL: [Instrument; 4] = [
        Instrument::Palo,
        Instrument::Jaleo,
        Instrument::Castanets,
        Instrument::Cajon,
    ];

    pub fn index(&self) -> usize {
        match self {
            Instrument::Palo => 0,
            Instrument::Jaleo => 1,
            Instrument::Castanets => 2,
            Instrument::Cajon => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Palo => "palo",
            Instrument::Jaleo => "jaleo",
            Instrument::Castanets => "castanets",
            Instrument::Cajon => "cajon",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Instrument::Palo => "Palo",
            Instrument::Jaleo => "Jaleo",
            Instrument::Castanets => "Castanets",
            Instrument::Cajon => "Cajón",
        }
    }

    pub fn from_name(name: &str) -> Option<Instrument> {
        match name.trim().to_lowercase().as_str() {
            "palo" => Some(Instrument::Palo),
            "jaleo" => Some(Instrument::Jaleo),
            "castanets" => Some(Instrument::Castanets),
            "cajon" | "cajón" => Some(Instrument::Cajon),
            _ => None,
        }
    }

    /// Fallback tone pitch in Hz
    pub fn tone_frequency(&self, accent: bool) -> f32 {
        let (accented, regular) = match self {
            Instrument::Palo => (1200.0, 800.0),
            Instrument::Jaleo => (600.0, 400.0),
            Instrument::Castanets => (2000.0, 1500.0),
            Instrument::Cajon => (150.0, 100.0),
        };
        if accent {
            accented
        } else {
            regular
        }
    }

    pub fn waveform(&self) -> Waveform {
        match self {
            Instrument::Cajon => Waveform::Sine,
            _ => Waveform::Square,
        }
    }
}

/// Which instruments the user has switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundSet {
    pub palo: bool,
    pub jaleo: bool,
    pub castanets: bool,
    pub cajon: bool,
}

impl Default for SoundSet {
    fn default() -> Self {
        Self {
            palo: true,
            jaleo: false,
            castanets: false,
            cajon: false,
        }
    }
}

impl SoundSet {
    pub fn none() -> Self {
        Self {
            palo: false,
            jaleo: false,
            castanets: false,
            cajon: false,
        }
    }

    /// Parse a comma separated list such as `palo,cajon`
    pub fn parse_list(list: &str) -> Result<Self> {
        let mut set = Self::none();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match Instrument::from_name(item) {
                Some(instrument) => set.set(instrument, true),
                None => bail!(
                    "Unknown sound '{}' (expected palo, jaleo, castanets or cajon)",
                    item
                ),
            }
        }
        Ok(set)
    }

    pub fn is_enabled(&self, instrument: Instrument) -> bool {
        match instrument {
            Instrument::Palo => self.palo,
            Instrument::Jaleo => self.jaleo,
            Instrument::Castanets => self.castanets,
            Instrument::Cajon => self.cajon,
        }
    }

    pub fn set(&mut self, instrument: Instrument, enabled: bool) {
        match instrument {
            Instrument::Palo => self.palo = enabled,
            Instrument::Jaleo => self.jaleo = enabled,
            Instrument::Castanets => self.castanets = enabled,
            Instrument::Cajon => self.cajon = enabled,
        }
    }

    pub fn toggle(&mut self, instrument: Instrument) {
        self.set(instrument, !self.is_enabled(instrument));
    }

    /// Instruments to sound for one beat.
    ///
    /// With real samples every enabled instrument plays. The synthesized
    /// fallback keeps palo always on and reserves jaleo and cajón for accents.
    pub fn voices(&self, accent: bool, fallback: bool) -> Vec<Instrument> {
        if !fallback {
            return Instrument::ALL
                .into_iter()
                .filter(|&i| self.is_enabled(i))
                .collect();
        }

        let mut voices = vec![Instrument::Palo];
        if self.jaleo && accent {
            voices.push(Instrument::Jaleo);
        }
        if self.castanets {
            voices.push(Instrument::Castanets);
        }
        if self.cajon && accent {
            voices.push(Instrument::Cajon);
        }
        voices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_voices_follow_toggles() {
        let set = SoundSet::parse_list("palo, cajon").unwrap();
        assert_eq!(
            set.voices(false, false),
            vec![Instrument::Palo, Instrument::Cajon]
        );
        assert!(SoundSet::none().voices(true, false).is_empty());
    }

    #[test]
    fn fallback_voices_reserve_jaleo_and_cajon_for_accents() {
        let mut set = SoundSet::none();
        set.toggle(Instrument::Jaleo);
        set.toggle(Instrument::Castanets);
        set.toggle(Instrument::Cajon);
        assert_eq!(
            set.voices(false, true),
            vec![Instrument::Palo, Instrument::Castanets]
        );
        assert_eq!(
            set.voices(true, true),
            vec![
                Instrument::Palo,
                Instrument::Jaleo,
                Instrument::Castanets,
                Instrument::Cajon
            ]
        );
    }

    #[test]
    fn parse_rejects_unknown_sound() {
        assert!(SoundSet::parse_list("palo,bongo").is_err());
        assert_eq!(SoundSet::parse_list("").unwrap(), SoundSet::none());
    }

    #[test]
    fn tone_table() {
        assert_eq!(Instrument::Palo.tone_frequency(true), 1200.0);
        assert_eq!(Instrument::Cajon.tone_frequency(false), 100.0);
        assert_eq!(Instrument::Cajon.waveform(), Waveform::Sine);
        assert_eq!(Instrument::Jaleo.waveform(), Waveform::Square);
    }
}
