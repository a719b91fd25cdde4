use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::audio::DEFAULT_VOLUME;
use crate::error::SchedulerError;
use crate::samples::{data_dir, SampleConfig};
use crate::sequencer::scheduler::{DEFAULT_POLL_INTERVAL, DEFAULT_SCHEDULE_HORIZON};
use crate::sequencer::{flamenco_patterns, RhythmPattern, Timing};
use crate::synth::{Instrument, SoundSet};

/// Lookahead loop tuning as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub poll_interval_ms: u64,
    pub schedule_horizon_secs: f64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            schedule_horizon_secs: DEFAULT_SCHEDULE_HORIZON,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Volumes {
    pub palo: f32,
    pub jaleo: f32,
    pub castanets: f32,
    pub cajon: f32,
}

impl Default for Volumes {
    fn default() -> Self {
        Self {
            palo: DEFAULT_VOLUME,
            jaleo: DEFAULT_VOLUME,
            castanets: DEFAULT_VOLUME,
            cajon: DEFAULT_VOLUME,
        }
    }
}

impl Volumes {
    /// Gains indexed by `Instrument::index()`
    pub fn as_array(&self) -> [f32; 4] {
        Instrument::ALL.map(|i| match i {
            Instrument::Palo => self.palo,
            Instrument::Jaleo => self.jaleo,
            Instrument::Castanets => self.castanets,
            Instrument::Cajon => self.cajon,
        })
    }
}

/// User settings (~/.compas/settings.json). Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bpm: f64,
    pub pattern: String,
    pub sounds: SoundSet,
    pub theme: String,
    pub volumes: Volumes,
    pub timing: TimingSettings,
    pub samples: SampleConfig,
    pub custom_patterns: Vec<RhythmPattern>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            pattern: "Soleá".to_string(),
            sounds: SoundSet::default(),
            theme: "default".to_string(),
            volumes: Volumes::default(),
            timing: TimingSettings::default(),
            samples: SampleConfig::default(),
            custom_patterns: Vec::new(),
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        data_dir().join("settings.json")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn timing(&self) -> Result<Timing, SchedulerError> {
        Timing::new(
            Duration::from_millis(self.timing.poll_interval_ms),
            self.timing.schedule_horizon_secs,
        )
    }

    /// Built-in palos followed by the user's own patterns
    pub fn catalog(&self) -> Vec<RhythmPattern> {
        let mut catalog = flamenco_patterns();
        catalog.extend(self.custom_patterns.iter().cloned());
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "bpm": 96,
                "sounds": { "cajon": true },
                "custom_patterns": [
                    { "name": "Guajira", "beats": 12, "accents": [3, 6, 8, 10, 12], "subdivision": 2 }
                ]
            }"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.bpm, 96.0);
        assert_eq!(settings.pattern, "Soleá");
        assert!(settings.sounds.palo && settings.sounds.cajon);
        assert_eq!(settings.timing, TimingSettings::default());
        let catalog = settings.catalog();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog[7].name(), "Guajira");
    }

    #[test]
    fn invalid_custom_pattern_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "custom_patterns": [ { "name": "x", "beats": 4, "accents": [9] } ] }"#,
        )
        .unwrap();
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = Settings::default();
        settings.bpm = 180.0;
        settings.pattern = "Bulería".to_string();
        settings.sounds.toggle(Instrument::Jaleo);
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn missing_default_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.timing().is_ok());
        assert_eq!(settings.volumes.as_array(), [0.7; 4]);
    }

    #[test]
    fn bad_timing_is_reported() {
        let mut settings = Settings::default();
        settings.timing.schedule_horizon_secs = 0.01;
        assert!(matches!(
            settings.timing(),
            Err(SchedulerError::InvalidTiming { .. })
        ));
    }
}
