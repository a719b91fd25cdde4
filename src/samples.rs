use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::synth::Instrument;

/// Accent and regular WAV file for one instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePaths {
    pub accent: String,
    pub regular: String,
}

impl SamplePaths {
    fn named(instrument: Instrument) -> Self {
        Self {
            accent: format!("{}-accent.wav", instrument.name()),
            regular: format!("{}-regular.wav", instrument.name()),
        }
    }

    pub fn for_accent(&self, accent: bool) -> &str {
        if accent {
            &self.accent
        } else {
            &self.regular
        }
    }
}

/// Sample file names per instrument, as found in the settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub palo: SamplePaths,
    pub jaleo: SamplePaths,
    pub castanets: SamplePaths,
    pub cajon: SamplePaths,
}

impl SampleConfig {
    pub fn paths(&self, instrument: Instrument) -> &SamplePaths {
        match instrument {
            Instrument::Palo => &self.palo,
            Instrument::Jaleo => &self.jaleo,
            Instrument::Castanets => &self.castanets,
            Instrument::Cajon => &self.cajon,
        }
    }
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            palo: SamplePaths::named(Instrument::Palo),
            jaleo: SamplePaths::named(Instrument::Jaleo),
            castanets: SamplePaths::named(Instrument::Castanets),
            cajon: SamplePaths::named(Instrument::Cajon),
        }
    }
}

/// Per-user data directory (~/.compas/)
pub fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".compas")
}

/// Get the global samples directory (~/.compas/samples/)
pub fn samples_dir() -> PathBuf {
    data_dir().join("samples")
}

/// Get the default search directories for samples
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    // Project-local samples/ first
    let local = PathBuf::from("./samples");
    if local.is_dir() {
        dirs.push(local);
    }
    let global = samples_dir();
    if global.is_dir() {
        dirs.push(global);
    }
    dirs
}

/// Resolve a sample name/path to an existing file.
/// Absolute paths are taken as-is; relative names are tried in each dir in order.
pub fn resolve_sample_path(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let as_path = Path::new(name);

    if as_path.is_absolute() {
        return as_path.exists().then(|| as_path.to_path_buf());
    }

    dirs.iter().map(|dir| dir.join(name)).find(|full| full.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_follow_instrument() {
        let config = SampleConfig::default();
        assert_eq!(config.paths(Instrument::Cajon).accent, "cajon-accent.wav");
        assert_eq!(
            config.paths(Instrument::Castanets).for_accent(false),
            "castanets-regular.wav"
        );
    }

    #[test]
    fn resolves_in_directory_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("palo-accent.wav"), b"x").unwrap();
        std::fs::write(first.path().join("jaleo-accent.wav"), b"x").unwrap();
        std::fs::write(second.path().join("jaleo-accent.wav"), b"x").unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(
            resolve_sample_path("palo-accent.wav", &dirs),
            Some(second.path().join("palo-accent.wav"))
        );
        assert_eq!(
            resolve_sample_path("jaleo-accent.wav", &dirs),
            Some(first.path().join("jaleo-accent.wav"))
        );
        assert_eq!(resolve_sample_path("missing.wav", &dirs), None);

        let absolute = second.path().join("palo-accent.wav");
        assert_eq!(
            resolve_sample_path(absolute.to_str().unwrap(), &[]),
            Some(absolute.clone())
        );
    }
}
