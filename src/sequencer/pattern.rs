use serde::{Deserialize, Serialize};

use crate::error::PatternError;

/// Wire shape of a pattern before validation (settings files).
/// Accents come either as beat positions or as a boolean `mask`.
#[derive(Deserialize)]
struct RawPattern {
    name: String,
    #[serde(default)]
    beats: Option<u32>,
    #[serde(default)]
    accents: Vec<u32>,
    #[serde(default)]
    mask: Option<Vec<bool>>,
    #[serde(default = "default_subdivision")]
    subdivision: u32,
}

fn default_subdivision() -> u32 {
    1
}

/// Immutable rhythmic template: beat count, accented beats, display grouping.
///
/// Beats are numbered from 1. Accents are kept sorted and deduplicated, every
/// one within `1..=beat_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPattern")]
pub struct RhythmPattern {
    name: String,
    beats: u32,
    accents: Vec<u32>,
    subdivision: u32,
}

impl TryFrom<RawPattern> for RhythmPattern {
    type Error = PatternError;

    fn try_from(raw: RawPattern) -> Result<Self, Self::Error> {
        let Some(mask) = raw.mask else {
            return Self::new(raw.name, raw.beats.unwrap_or(0), &raw.accents, raw.subdivision);
        };
        if !raw.accents.is_empty() {
            return Err(PatternError::MaskAndAccents);
        }
        if let Some(beats) = raw.beats {
            if beats as usize != mask.len() {
                return Err(PatternError::MaskLength {
                    mask_len: mask.len(),
                    beat_count: beats,
                });
            }
        }
        Self::from_mask(raw.name, &mask, raw.subdivision)
    }
}

impl RhythmPattern {
    pub fn new(
        name: impl Into<String>,
        beats: u32,
        accents: &[u32],
        subdivision: u32,
    ) -> Result<Self, PatternError> {
        if beats == 0 {
            return Err(PatternError::NoBeats);
        }
        if subdivision == 0 {
            return Err(PatternError::ZeroSubdivision);
        }
        if let Some(&position) = accents.iter().find(|&&a| a == 0 || a > beats) {
            return Err(PatternError::AccentOutOfRange {
                position,
                beat_count: beats,
            });
        }

        let mut accents = accents.to_vec();
        accents.sort_unstable();
        accents.dedup();

        Ok(Self {
            name: name.into(),
            beats,
            accents,
            subdivision,
        })
    }

    /// Build from the boolean encoding: `mask[i]` marks beat `i + 1` as accented
    pub fn from_mask(
        name: impl Into<String>,
        mask: &[bool],
        subdivision: u32,
    ) -> Result<Self, PatternError> {
        let accents: Vec<u32> = mask
            .iter()
            .enumerate()
            .filter(|(_, &on)| on)
            .map(|(i, _)| i as u32 + 1)
            .collect();
        Self::new(name, mask.len() as u32, &accents, subdivision)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn beat_count(&self) -> u32 {
        self.beats
    }

    pub fn accents(&self) -> &[u32] {
        &self.accents
    }

    pub fn subdivision(&self) -> u32 {
        self.subdivision
    }

    pub fn is_accent(&self, beat: u32) -> bool {
        self.accents.binary_search(&beat).is_ok()
    }

    pub fn accent_mask(&self) -> Vec<bool> {
        (1..=self.beats).map(|b| self.is_accent(b)).collect()
    }

    /// True if `query` names this pattern, ignoring case and diacritics
    pub fn matches_name(&self, query: &str) -> bool {
        fold_name(&self.name) == fold_name(query)
    }
}

/// Lowercase and strip the Spanish diacritics used in palo names
fn fold_name(name: &str) -> String {
    name.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' => 'a',
            'é' | 'è' => 'e',
            'í' | 'ì' => 'i',
            'ó' | 'ò' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// (name, beats, accents, subdivision) for the built-in palos
const FLAMENCO_PALOS: &[(&str, u32, &[u32], u32)] = &[
    ("Soleá", 12, &[3, 6, 8, 10, 12], 2),
    ("Bulería", 12, &[3, 6, 8, 10, 12], 3),
    ("Alegría", 12, &[3, 6, 8, 10, 12], 2),
    ("Tangos", 4, &[1, 3], 2),
    ("Seguiriya", 12, &[1, 3, 5, 8, 11], 2),
    ("Fandango", 12, &[1, 4, 7, 10], 3),
    ("Rumba", 4, &[1, 3, 4], 2),
];

/// The ordered flamenco catalog
pub fn flamenco_patterns() -> Vec<RhythmPattern> {
    FLAMENCO_PALOS
        .iter()
        .filter_map(|&(name, beats, accents, subdivision)| {
            RhythmPattern::new(name, beats, accents, subdivision).ok()
        })
        .collect()
}

/// Find a pattern by name in a catalog
pub fn find_pattern<'a>(catalog: &'a [RhythmPattern], name: &str) -> Option<&'a RhythmPattern> {
    catalog.iter().find(|p| p.matches_name(name))
}
