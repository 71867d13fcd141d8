//! Per-game configuration.
//!
//! Settings consumed from storage that steer phase sequencing and nuclear
//! range. Loaded from JSON; every field has a default so partial documents
//! are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// When coalition nominations begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NominationTiming {
    /// Nominations open in the configured `nomination_year`.
    Set,
    #[default]
    Disabled,
}

/// How many consecutive missed-order turns a country may accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NmrTolerance {
    pub total: u32,
    pub orders: u32,
    pub retreats: u32,
    pub adjustments: u32,
}

impl Default for NmrTolerance {
    fn default() -> Self {
        NmrTolerance {
            total: 3,
            orders: 3,
            retreats: 3,
            adjustments: 3,
        }
    }
}

/// Game-level settings for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub nomination_timing: NominationTiming,
    pub nomination_year: Option<u32>,
    pub nominate_during_adjustments: bool,
    pub vote_during_spring: bool,
    pub nmr_tolerance: NmrTolerance,
    /// Range granted on acquiring nuclear technology. Zero means unlimited.
    pub default_nuke_range: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            nomination_timing: NominationTiming::Disabled,
            nomination_year: None,
            nominate_during_adjustments: true,
            vote_during_spring: true,
            nmr_tolerance: NmrTolerance::default(),
            default_nuke_range: 0,
        }
    }
}

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("nomination timing is Set but no nomination year is configured")]
    MissingNominationYear,

    #[error("nmr tolerance for {0} exceeds the total tolerance")]
    ToleranceExceedsTotal(&'static str),
}

impl GameConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nomination_timing == NominationTiming::Set && self.nomination_year.is_none() {
            return Err(ConfigError::MissingNominationYear);
        }
        let tol = &self.nmr_tolerance;
        for (name, value) in [
            ("orders", tol.orders),
            ("retreats", tol.retreats),
            ("adjustments", tol.adjustments),
        ] {
            if value > tol.total {
                return Err(ConfigError::ToleranceExceedsTotal(name));
            }
        }
        Ok(())
    }
}
