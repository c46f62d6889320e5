//! # Dashboard Configuration
//!
//! JSON configuration for the dashboard. Every field has a default, so an
//! empty object (or no file at all) gives the reference setup: match 7580,
//! StatsBomb open data, the 8x12 reference xT grid and the top 5 passes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = DashboardConfig::resolve(cli.config.as_deref())?;
//! ```

use std::path::Path;
use std::{env, fs};

use serde::{Deserialize, Serialize};

use crate::analysis::network::RecipientAnchor;
use crate::analysis::threat::{PitchDims, ThreatGrid};
use crate::error::ConfigError;
use crate::models::events::MatchId;

/// Environment variable naming a config file to use when none is given explicitly.
pub const CONFIG_PATH_ENV: &str = "XT_CONFIG_PATH";

pub const DEFAULT_MATCH_ID: MatchId = 7580;
pub const DEFAULT_PROVIDER_BASE_URL: &str =
    "https://raw.githubusercontent.com/statsbomb/open-data/master/data";

fn default_match_id() -> MatchId {
    DEFAULT_MATCH_ID
}

fn default_provider_base_url() -> String {
    DEFAULT_PROVIDER_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_top_n() -> usize {
    crate::analysis::ranking::DEFAULT_TOP_N
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Match shown when none is selected
    #[serde(default = "default_match_id")]
    pub match_id: MatchId,

    /// Root of the open-data repository (`{base}/events/{match_id}.json`)
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    /// HTTP timeout, 1-300 seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Rows in the top passes table, 1-50
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default)]
    pub recipient_anchor: RecipientAnchor,

    #[serde(default)]
    pub pitch: PitchDims,

    /// Override for the reference xT table
    #[serde(default)]
    pub threat_grid: ThreatGrid,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            match_id: default_match_id(),
            provider_base_url: default_provider_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            top_n: default_top_n(),
            recipient_anchor: RecipientAnchor::default(),
            pitch: PitchDims::default(),
            threat_grid: ThreatGrid::default(),
        }
    }
}

impl DashboardConfig {
    /// Load and validate a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Config named by [`CONFIG_PATH_ENV`], if set and non-blank.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(None);
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(None);
        }

        log::debug!("Loading config from {CONFIG_PATH_ENV}='{path}'");
        Self::load(path).map(Some)
    }

    /// Explicit path first, then the environment, then defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            log::debug!("Loading config from {}", path.display());
            return Self::load(path);
        }
        Ok(Self::from_env()?.unwrap_or_default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider_base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "provider_base_url must not be empty".to_string(),
            ));
        }
        if !(1..=300).contains(&self.request_timeout_secs) {
            return Err(ConfigError::Validation(format!(
                "request_timeout_secs must be 1-300, got {}",
                self.request_timeout_secs
            )));
        }
        if !(1..=50).contains(&self.top_n) {
            return Err(ConfigError::Validation(format!(
                "top_n must be 1-50, got {}",
                self.top_n
            )));
        }
        if !(self.pitch.length > 0.0 && self.pitch.length.is_finite())
            || !(self.pitch.width > 0.0 && self.pitch.width.is_finite())
        {
            return Err(ConfigError::Validation(format!(
                "pitch dimensions must be positive, got {} x {}",
                self.pitch.length, self.pitch.width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = DashboardConfig::from_json("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.match_id, 7580);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.threat_grid, ThreatGrid::reference());
    }

    #[test]
    fn test_partial_override() {
        let config = DashboardConfig::from_json(
            r#"{"top_n": 10, "recipient_anchor": "include_receivers", "threat_grid": [[0.1, 0.2], [0.3, 0.4]]}"#,
        )
        .unwrap();
        assert_eq!(config.top_n, 10);
        assert_eq!(config.recipient_anchor, RecipientAnchor::IncludeReceivers);
        assert_eq!((config.threat_grid.rows(), config.threat_grid.cols()), (2, 2));
        assert_eq!(config.pitch, PitchDims::default());
    }

    #[test]
    fn test_validation_bounds() {
        for json in [
            r#"{"top_n": 0}"#,
            r#"{"top_n": 51}"#,
            r#"{"request_timeout_secs": 0}"#,
            r#"{"provider_base_url": "  "}"#,
            r#"{"pitch": {"length": 0.0, "width": 80.0}}"#,
        ] {
            assert!(
                matches!(DashboardConfig::from_json(json), Err(ConfigError::Validation(_))),
                "{json} should fail validation"
            );
        }
    }

    #[test]
    fn test_bad_grid_is_a_parse_error() {
        let err = DashboardConfig::from_json(r#"{"threat_grid": [[0.1], [0.2, 0.3]]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"match_id": 3788741}"#).unwrap();

        let config = DashboardConfig::resolve(Some(file.path())).unwrap();
        assert_eq!(config.match_id, 3788741);

        let missing = DashboardConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}
