//! Server runtime settings
//!
//! Only the loop around the simulation is configurable (tick interval, seed,
//! snapshot cadence). Field and physics constants are fixed in `consts`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors raised while loading settings
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {key}: {value:?}")]
    Env { key: &'static str, value: String },
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Runtime settings for the server loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed tick interval in milliseconds
    pub tick_ms: f32,
    /// RNG seed for item spawning (random when absent)
    pub seed: Option<u64>,
    /// Maximum ticks run per wake-up to prevent spiral of death
    pub max_substeps: u32,
    /// Emit a snapshot every N ticks
    pub snapshot_every: u32,
    /// How long the headless demo match runs
    pub duration_ms: u64,
    /// Pace ticks against the wall clock instead of running flat out
    pub realtime: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: crate::consts::NOMINAL_TICK_MS,
            seed: None,
            max_substeps: 8,
            snapshot_every: 1,
            duration_ms: 30_000,
            realtime: true,
        }
    }
}

impl Settings {
    /// Environment variable naming a JSON settings file
    pub const PATH_ENV: &'static str = "TALE_SOCCER_SETTINGS";
    pub const SEED_ENV: &'static str = "TALE_SOCCER_SEED";
    pub const TICK_ENV: &'static str = "TALE_SOCCER_TICK_MS";

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from the file named by `TALE_SOCCER_SETTINGS` (if any), then apply
    /// environment overrides
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = match std::env::var_os(Self::PATH_ENV) {
            Some(path) => {
                let settings = Self::from_path(Path::new(&path))?;
                log::info!("Loaded settings from {}", Path::new(&path).display());
                settings
            }
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply `TALE_SOCCER_SEED` / `TALE_SOCCER_TICK_MS` style overrides
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SettingsError> {
        if let Some(value) = lookup(Self::SEED_ENV) {
            let seed = value.trim().parse().map_err(|_| SettingsError::Env {
                key: Self::SEED_ENV,
                value: value.clone(),
            })?;
            self.seed = Some(seed);
        }
        if let Some(value) = lookup(Self::TICK_ENV) {
            self.tick_ms = value.trim().parse().map_err(|_| SettingsError::Env {
                key: Self::TICK_ENV,
                value: value.clone(),
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.tick_ms.is_finite() && self.tick_ms > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "tick_ms must be positive, got {}",
                self.tick_ms
            )));
        }
        if self.max_substeps == 0 {
            return Err(SettingsError::Invalid("max_substeps must be at least 1".into()));
        }
        if self.snapshot_every == 0 {
            return Err(SettingsError::Invalid("snapshot_every must be at least 1".into()));
        }
        Ok(())
    }

    /// Configured seed, or one derived from the clock
    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default()
        })
    }
}
