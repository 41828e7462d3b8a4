use crate::core::location::{AccuracyTier, WatchOptions};
use crate::errors::{AppError, AppResult};
use crate::utils::path::resolve_against;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration directory.
pub const HOME_ENV: &str = "GEOATTEND_HOME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the JSON storage slots. Relative paths are
    /// resolved against the configuration directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_radius")]
    pub default_radius_meters: f64,
    #[serde(default)]
    pub accuracy: AccuracyTier,
    #[serde(default = "default_min_interval")]
    pub min_interval_ms: u64,
    #[serde(default = "default_min_distance")]
    pub min_distance_meters: f64,
}

fn default_data_dir() -> String {
    "data".to_string()
}
fn default_radius() -> f64 {
    100.0
}
fn default_min_interval() -> u64 {
    30_000
}
fn default_min_distance() -> f64 {
    10.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_radius_meters: default_radius(),
            accuracy: AccuracyTier::default(),
            min_interval_ms: default_min_interval(),
            min_distance_meters: default_min_distance(),
        }
    }
}

impl Config {
    /// `$GEOATTEND_HOME`, or `~/.geoattend`.
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = env::var(HOME_ENV)
            && !dir.is_empty()
        {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".geoattend")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("geoattend.conf")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> AppResult<()> {
        if !(self.default_radius_meters.is_finite() && self.default_radius_meters > 0.0) {
            return Err(AppError::Config(format!(
                "default_radius_meters must be > 0, got {}",
                self.default_radius_meters
            )));
        }
        if !(self.min_distance_meters.is_finite() && self.min_distance_meters >= 0.0) {
            return Err(AppError::Config(format!(
                "min_distance_meters must be >= 0, got {}",
                self.min_distance_meters
            )));
        }
        Ok(())
    }

    /// Absolute location of the storage slots.
    pub fn data_path(&self) -> PathBuf {
        resolve_against(&Self::config_dir(), &self.data_dir)
    }

    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            accuracy: self.accuracy,
            min_interval_ms: self.min_interval_ms,
            min_distance_meters: self.min_distance_meters,
        }
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the configuration file (keeping an existing one) and create
    /// the data directory.
    pub fn init_all(custom_data_dir: Option<&str>) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let path = Self::config_file();
        let mut cfg = Self::load_from(&path)?;
        if let Some(custom) = custom_data_dir {
            cfg.data_dir = custom.to_string();
        }

        fs::write(&path, cfg.to_yaml()?)?;
        fs::create_dir_all(cfg.data_path())?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.conf")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.watch_options(), WatchOptions::default());
    }

    #[test]
    fn partial_file_is_filled_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geoattend.conf");
        fs::write(&path, "default_radius_meters: 250\naccuracy: balanced\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.default_radius_meters, 250.0);
        assert_eq!(cfg.accuracy, AccuracyTier::Balanced);
        assert_eq!(cfg.min_interval_ms, 30_000);
        assert_eq!(cfg.data_dir, "data");
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geoattend.conf");
        fs::write(&path, "default_radius_meters: 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
    }
}
