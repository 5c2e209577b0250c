//! Loading service configuration (default settings, store path, seed, presets) from TOML.
//!
//! Example:
//! ```toml
//! settings_path = "data/settings.toml"
//! seed = 1234
//!
//! [defaults]
//! operations = ["+", "*"]
//! numRange = [1, 12]
//!
//! [[presets]]
//! id = "doubles"
//! name = "Doubles"
//! settings = { operations = ["+"], numRange = [1, 10], resultRange = [2, 20] }
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Settings;
use crate::presets::Preset;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Merged over the built-in defaults; missing keys keep their default value.
    #[serde(default)]
    pub defaults: Option<Settings>,
    #[serde(default)]
    pub settings_path: Option<String>,
    /// Fixed seed for reproducible worksheets.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

/// Attempt to load `AppConfig` from MATHDRILL_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
    let path = std::env::var("MATHDRILL_CONFIG_PATH").ok()?;
    load_app_config(&path)
}

pub fn load_app_config(path: &str) -> Option<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(s) => match toml::from_str::<AppConfig>(&s) {
            Ok(cfg) => {
                info!(target: "mathdrill_backend", %path, presets = cfg.presets.len(), "Loaded app config (TOML)");
                Some(cfg)
            }
            Err(e) => {
                error!(target: "mathdrill_backend", %path, error = %e, "Failed to parse TOML config");
                None
            }
        },
        Err(e) => {
            error!(target: "mathdrill_backend", %path, error = %e, "Failed to read TOML config file");
            None
        }
    }
}

/// MATHDRILL_SETTINGS_PATH wins over the config file.
pub fn settings_path(cfg: Option<&AppConfig>) -> Option<String> {
    std::env::var("MATHDRILL_SETTINGS_PATH")
        .ok()
        .filter(|p| !p.is_empty())
        .or_else(|| cfg.and_then(|c| c.settings_path.clone()))
}

/// MATHDRILL_SEED wins over the config file; unparsable values are ignored.
pub fn seed(cfg: Option<&AppConfig>) -> Option<u64> {
    std::env::var("MATHDRILL_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .or_else(|| cfg.and_then(|c| c.seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IntRange, Operation};

    const SAMPLE: &str = r#"
settings_path = "data/settings.toml"
seed = 99

[defaults]
operations = ["*"]
numRange = [2, 9]

[[presets]]
id = "doubles"
name = "Doubles"
settings = { operations = ["+"], numRange = [1, 10], resultRange = [2, 20] }
"#;

    #[test]
    fn parses_partial_defaults_and_presets() {
        let cfg: AppConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.settings_path.as_deref(), Some("data/settings.toml"));
        assert_eq!(cfg.seed, Some(99));

        let defaults = cfg.defaults.unwrap();
        assert_eq!(defaults.operations.into_iter().collect::<Vec<_>>(), vec![Operation::Mul]);
        assert_eq!(defaults.num_range, IntRange(2, 9));
        assert_eq!(defaults.num_problems, Settings::default().num_problems);

        assert_eq!(cfg.presets.len(), 1);
        assert_eq!(cfg.presets[0].settings.result_range, IntRange(2, 20));
    }

    #[test]
    fn empty_file_is_default_config() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert!(cfg.defaults.is_none());
        assert!(cfg.presets.is_empty());
    }

    #[test]
    fn missing_file_yields_none() {
        assert!(load_app_config("/definitely/not/here/mathdrill.toml").is_none());
    }
}
