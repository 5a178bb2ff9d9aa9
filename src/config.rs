use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::classify::Thresholds;
use crate::codec::ImportOptions;
use crate::error::{AnalyticsError, Result};

pub const STRICT_IMPORT_ENV: &str = "ANALYTICS_STRICT_IMPORT";
pub const SAMPLE_SEED_ENV: &str = "ANALYTICS_SAMPLE_SEED";

/// Tunables read by the command line host and handed to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub strict_import: bool,
    pub thresholds: Thresholds,
    pub sample_seed: Option<u64>,
}

/// On-disk layout of the settings file.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    strict_import: bool,
    risk_thresholds: RiskThresholds,
    high_performer_score: f64,
    needs_support_score: f64,
    skill_target: f64,
    skill_warning: f64,
    sample_seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RiskThresholds {
    score: f64,
    cognitive: f64,
    engagement: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        let defaults = Thresholds::default();
        Self {
            score: defaults.risk_score,
            cognitive: defaults.risk_cognitive,
            engagement: defaults.risk_engagement,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let defaults = Thresholds::default();
        Self {
            strict_import: false,
            risk_thresholds: RiskThresholds::default(),
            high_performer_score: defaults.high_performer_score,
            needs_support_score: defaults.needs_support_score,
            skill_target: defaults.skill_target,
            skill_warning: defaults.skill_warning,
            sample_seed: None,
        }
    }
}

impl From<ConfigFile> for EngineConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            strict_import: file.strict_import,
            thresholds: Thresholds {
                risk_score: file.risk_thresholds.score,
                risk_cognitive: file.risk_thresholds.cognitive,
                risk_engagement: file.risk_thresholds.engagement,
                high_performer_score: file.high_performer_score,
                needs_support_score: file.needs_support_score,
                skill_target: file.skill_target,
                skill_warning: file.skill_warning,
            },
            sample_seed: file.sample_seed,
        }
    }
}

impl EngineConfig {
    /// Unknown or misspelled keys are rejected.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_json::from_str(text).map_err(|error| AnalyticsError::Config(error.to_string()))?;
        Ok(file.into())
    }

    /// Defaults, then the JSON file if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|error| {
                    AnalyticsError::Config(format!("{}: {error}", path.display()))
                })?;
                Self::from_json(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        debug!("engine config: {config:?}");
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(STRICT_IMPORT_ENV) {
            self.strict_import = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(AnalyticsError::Config(format!(
                        "{STRICT_IMPORT_ENV} must be a boolean, got `{other}`"
                    )))
                }
            };
        }
        if let Some(value) = lookup(SAMPLE_SEED_ENV) {
            let seed = value.trim().parse().map_err(|_| {
                AnalyticsError::Config(format!("{SAMPLE_SEED_ENV} must be an integer, got `{value}`"))
            })?;
            self.sample_seed = Some(seed);
        }
        Ok(())
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            strict: self.strict_import,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(
            r#"{"high_performer_score": 90, "risk_thresholds": {"score": 70}}"#,
        )
        .unwrap();
        assert!(!config.strict_import);
        assert_eq!(config.thresholds.high_performer_score, 90.0);
        assert_eq!(config.thresholds.risk_score, 70.0);
        assert_eq!(config.thresholds.risk_cognitive, 65.0);
        assert_eq!(config.thresholds.needs_support_score, 60.0);
        assert_eq!(config.sample_seed, None);
    }

    #[test]
    fn empty_object_matches_defaults() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn unknown_keys_are_config_errors() {
        for text in [
            r#"{"thresholds": {"high_performer_score": 90}}"#,
            r#"{"high_performer": 90}"#,
            r#"{"risk_thresholds": {"scores": 70}}"#,
        ] {
            assert!(
                matches!(EngineConfig::from_json(text), Err(AnalyticsError::Config(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            EngineConfig::from_json("{strict_import: yes"),
            Err(AnalyticsError::Config(_))
        ));
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> =
            HashMap::from([(STRICT_IMPORT_ENV, "true"), (SAMPLE_SEED_ENV, "42")]);
        let mut config = EngineConfig::default();
        config
            .apply_env(|key| env.get(key).map(|value| value.to_string()))
            .unwrap();
        assert!(config.strict_import);
        assert_eq!(config.sample_seed, Some(42));
        assert!(config.import_options().strict);
    }

    #[test]
    fn rejects_unparseable_environment() {
        let mut config = EngineConfig::default();
        let err = config
            .apply_env(|key| (key == SAMPLE_SEED_ENV).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(SAMPLE_SEED_ENV));
    }
}
