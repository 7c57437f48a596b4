use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sheetjitter_randomize::{ColumnBound, DeliveredCap, RandomizeOptions, RuleCategory};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Randomizer settings as written in a TOML config file.
///
/// Every field is optional; missing fields keep the compiled-in defaults and
/// `rules` entries are merged over the built-in header table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RandomizeConfig {
    pub start_column: Option<ColumnBound>,
    pub end_column: Option<ColumnBound>,
    pub variation_factor: Option<f64>,
    pub delivered_cap: Option<DeliveredCap>,
    pub seed: Option<u64>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleCategory>,
}

impl RandomizeConfig {
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, SettingsError> {
        toml::from_str(content).map_err(|source| SettingsError::Toml {
            path: path.to_string(),
            source,
        })
    }

    pub fn into_options(self) -> RandomizeOptions {
        let defaults = RandomizeOptions::default();
        RandomizeOptions {
            start_column: self.start_column.unwrap_or(defaults.start_column),
            end_column: self.end_column.unwrap_or(defaults.end_column),
            variation_factor: self.variation_factor.unwrap_or(defaults.variation_factor),
            rules: defaults.rules.with_overrides(self.rules),
            delivered_cap: self.delivered_cap.unwrap_or(defaults.delivered_cap),
            seed: self.seed.or(defaults.seed),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<RandomizeConfig, SettingsError> {
    let Some(path) = path else {
        return Ok(RandomizeConfig::default());
    };
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: display.clone(),
        source,
    })?;
    RandomizeConfig::from_toml_str(&content, &display)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_keeps_defaults() {
        let options = RandomizeConfig::from_toml_str("", "empty.toml")
            .expect("parse empty config")
            .into_options();
        assert_eq!(options, RandomizeOptions::default());
    }

    #[test]
    fn parses_bounds_rules_and_cap() {
        let content = r#"
start_column = "UniqueClicks"
end_column = 15
variation_factor = 0.2
delivered_cap = "original_sent"
seed = 42

[rules]
"Opens" = "low_count"
"Sent" = "default"
"#;
        let options = RandomizeConfig::from_toml_str(content, "campaigns.toml")
            .expect("parse config")
            .into_options();
        assert_eq!(
            options.start_column,
            ColumnBound::Header("UniqueClicks".to_string())
        );
        assert_eq!(options.end_column, ColumnBound::Index(15));
        assert_eq!(options.variation_factor, 0.2);
        assert_eq!(options.delivered_cap, DeliveredCap::OriginalSent);
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.rules.category("Opens"), RuleCategory::LowCount);
        assert_eq!(options.rules.category("Sent"), RuleCategory::Default);
        assert_eq!(options.rules.category("Clicks"), RuleCategory::ClickLike);
    }

    #[test]
    fn rejects_unknown_rule_category() {
        let content = "[rules]\n\"Opens\" = \"tiny\"\n";
        let err = RandomizeConfig::from_toml_str(content, "bad.toml").expect_err("bad category");
        assert!(matches!(err, SettingsError::Toml { .. }));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = RandomizeConfig::from_toml_str("start_col = 3\n", "typo.toml")
            .expect_err("unknown key");
        assert!(matches!(err, SettingsError::Toml { .. }));
    }
}
