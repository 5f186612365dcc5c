use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.typeform.com";

/// Tap settings. Read from a JSON or TOML file, then overlaid by
/// `TAP_TYPEFORM_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct TapConfig {
    pub personal_access_token: String,
    /// Comma-separated form ids; unset means every form.
    #[serde(default)]
    pub forms_ids_list: Option<String>,
    /// Lower bound for `submitted_at` when no bookmark exists yet.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl TapConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::with_name(path)))
    }

    /// Parse an inline JSON document, still honouring environment overrides.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::from_str(raw, FileFormat::Json)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let s = builder
            .add_source(Environment::with_prefix("TAP_TYPEFORM"))
            .build()?;
        let config: TapConfig = s.try_deserialize()?;

        if config.personal_access_token.trim().is_empty() {
            return Err(ConfigError::Message(
                "personal_access_token must not be empty".to_string(),
            ));
        }

        Ok(config)
    }

    /// The configured form id filter, if any.
    ///
    /// Entries are trimmed and empty entries dropped; a list with no usable
    /// entries counts as unset.
    pub fn forms_ids(&self) -> Option<BTreeSet<String>> {
        let ids: BTreeSet<String> = self
            .forms_ids_list
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        if ids.is_empty() {
            None
        } else {
            Some(ids)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = TapConfig::from_json(r#"{"personal_access_token": "tfp_abc"}"#).unwrap();

        assert_eq!(config.personal_access_token, "tfp_abc");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_ms, 1000);
        assert!(config.forms_ids_list.is_none());
        assert!(config.start_date.is_none());
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let result = TapConfig::from_json(r#"{"forms_ids_list": "F1"}"#);
        assert!(result.is_err(), "personal_access_token is required");
    }

    #[test]
    fn test_blank_token_is_rejected() {
        let result = TapConfig::from_json(r#"{"personal_access_token": "   "}"#);
        assert!(result.is_err(), "blank token should be rejected");
    }

    #[test]
    fn test_start_date_parses_as_utc() {
        let config = TapConfig::from_json(
            r#"{"personal_access_token": "t", "start_date": "2023-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let expected: DateTime<Utc> = "2023-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(config.start_date, Some(expected));
    }

    #[test]
    fn test_forms_ids_split_and_trimmed() {
        let config = TapConfig::from_json(
            r#"{"personal_access_token": "t", "forms_ids_list": " F1, F3 ,,F7 "}"#,
        )
        .unwrap();

        let ids = config.forms_ids().unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("F1"));
        assert!(ids.contains("F3"));
        assert!(ids.contains("F7"));
    }

    #[test]
    fn test_forms_ids_unset_or_empty_means_no_filter() {
        let unset = TapConfig::from_json(r#"{"personal_access_token": "t"}"#).unwrap();
        assert!(unset.forms_ids().is_none());

        let empty =
            TapConfig::from_json(r#"{"personal_access_token": "t", "forms_ids_list": " , "}"#)
                .unwrap();
        assert!(empty.forms_ids().is_none());
    }
}
