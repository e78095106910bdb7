//! Startup configuration.
//!
//! The only required value is the API credential, read once from the
//! environment. Everything else has a default that command-line flags may
//! override. Nothing is persisted.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::provider::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::core::reveal::RevealSettings;

pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub reveal_delay_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub reveal: RevealSettings,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// None of the credential variables is set to a non-empty value.
    MissingApiKey,
    /// `--model` was given but blank.
    EmptyModel,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingApiKey => write!(
                f,
                "GEMINI_API_KEY environment variable not set\n\n\
                 Please set your Gemini API key:\n\
                 export GEMINI_API_KEY=\"your-api-key-here\"\n\n\
                 GOOGLE_API_KEY is accepted as a fallback. Optionally, set a custom base URL:\n\
                 export GEMINI_BASE_URL=\"{DEFAULT_BASE_URL}\""
            ),
            ConfigError::EmptyModel => write!(f, "Model name must not be empty"),
        }
    }
}

impl StdError for ConfigError {}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| non_empty(name))
            .map(|key| key.trim().to_string())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = non_empty(BASE_URL_VAR)
            .map(|url| url.trim().to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = match overrides.model {
            Some(model) if model.trim().is_empty() => return Err(ConfigError::EmptyModel),
            Some(model) => model.trim().to_string(),
            None => DEFAULT_MODEL.to_string(),
        };

        let reveal = overrides
            .reveal_delay_ms
            .map(|ms| RevealSettings::new(Duration::from_millis(ms)))
            .unwrap_or_default();

        Ok(Self {
            api_key,
            base_url,
            model,
            reveal,
            log_file: overrides.log_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config =
            Config::from_lookup(ConfigOverrides::default(), lookup(&[("GEMINI_API_KEY", "k")]))
                .expect("config");
        assert_eq!(config.api_key, "k");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.reveal, RevealSettings::default());
        assert!(config.log_file.is_none());
    }

    #[test]
    fn google_api_key_is_a_fallback() {
        let config = Config::from_lookup(
            ConfigOverrides::default(),
            lookup(&[("GEMINI_API_KEY", "  "), ("GOOGLE_API_KEY", "fallback")]),
        )
        .expect("config");
        assert_eq!(config.api_key, "fallback");
    }

    #[test]
    fn missing_key_is_an_error_with_instructions() {
        let err = Config::from_lookup(ConfigOverrides::default(), lookup(&[]))
            .expect_err("missing key");
        assert_eq!(err, ConfigError::MissingApiKey);
        assert!(err.to_string().contains("export GEMINI_API_KEY"));
    }

    #[test]
    fn overrides_replace_defaults() {
        let overrides = ConfigOverrides {
            model: Some("gemini-2.5-pro".into()),
            reveal_delay_ms: Some(0),
            log_file: Some(PathBuf::from("chat.log")),
        };
        let config = Config::from_lookup(
            overrides,
            lookup(&[
                ("GEMINI_API_KEY", "k"),
                ("GEMINI_BASE_URL", "http://localhost:8080/v1beta"),
            ]),
        )
        .expect("config");
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.base_url, "http://localhost:8080/v1beta");
        assert_eq!(config.reveal, RevealSettings::instant());
        assert_eq!(config.log_file, Some(PathBuf::from("chat.log")));
    }

    #[test]
    fn blank_model_is_rejected() {
        let overrides = ConfigOverrides {
            model: Some(" ".into()),
            ..ConfigOverrides::default()
        };
        let err = Config::from_lookup(overrides, lookup(&[("GEMINI_API_KEY", "k")]))
            .expect_err("blank model");
        assert_eq!(err, ConfigError::EmptyModel);
    }
}
