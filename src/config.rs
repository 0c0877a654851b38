//! Runtime configuration loaded from `ussd.toml`.
//!
//! Every key is optional. A missing file yields the defaults. The
//! `USSD_DIRECTORY_PASSWORD` environment variable takes precedence over the
//! file's directory password.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "ussd.toml";

const PASSWORD_ENV: &str = "USSD_DIRECTORY_PASSWORD";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UssdConfig {
    /// Language used for directory lookups and as the fallback user language.
    #[serde(default = "default_lang")]
    pub default_lang: String,

    /// QA mode: a completed registration restarts from the language menu.
    #[serde(default)]
    pub qa: bool,

    /// Live directory API. Absent means the built-in stub data is served.
    #[serde(default)]
    pub directory: Option<DirectoryConfig>,

    /// `[pool, tag]` endpoint for outbound SMS. Absent suppresses SMS.
    #[serde(default)]
    pub sms_tag: Option<Vec<String>>,

    #[serde(default = "default_metric_store")]
    pub metric_store: String,

    /// Sender address patterns allowed past the language menu. Empty allows
    /// every sender.
    #[serde(default)]
    pub valid_user_addresses: Vec<String>,

    /// Directory for per-address session files. Absent keeps sessions in
    /// memory.
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_metric_store() -> String {
    "default".to_string()
}

impl Default for UssdConfig {
    fn default() -> Self {
        Self {
            default_lang: default_lang(),
            qa: false,
            directory: None,
            sms_tag: None,
            metric_store: default_metric_store(),
            valid_user_addresses: Vec::new(),
            session_dir: None,
        }
    }
}

impl UssdConfig {
    /// Load and validate the configuration at `path`, falling back to the
    /// defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<UssdConfig>(&contents)?
        } else {
            Self::default()
        };

        if let Ok(password) = std::env::var(PASSWORD_ENV)
            && !password.is_empty()
        {
            config.override_password(password);
        }

        config.validate()?;
        Ok(config)
    }

    fn override_password(&mut self, password: String) {
        if let Some(directory) = self.directory.as_mut() {
            directory.password = Some(password);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(directory) = &self.directory {
            if directory.url.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "[directory] requires a non-empty url".into(),
                ));
            }
            if directory.username.is_some() && directory.password.is_none() {
                return Err(ConfigError::Invalid(
                    "[directory] username is set but password is missing".into(),
                ));
            }
        }
        if let Some(tag) = &self.sms_tag
            && tag.len() != 2
        {
            return Err(ConfigError::Invalid(format!(
                "sms_tag must be [pool, tag], got {} entries",
                tag.len()
            )));
        }
        self.address_policy()?;
        Ok(())
    }

    pub fn sms_tag(&self) -> Option<(String, String)> {
        match self.sms_tag.as_deref() {
            Some([pool, tag]) => Some((pool.clone(), tag.clone())),
            _ => None,
        }
    }

    pub fn address_policy(&self) -> Result<AddressPolicy, ConfigError> {
        AddressPolicy::new(&self.valid_user_addresses)
    }
}

/// Compiled sender allow-list. A sender is allowed when any pattern matches
/// somewhere in its address.
#[derive(Debug, Clone, Default)]
pub struct AddressPolicy {
    patterns: Vec<Regex>,
}

impl AddressPolicy {
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn allows(&self, address: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.is_match(address))
    }
}
