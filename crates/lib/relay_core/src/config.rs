//! Relay configuration.
//!
//! The system instruction and the generation parameters are data, loaded
//! from an optional YAML file. Every field has a default so a partial file
//! (or no file at all) yields a usable configuration.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default persona used when no configuration file overrides it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful customer support assistant. \
Answer questions clearly and concisely. If you do not know the answer, say so and \
suggest contacting a human agent.";

/// Default upper bound on the trimmed length of a chat message.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 4000;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Fixed sampling parameters sent with every downstream request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            max_tokens: 500,
            temperature: 0.7,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

/// Where and how to reach the downstream generation API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownstreamSettings {
    /// Base URL; `chat/completions` is resolved against it.
    pub api_base: Url,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DownstreamSettings {
    fn default() -> Self {
        Self {
            api_base: Url::parse("https://api.openai.com/v1/").expect("static URL is valid"),
            timeout_secs: 25,
        }
    }
}

/// Resolves `path` beneath `base`, keeping every segment of `base`.
///
/// `Url::join` replaces the last segment of a base without a trailing
/// slash, so `https://host/v1` + `chat` would become `https://host/chat`.
pub fn join_under(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    if base.path().ends_with('/') {
        return base.join(path);
    }
    let mut dir = base.clone();
    dir.set_path(&format!("{}/", base.path()));
    dir.join(path)
}

/// Complete relay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub system_prompt: String,
    pub max_message_length: usize,
    pub generation: GenerationParams,
    pub downstream: DownstreamSettings,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            generation: GenerationParams::default(),
            downstream: DownstreamSettings::default(),
        }
    }
}

impl RelayConfig {
    /// Loads configuration from `path`, or the defaults when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_yaml(&text)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from YAML text without validating it.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system_prompt.trim().is_empty() {
            return Err(ConfigError::Invalid("system_prompt must not be empty".into()));
        }
        if self.max_message_length == 0 {
            return Err(ConfigError::Invalid(
                "max_message_length must be greater than zero".into(),
            ));
        }
        let g = &self.generation;
        if g.model.trim().is_empty() {
            return Err(ConfigError::Invalid("generation.model must not be empty".into()));
        }
        if g.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "generation.max_tokens must be greater than zero".into(),
            ));
        }
        if !(0.0..=2.0).contains(&g.temperature) {
            return Err(ConfigError::Invalid(format!(
                "generation.temperature must be within 0..=2, got {}",
                g.temperature
            )));
        }
        if !(g.top_p > 0.0 && g.top_p <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "generation.top_p must be within (0, 1], got {}",
                g.top_p
            )));
        }
        for (name, value) in [
            ("frequency_penalty", g.frequency_penalty),
            ("presence_penalty", g.presence_penalty),
        ] {
            if !(-2.0..=2.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "generation.{name} must be within -2..=2, got {value}"
                )));
            }
        }
        if self.downstream.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "downstream.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Deployment environment. Governs whether diagnostic detail is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }

    /// Diagnostic detail may accompany error envelopes.
    pub fn exposes_details(self) -> bool {
        !matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        })
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
