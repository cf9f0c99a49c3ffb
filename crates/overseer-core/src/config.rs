//! Process configuration.
//!
//! Values come from environment variables with built-in defaults; the CLI
//! overrides individual fields from its flags. Invalid values and missing
//! credentials surface as [`OverseerError::Configuration`] at startup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use overseer_agents::{
    AgentAdapter, AgentKind, GeminiBackend, GeminiConfig, MockAgent, RemoteAgent, SearchConfig,
    WebSearchAgent, DEFAULT_GEMINI_ENDPOINT,
};
use overseer_state::JsonlLogStore;

use crate::domain::{OverseerError, Result};
use crate::rubric_bank::RubricBank;
use crate::runner::{RunnerConfig, DEFAULT_LOOP_DELAY};

pub const ENV_LOG_DIR: &str = "OVERSEER_LOG_DIR";
pub const ENV_LOOP_DELAY_SECS: &str = "OVERSEER_LOOP_DELAY_SECS";
pub const ENV_EXTERNAL_TIMEOUT_SECS: &str = "OVERSEER_EXTERNAL_TIMEOUT_SECS";
pub const ENV_RUBRIC_FILE: &str = "OVERSEER_RUBRIC_FILE";
pub const ENV_MODEL: &str = "OVERSEER_MODEL";
pub const ENV_MODEL_ENDPOINT: &str = "OVERSEER_MODEL_ENDPOINT";
pub const ENV_API_KEY: &str = "GOOGLE_API_KEY";

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_EXTERNAL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverseerConfig {
    pub log_dir: PathBuf,
    pub loop_delay: Duration,
    pub external_timeout: Duration,
    pub rubric_file: Option<PathBuf>,
    pub model: String,
    pub model_endpoint: String,
    pub api_key: Option<String>,
}

impl Default for OverseerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            loop_delay: DEFAULT_LOOP_DELAY,
            external_timeout: DEFAULT_EXTERNAL_TIMEOUT,
            rubric_file: None,
            model: DEFAULT_MODEL.to_string(),
            model_endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            api_key: None,
        }
    }
}

impl OverseerConfig {
    /// Read configuration from the process environment.
    ///
    /// Unset variables fall back to defaults; malformed numbers are
    /// configuration errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            log_dir: get(ENV_LOG_DIR).map(PathBuf::from).unwrap_or(defaults.log_dir),
            loop_delay: match get(ENV_LOOP_DELAY_SECS) {
                Some(raw) => parse_secs(ENV_LOOP_DELAY_SECS, &raw)?,
                None => defaults.loop_delay,
            },
            external_timeout: match get(ENV_EXTERNAL_TIMEOUT_SECS) {
                Some(raw) => parse_secs(ENV_EXTERNAL_TIMEOUT_SECS, &raw)?,
                None => defaults.external_timeout,
            },
            rubric_file: get(ENV_RUBRIC_FILE).map(PathBuf::from),
            model: get(ENV_MODEL).unwrap_or(defaults.model),
            model_endpoint: get(ENV_MODEL_ENDPOINT).unwrap_or(defaults.model_endpoint),
            api_key: get(ENV_API_KEY),
        })
    }

    /// Check that everything `kind` needs is present.
    pub fn validate_for(&self, kind: AgentKind) -> Result<()> {
        if self.external_timeout.is_zero() {
            return Err(OverseerError::Configuration(format!(
                "{ENV_EXTERNAL_TIMEOUT_SECS} must be greater than zero"
            )));
        }
        if kind == AgentKind::Remote && self.api_key.is_none() {
            return Err(OverseerError::Configuration(format!(
                "{ENV_API_KEY} is required for the remote agent"
            )));
        }
        Ok(())
    }

    /// The configured rubric file, or the built-in bank.
    pub fn load_rubrics(&self) -> Result<RubricBank> {
        match &self.rubric_file {
            Some(path) => RubricBank::from_json_file(path),
            None => Ok(RubricBank::builtin()),
        }
    }

    /// Open (creating if needed) the log directory.
    pub fn open_store(&self) -> Result<JsonlLogStore> {
        Ok(JsonlLogStore::open(&self.log_dir)?)
    }

    /// Runner settings for a single-prompt cycle with the configured delay.
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            delay: self.loop_delay,
            ..RunnerConfig::default()
        }
    }

    /// Construct the agent selected by `kind`. Validates first.
    pub fn build_agent(&self, kind: AgentKind) -> Result<AgentAdapter> {
        self.validate_for(kind)?;
        let search = SearchConfig {
            timeout: self.external_timeout,
            ..SearchConfig::default()
        };

        let agent: AgentAdapter = match kind {
            AgentKind::Mock => MockAgent::new()
                .with_search_fallback(WebSearchAgent::with_default_sources(search)?)
                .into(),
            AgentKind::WebSearch => WebSearchAgent::with_default_sources(search)?.into(),
            AgentKind::Remote => {
                let api_key = self.api_key.as_deref().unwrap_or_default();
                let backend = GeminiBackend::new(
                    GeminiConfig::new(&self.model, api_key)
                        .with_endpoint(&self.model_endpoint)
                        .with_timeout(self.external_timeout),
                )?;
                RemoteAgent::new(self.model.clone(), Arc::new(backend), self.external_timeout)
                    .into()
            }
        };
        Ok(agent)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| {
            OverseerError::Configuration(format!(
                "{key} must be a whole number of seconds, got '{raw}'"
            ))
        })
}
