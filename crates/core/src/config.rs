use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub anthropic: AnthropicConfig,
    pub server: ServerConfig,
    pub agent: AgentConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub max_tool_rounds: u32,
    pub driver_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub max_tool_rounds: Option<u32>,
    pub driver_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            anthropic: AnthropicConfig {
                api_key: None,
                model: "claude-sonnet-4-20250514".to_string(),
                max_tokens: 2000,
                timeout_secs: 60,
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 3002 },
            agent: AgentConfig { max_tool_rounds: 10, driver_timeout_secs: 60 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    anthropic: Option<AnthropicPatch>,
    server: Option<ServerPatch>,
    agent: Option<AgentPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct AnthropicPatch {
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    max_tool_rounds: Option<u32>,
    driver_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    /// Layered load: defaults, optional `navigator.toml`, `NAVIGATOR_*`
    /// environment overrides, then programmatic overrides, then
    /// validation. A missing dialogue-driver credential fails here so
    /// the process dies at startup rather than on the first chat turn.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("navigator.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(anthropic) = patch.anthropic {
            if let Some(api_key_value) = anthropic.api_key {
                self.anthropic.api_key = Some(secret_value(api_key_value));
            }
            if let Some(model) = anthropic.model {
                self.anthropic.model = model;
            }
            if let Some(max_tokens) = anthropic.max_tokens {
                self.anthropic.max_tokens = max_tokens;
            }
            if let Some(timeout_secs) = anthropic.timeout_secs {
                self.anthropic.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(agent) = patch.agent {
            if let Some(max_tool_rounds) = agent.max_tool_rounds {
                self.agent.max_tool_rounds = max_tool_rounds;
            }
            if let Some(driver_timeout_secs) = agent.driver_timeout_secs {
                self.agent.driver_timeout_secs = driver_timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        // ANTHROPIC_API_KEY and PORT are honored unprefixed for parity
        // with common deployment environments.
        let api_key = read_env("NAVIGATOR_ANTHROPIC_API_KEY").or_else(|| read_env("ANTHROPIC_API_KEY"));
        if let Some(value) = api_key {
            self.anthropic.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("NAVIGATOR_ANTHROPIC_MODEL") {
            self.anthropic.model = value;
        }
        if let Some(value) = read_env("NAVIGATOR_ANTHROPIC_MAX_TOKENS") {
            self.anthropic.max_tokens = parse_u32("NAVIGATOR_ANTHROPIC_MAX_TOKENS", &value)?;
        }
        if let Some(value) = read_env("NAVIGATOR_ANTHROPIC_TIMEOUT_SECS") {
            self.anthropic.timeout_secs = parse_u64("NAVIGATOR_ANTHROPIC_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("NAVIGATOR_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        let port = read_env("NAVIGATOR_SERVER_PORT").or_else(|| read_env("PORT"));
        if let Some(value) = port {
            self.server.port = parse_u16("NAVIGATOR_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("NAVIGATOR_AGENT_MAX_TOOL_ROUNDS") {
            self.agent.max_tool_rounds = parse_u32("NAVIGATOR_AGENT_MAX_TOOL_ROUNDS", &value)?;
        }
        if let Some(value) = read_env("NAVIGATOR_AGENT_DRIVER_TIMEOUT_SECS") {
            self.agent.driver_timeout_secs =
                parse_u64("NAVIGATOR_AGENT_DRIVER_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("NAVIGATOR_LOGGING_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("NAVIGATOR_LOGGING_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(api_key_value) = overrides.anthropic_api_key {
            self.anthropic.api_key = Some(secret_value(api_key_value));
        }
        if let Some(model) = overrides.anthropic_model {
            self.anthropic.model = model;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(max_tool_rounds) = overrides.max_tool_rounds {
            self.agent.max_tool_rounds = max_tool_rounds;
        }
        if let Some(driver_timeout_secs) = overrides.driver_timeout_secs {
            self.agent.driver_timeout_secs = driver_timeout_secs;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match &self.anthropic.api_key {
            None => {
                return Err(ConfigError::Validation(
                    "anthropic.api_key is required (set NAVIGATOR_ANTHROPIC_API_KEY or \
                     ANTHROPIC_API_KEY)"
                        .to_string(),
                ))
            }
            Some(api_key) if api_key.expose_secret().trim().is_empty() => {
                return Err(ConfigError::Validation(
                    "anthropic.api_key must not be empty".to_string(),
                ))
            }
            Some(_) => {}
        }

        if self.anthropic.model.trim().is_empty() {
            return Err(ConfigError::Validation("anthropic.model must not be empty".to_string()));
        }
        if self.agent.max_tool_rounds == 0 {
            return Err(ConfigError::Validation(
                "agent.max_tool_rounds must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }
    let default = PathBuf::from("navigator.toml");
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}
