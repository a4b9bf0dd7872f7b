//! Server configuration
//!
//! Built once at boot from the process environment and shared read-only.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use pawtale::ModerationMode;
use thiserror::Error;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_PIMS_BASE_URL: &str = "https://api.mybalto.com/api:D60OKSek";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Deployment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub json_mode: bool,
}

#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Used when a request does not say whether to moderate
    pub default_check: bool,
    pub mode: ModerationMode,
}

#[derive(Debug, Clone)]
pub struct PimsConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// True only when PIMS_BASE_URL was set explicitly
    pub configured: bool,
}

#[derive(Debug, Clone)]
pub struct XanoConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub frontend_url: String,
    pub extra_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub general_window: Duration,
    pub general_max: u32,
    pub generation_window: Duration,
    pub generation_max: u32,
}

/// Immutable application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub openai: OpenAiConfig,
    pub moderation: ModerationConfig,
    pub pims: PimsConfig,
    /// None disables story persistence
    pub xano: Option<XanoConfig>,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load from the process environment (call `dotenvy::dotenv()` first)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let api_key = env.get("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let environment = match env.get("APP_ENV").or_else(|| env.get("NODE_ENV")) {
            Some(raw) => raw.parse::<Environment>().map_err(|reason| ConfigError::Invalid {
                key: "APP_ENV",
                value: raw,
                reason,
            })?,
            None => Environment::Development,
        };

        let pims_base_url = env.get("PIMS_BASE_URL");

        let xano = match env.get("XANO_BASE_URL") {
            Some(base_url) => Some(XanoConfig {
                base_url,
                api_key: env.get("XANO_API_KEY"),
                timeout: env.millis("XANO_TIMEOUT_MS", 10_000)?,
            }),
            None => None,
        };

        let extra_origins = env
            .get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: env.get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env.parsed("PORT", 3001)?,
            environment,
            openai: OpenAiConfig {
                api_key,
                base_url: env
                    .get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                model: env
                    .get("OPENAI_MODEL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                timeout: env.millis("OPENAI_TIMEOUT_MS", 60_000)?,
                json_mode: env.flag("OPENAI_JSON_MODE", false)?,
            },
            moderation: ModerationConfig {
                default_check: env.flag("MODERATION_DEFAULT", false)?,
                mode: env.parsed("MODERATION_MODE", ModerationMode::Flag)?,
            },
            pims: PimsConfig {
                configured: pims_base_url.is_some(),
                base_url: pims_base_url.unwrap_or_else(|| DEFAULT_PIMS_BASE_URL.to_string()),
                api_key: env.get("PIMS_API_KEY"),
                timeout: env.millis("PIMS_TIMEOUT_MS", 15_000)?,
            },
            xano,
            cors: CorsConfig {
                frontend_url: env
                    .get("FRONTEND_URL")
                    .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
                extra_origins,
            },
            rate_limit: RateLimitConfig {
                general_window: Duration::from_secs(15 * 60),
                general_max: 100,
                generation_window: env.millis("RATE_LIMIT_WINDOW_MS", 900_000)?,
                generation_max: env.parsed("MAX_REQUESTS_PER_WINDOW", 10)?,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Raw error detail may only reach clients outside production
    pub fn expose_error_details(&self) -> bool {
        !self.is_production()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn persistence_enabled(&self) -> bool {
        self.xano.is_some()
    }
}

/// Typed access to string variables; empty values count as unset
struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value: raw,
            }),
            None => Ok(default),
        }
    }

    fn millis(&self, key: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
        let ms: u64 = self.parsed(key, default_ms)?;
        if ms == 0 {
            return Err(ConfigError::Invalid {
                key,
                value: ms.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(Duration::from_millis(ms))
    }

    fn flag(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key) {
            Some(raw) => match raw.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::Invalid {
                    key,
                    value: raw,
                    reason: "expected a boolean".to_string(),
                }),
            },
            None => Ok(default),
        }
    }
}
