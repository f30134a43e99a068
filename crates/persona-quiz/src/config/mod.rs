use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::quiz::scoring::{ScoringConfig, DEFAULT_CONFIDENCE_CEILING, DEFAULT_TURBULENCE_THRESHOLD};

const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "https://type.va-n.com",
    "https://mbti-app.qmpro.workers.dev",
    "http://localhost:8787",
];

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
    pub quiz: QuizConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let cors_origins = match env::var("APP_CORS_ORIGINS") {
            Ok(raw) => split_list(&raw),
            Err(_) => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw)?,
            Err(_) => LogFormat::Compact,
        };

        let scoring = ScoringConfig {
            confidence_ceiling: positive_float("QUIZ_CONFIDENCE_CEILING", DEFAULT_CONFIDENCE_CEILING)?,
            turbulence_threshold: positive_float(
                "QUIZ_TURBULENCE_THRESHOLD",
                DEFAULT_TURBULENCE_THRESHOLD,
            )?,
        };

        let quiz = QuizConfig {
            catalog_path: env::var("QUIZ_CATALOG_PATH").ok().map(PathBuf::from),
            assets_dir: env::var("APP_ASSETS_DIR").ok().map(PathBuf::from),
        };

        let dev_tokens = match env::var("APP_DEV_TOKENS") {
            Ok(raw) => parse_dev_tokens(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                cors_origins,
            },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            scoring,
            quiz,
            auth: AuthConfig { dev_tokens },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compact" | "" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            _ => Err(ConfigError::InvalidLogFormat {
                value: raw.to_string(),
            }),
        }
    }
}

/// Where question content and static assets come from.
#[derive(Debug, Clone, Default)]
pub struct QuizConfig {
    pub catalog_path: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
}

/// Credentials accepted by the development token verifier.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub dev_tokens: Vec<DevToken>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevToken {
    pub token: String,
    pub user_id: String,
    pub session_id: String,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn positive_float(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
            _ => Err(ConfigError::InvalidNumber { key, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

/// `token=user:session` pairs separated by commas.
fn parse_dev_tokens(raw: &str) -> Result<Vec<DevToken>, ConfigError> {
    split_list(raw)
        .into_iter()
        .map(|entry| {
            let parsed = entry.split_once('=').and_then(|(token, identity)| {
                let (user_id, session_id) = identity.split_once(':')?;
                Some(DevToken {
                    token: token.trim().to_string(),
                    user_id: user_id.trim().to_string(),
                    session_id: session_id.trim().to_string(),
                })
            });
            match parsed {
                Some(token)
                    if !token.token.is_empty()
                        && !token.user_id.is_empty()
                        && !token.session_id.is_empty() =>
                {
                    Ok(token)
                }
                _ => Err(ConfigError::InvalidDevToken { entry }),
            }
        })
        .collect()
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat { value: String },
    InvalidNumber { key: &'static str, value: String },
    InvalidDevToken { entry: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat { value } => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'pretty', got '{value}'")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a positive number, got '{value}'")
            }
            ConfigError::InvalidDevToken { entry } => write!(
                f,
                "APP_DEV_TOKENS entry '{entry}' must look like token=user:session"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) fn env_guard() -> &'static std::sync::Mutex<()> {
    static GUARD: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
    GUARD.get_or_init(|| std::sync::Mutex::new(()))
}
