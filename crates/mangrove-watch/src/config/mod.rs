use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::triage::{PromotionReward, TriagePolicy};

const DEFAULT_LEADERBOARD_LIMIT: usize = 20;

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
    pub storage: StorageConfig,
    pub triage: TriageConfig,
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

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let data_dir = env::var("APP_DATA_DIR").unwrap_or_else(|_| "data".to_string());

        let moderator_token_digest = env::var("APP_MODERATOR_TOKEN_BLAKE3")
            .ok()
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty());
        if let Some(digest) = &moderator_token_digest {
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::InvalidModeratorDigest);
            }
        }

        let promotion_reward = match env::var("APP_PROMOTION_REWARD") {
            Ok(value) => parse_promotion_reward(&value)?,
            Err(_) => PromotionReward::default(),
        };

        let leaderboard_limit = match env::var("APP_LEADERBOARD_LIMIT") {
            Ok(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidLeaderboardLimit)?,
            Err(_) => DEFAULT_LEADERBOARD_LIMIT,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                data_dir: PathBuf::from(data_dir),
            },
            triage: TriageConfig {
                promotion_reward,
                leaderboard_limit,
                moderator_token_digest,
            },
        })
    }
}

fn parse_promotion_reward(value: &str) -> Result<PromotionReward, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on_change" | "once" => Ok(PromotionReward::OnStatusChange),
        "every" | "always" => Ok(PromotionReward::EveryPromotion),
        _ => Err(ConfigError::InvalidPromotionReward {
            value: value.to_string(),
        }),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
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
}

/// Where the JSON snapshot store keeps its documents.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

/// Reward policy, leaderboard size and the moderator credential digest.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    pub promotion_reward: PromotionReward,
    pub leaderboard_limit: usize,
    /// Lowercase hex BLAKE3 digest of the moderator bearer token. `None` disables moderation.
    pub moderator_token_digest: Option<String>,
}

impl TriageConfig {
    pub fn policy(&self) -> TriagePolicy {
        TriagePolicy {
            promotion_reward: self.promotion_reward,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidModeratorDigest,
    InvalidPromotionReward { value: String },
    InvalidLeaderboardLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidModeratorDigest => write!(
                f,
                "APP_MODERATOR_TOKEN_BLAKE3 must be a 64 character hex digest"
            ),
            ConfigError::InvalidPromotionReward { value } => write!(
                f,
                "APP_PROMOTION_REWARD must be 'on_change' or 'every' (found '{}')",
                value
            ),
            ConfigError::InvalidLeaderboardLimit => {
                write!(f, "APP_LEADERBOARD_LIMIT must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidModeratorDigest
            | ConfigError::InvalidPromotionReward { .. }
            | ConfigError::InvalidLeaderboardLimit => None,
        }
    }
}
