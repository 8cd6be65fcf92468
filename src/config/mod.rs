use crate::workflows::lottery::{ReservationPolicy, WinnerPolicy};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub lottery: LotteryConfig,
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

        let winner_policy = match env::var("APP_LOTTERY_WINNER_POLICY") {
            Ok(raw) => WinnerPolicy::parse(&raw)
                .ok_or(ConfigError::InvalidWinnerPolicy { value: raw })?,
            Err(_) => WinnerPolicy::default(),
        };
        let reservation_policy = match env::var("APP_LOTTERY_RESERVATION_POLICY") {
            Ok(raw) => ReservationPolicy::parse(&raw)
                .ok_or(ConfigError::InvalidReservationPolicy { value: raw })?,
            Err(_) => ReservationPolicy::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            lottery: LotteryConfig {
                winner_policy,
                reservation_policy,
            },
        })
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Draw policies applied to every lottery run of the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LotteryConfig {
    pub winner_policy: WinnerPolicy,
    pub reservation_policy: ReservationPolicy,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidWinnerPolicy { value: String },
    InvalidReservationPolicy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidWinnerPolicy { value } => write!(
                f,
                "APP_LOTTERY_WINNER_POLICY must be 'exclusive' or 'repeat' (got '{value}')"
            ),
            ConfigError::InvalidReservationPolicy { value } => write!(
                f,
                "APP_LOTTERY_RESERVATION_POLICY must be 'cross_spot' or 'per_spot' (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidWinnerPolicy { .. }
            | ConfigError::InvalidReservationPolicy { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_LOTTERY_WINNER_POLICY");
        env::remove_var("APP_LOTTERY_RESERVATION_POLICY");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.lottery.winner_policy, WinnerPolicy::Exclusive);
        assert_eq!(
            config.lottery.reservation_policy,
            ReservationPolicy::CrossSpotExclusion
        );
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_lottery_policies() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_LOTTERY_WINNER_POLICY", "Repeat");
        env::set_var("APP_LOTTERY_RESERVATION_POLICY", "per_spot");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.lottery.winner_policy, WinnerPolicy::Repeat);
        assert_eq!(config.lottery.reservation_policy, ReservationPolicy::PerSpot);
        reset_env();
    }

    #[test]
    fn rejects_unknown_winner_policy() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_LOTTERY_WINNER_POLICY", "sometimes");
        let error = AppConfig::load().expect_err("invalid policy rejected");
        assert!(matches!(error, ConfigError::InvalidWinnerPolicy { .. }));
        reset_env();
    }
}
