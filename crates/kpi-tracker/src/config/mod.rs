use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_DATA_FILE: &str = "data/kpi_records.json";

/// Deployment stage, from `APP_ENV`. Anything unrecognised is development.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the service and the CLI read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Read `.env` (if present) and then the process environment.
    ///
    /// Blank variables count as unset.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = setting("APP_ENV")
            .map(|value| AppEnvironment::parse(&value))
            .unwrap_or_default();

        let port = match setting("APP_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            environment,
            server: ServerConfig {
                host: setting("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
            },
            telemetry: TelemetryConfig {
                log_level: setting("APP_LOG_LEVEL")
                    .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            },
            storage: StorageConfig {
                data_file: setting("KPI_DATA_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            },
        })
    }
}

fn setting(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `localhost` maps to the IPv4 loopback; anything else must be an IP.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost {
                value: self.host.clone(),
                source,
            })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the record list is kept between runs.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_file: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        value: String,
    },
    InvalidHost {
        value: String,
        source: std::net::AddrParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort { value } => {
                write!(f, "APP_PORT '{value}' is not a port number")
            }
            ConfigError::InvalidHost { value, .. } => {
                write!(f, "APP_HOST '{value}' is not an IP address or localhost")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort { .. } => None,
            ConfigError::InvalidHost { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    const VARS: [&str; 5] = [
        "APP_ENV",
        "APP_HOST",
        "APP_PORT",
        "APP_LOG_LEVEL",
        "KPI_DATA_FILE",
    ];

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn with_env<T>(vars: &[(&str, &str)], check: impl FnOnce() -> T) -> T {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        VARS.iter().for_each(|name| env::remove_var(name));
        for (name, value) in vars {
            env::set_var(name, value);
        }
        let result = check();
        VARS.iter().for_each(|name| env::remove_var(name));
        result
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = with_env(&[], AppConfig::load).expect("config loads with defaults");

        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.telemetry.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.storage.data_file, PathBuf::from(DEFAULT_DATA_FILE));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = with_env(&[("APP_PORT", "  "), ("KPI_DATA_FILE", "")], AppConfig::load)
            .expect("config loads");

        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.storage.data_file, PathBuf::from(DEFAULT_DATA_FILE));
    }

    #[test]
    fn environment_overrides_are_read() {
        let config = with_env(
            &[
                ("APP_ENV", "prod"),
                ("APP_PORT", "8080"),
                ("KPI_DATA_FILE", "/var/lib/kpi/records.json"),
            ],
            AppConfig::load,
        )
        .expect("config loads");

        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.environment.to_string(), "production");
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.storage.data_file,
            PathBuf::from("/var/lib/kpi/records.json")
        );
    }

    #[test]
    fn invalid_port_names_the_value() {
        let error = with_env(&[("APP_PORT", "lapan")], AppConfig::load)
            .expect_err("port must be numeric");

        assert!(matches!(&error, ConfigError::InvalidPort { value } if value == "lapan"));
        assert!(error.to_string().contains("'lapan'"));
    }

    #[test]
    fn localhost_resolves_to_loopback() {
        let server = ServerConfig {
            host: "LOCALHOST".to_string(),
            port: 3000,
        };

        let addr = server.socket_addr().expect("localhost resolves");

        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn hostnames_are_rejected() {
        let server = ServerConfig {
            host: "kpi.internal".to_string(),
            port: 3000,
        };

        let error = server.socket_addr().expect_err("hostname rejected");

        assert!(matches!(error, ConfigError::InvalidHost { .. }));
    }
}
