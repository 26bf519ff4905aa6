use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::survey::domain::PropertyType;

/// Largest photo upload request accepted by default: three 8 MiB camera
/// pictures after base64 encoding, with room for the JSON around them.
pub const DEFAULT_PHOTO_UPLOAD_LIMIT: usize = 40 * 1024 * 1024;

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

/// Top-level configuration for the survey service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub submission: SubmissionConfig,
    pub form: FormConfig,
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

        let endpoint_url = match env::var("SURVEY_ENDPOINT_URL") {
            Ok(raw) if !raw.trim().is_empty() => Some(validate_endpoint(raw.trim())?),
            _ => None,
        };
        let simulated_delay = env::var("SURVEY_SIMULATED_DELAY_MS")
            .unwrap_or_else(|_| "1500".to_string())
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidDelay)?;

        let default_type = match env::var("SURVEY_DEFAULT_TYPE") {
            Ok(raw) => raw
                .parse::<PropertyType>()
                .map_err(|_| ConfigError::InvalidPropertyType { value: raw })?,
            Err(_) => PropertyType::Land,
        };

        let photo_upload_limit = match env::var("SURVEY_PHOTO_UPLOAD_LIMIT_MB") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|mb| *mb > 0)
                .and_then(|mb| mb.checked_mul(1024 * 1024))
                .ok_or(ConfigError::InvalidUploadLimit)?,
            Err(_) => DEFAULT_PHOTO_UPLOAD_LIMIT,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            submission: SubmissionConfig {
                endpoint_url,
                simulated_delay,
            },
            form: FormConfig {
                default_type,
                photo_upload_limit,
            },
        })
    }
}

fn validate_endpoint(raw: &str) -> Result<String, ConfigError> {
    let lowered = raw.to_ascii_lowercase();
    if lowered.starts_with("https://") || lowered.starts_with("http://") {
        Ok(raw.to_string())
    } else {
        Err(ConfigError::InvalidEndpoint {
            value: raw.to_string(),
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where finished surveys go. Without an endpoint the simulated spreadsheet
/// is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionConfig {
    pub endpoint_url: Option<String>,
    pub simulated_delay: Duration,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            simulated_delay: Duration::from_millis(1500),
        }
    }
}

/// Form defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormConfig {
    /// Tab selected when the form first opens.
    pub default_type: PropertyType,
    /// Request body limit, in bytes, for photo uploads.
    pub photo_upload_limit: usize,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidEndpoint { value: String },
    InvalidDelay,
    InvalidPropertyType { value: String },
    InvalidUploadLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidEndpoint { value } => write!(
                f,
                "SURVEY_ENDPOINT_URL must be an http(s) URL, got '{}'",
                value
            ),
            ConfigError::InvalidDelay => {
                write!(f, "SURVEY_SIMULATED_DELAY_MS must be a whole number of milliseconds")
            }
            ConfigError::InvalidPropertyType { value } => write!(
                f,
                "SURVEY_DEFAULT_TYPE must be land, house, condo_apartment or commercial, got '{}'",
                value
            ),
            ConfigError::InvalidUploadLimit => write!(
                f,
                "SURVEY_PHOTO_UPLOAD_LIMIT_MB must be a positive whole number of megabytes"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidEndpoint { .. }
            | ConfigError::InvalidDelay
            | ConfigError::InvalidPropertyType { .. }
            | ConfigError::InvalidUploadLimit => None,
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
        env::remove_var("SURVEY_ENDPOINT_URL");
        env::remove_var("SURVEY_SIMULATED_DELAY_MS");
        env::remove_var("SURVEY_DEFAULT_TYPE");
        env::remove_var("SURVEY_PHOTO_UPLOAD_LIMIT_MB");
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
        assert_eq!(config.submission, SubmissionConfig::default());
        assert_eq!(config.form.default_type, PropertyType::Land);
        assert_eq!(config.form.photo_upload_limit, DEFAULT_PHOTO_UPLOAD_LIMIT);
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
    fn reads_submission_and_form_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var(
            "SURVEY_ENDPOINT_URL",
            "https://script.google.com/macros/s/abc/exec",
        );
        env::set_var("SURVEY_SIMULATED_DELAY_MS", "0");
        env::set_var("SURVEY_DEFAULT_TYPE", "Cond/Apto");
        env::set_var("SURVEY_PHOTO_UPLOAD_LIMIT_MB", "64");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.submission.endpoint_url.as_deref(),
            Some("https://script.google.com/macros/s/abc/exec")
        );
        assert_eq!(config.submission.simulated_delay, Duration::ZERO);
        assert_eq!(config.form.default_type, PropertyType::CondoApartment);
        assert_eq!(config.form.photo_upload_limit, 64 * 1024 * 1024);
        reset_env();
    }

    #[test]
    fn rejects_placeholder_endpoint() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SURVEY_ENDPOINT_URL", "YOUR_GOOGLE_SCRIPT_WEB_APP_URL");
        match AppConfig::load() {
            Err(ConfigError::InvalidEndpoint { value }) => {
                assert_eq!(value, "YOUR_GOOGLE_SCRIPT_WEB_APP_URL")
            }
            other => panic!("expected invalid endpoint, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_unknown_default_type() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SURVEY_DEFAULT_TYPE", "farm");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidPropertyType { .. })
        ));
        reset_env();
    }

    #[test]
    fn rejects_zero_upload_limit() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SURVEY_PHOTO_UPLOAD_LIMIT_MB", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidUploadLimit)
        ));
        reset_env();
    }
}
