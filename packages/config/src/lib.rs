// ABOUTME: Portal configuration loaded from environment variables
// ABOUTME: Backend service URLs, request timeouts, login callback and session file settings

pub mod constants;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use constants::*;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("Invalid boolean for {name}: {value} (expected true/false)")]
    InvalidBool { name: &'static str, value: String },
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("{name} must be greater than zero")]
    ZeroDuration { name: &'static str },
    #[error("{name} is not an http(s) URL: {value}")]
    InvalidUrl { name: &'static str, value: String },
    #[error("Could not determine home directory")]
    NoHomeDirectory,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Runtime configuration shared by the CLI and the service crates.
#[derive(Debug, Clone, PartialEq)]
pub struct PortalConfig {
    pub iam_url: String,
    pub employee_url: String,
    pub asset_url: String,
    pub tenant_url: String,
    pub request_timeout: Duration,
    pub attach_bearer: bool,
    pub callback_port: u16,
    pub callback_timeout: Duration,
    pub session_file: PathBuf,
}

impl PortalConfig {
    pub fn from_env() -> ConfigResult<Self> {
        let iam_url = url_var(WORKSPHERE_IAM_URL, None, DEFAULT_IAM_URL)?;
        let employee_url = url_var(
            WORKSPHERE_EMPLOYEE_URL,
            Some(VITE_EMPLOYEE_MANAGEMENT_URL),
            DEFAULT_EMPLOYEE_URL,
        )?;
        let asset_url = url_var(
            WORKSPHERE_ASSET_URL,
            Some(VITE_ASSET_MANAGEMENT_URL),
            DEFAULT_ASSET_URL,
        )?;
        let tenant_url = url_var(WORKSPHERE_TENANT_URL, None, DEFAULT_TENANT_URL)?;

        let timeout_ms = number_var(WORKSPHERE_REQUEST_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                name: WORKSPHERE_REQUEST_TIMEOUT_MS,
            });
        }

        let attach_bearer = bool_var(WORKSPHERE_ATTACH_BEARER, true)?;

        let port = number_var(WORKSPHERE_CALLBACK_PORT, DEFAULT_CALLBACK_PORT as u64)?;
        let callback_port =
            u16::try_from(port).map_err(|_| ConfigError::InvalidNumber {
                name: WORKSPHERE_CALLBACK_PORT,
                value: port.to_string(),
            })?;
        if callback_port == 0 {
            return Err(ConfigError::PortOutOfRange(callback_port));
        }

        let callback_secs =
            number_var(WORKSPHERE_CALLBACK_TIMEOUT_SECS, DEFAULT_CALLBACK_TIMEOUT_SECS)?;
        if callback_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                name: WORKSPHERE_CALLBACK_TIMEOUT_SECS,
            });
        }

        let session_file = match env::var(WORKSPHERE_SESSION_FILE) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => default_session_file()?,
        };

        let config = PortalConfig {
            iam_url,
            employee_url,
            asset_url,
            tenant_url,
            request_timeout: Duration::from_millis(timeout_ms),
            attach_bearer,
            callback_port,
            callback_timeout: Duration::from_secs(callback_secs),
            session_file,
        };
        debug!("Loaded portal configuration: {:?}", config);
        Ok(config)
    }

    /// Origin the identity provider redirects back to after login.
    pub fn callback_origin(&self) -> String {
        format!("http://localhost:{}", self.callback_port)
    }
}

/// `~/.worksphere/session.toml`
pub fn default_session_file() -> ConfigResult<PathBuf> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(home.join(".worksphere").join("session.toml"))
}

fn url_var(name: &'static str, legacy: Option<&str>, default: &str) -> ConfigResult<String> {
    let value = env::var(name)
        .ok()
        .or_else(|| legacy.and_then(|l| env::var(l).ok()))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string());

    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl { name, value });
    }
    Ok(value.trim_end_matches('/').to_string())
}

fn number_var(name: &'static str, default: u64) -> ConfigResult<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn bool_var(name: &'static str, default: bool) -> ConfigResult<bool> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidBool { name, value: raw }),
        },
        Err(_) => Ok(default),
    }
}
