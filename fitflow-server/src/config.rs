//! Server configuration

use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in {1} environment")]
    MissingSecret(&'static str, String),

    #[error("{name} must be at least {min} characters long")]
    SecretTooShort { name: &'static str, min: usize },

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// What a second purchase does to an existing subscription window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenewalPolicy {
    /// Window restarts at the purchase instant
    #[default]
    Overwrite,
    /// An active, unexpired window is lengthened by the plan duration
    Extend,
}

impl FromStr for RenewalPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "extend" => Ok(Self::Extend),
            other => Err(ConfigError::InvalidValue {
                name: "SUBSCRIPTION_RENEWAL",
                value: other.to_string(),
            }),
        }
    }
}

/// JWT signing settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 secret (at least 32 bytes outside development)
    pub secret: String,
    pub expiry_hours: i64,
    pub issuer: String,
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "dev-JWT_SECRET-not-for-production".to_string(),
            expiry_hours: 168,
            issuer: "fitflow".to_string(),
            audience: "fitflow-clients".to_string(),
        }
    }
}

/// FitFlow server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file
    pub database_path: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    pub jwt: JwtConfig,
    /// Link included in gym credential emails
    pub frontend_url: String,
    pub email_from: String,
    pub renewal_policy: RenewalPolicy,
    /// First-run admin account
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Daily rolling log files are written here when the directory exists
    pub log_dir: Option<String>,
    /// Allowed CORS origin; any origin when unset
    pub cors_allow_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "fitflow.db".to_string(),
            http_port: 8080,
            environment: "development".to_string(),
            jwt: JwtConfig::default(),
            frontend_url: "http://localhost:5173".to_string(),
            email_from: "noreply@fitflow.app".to_string(),
            renewal_policy: RenewalPolicy::Overwrite,
            admin_email: None,
            admin_password: None,
            log_dir: None,
            cors_allow_origin: None,
        }
    }
}

const MIN_SECRET_LEN: usize = 32;

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &'static str, environment: &str) -> Result<String, ConfigError> {
        let val = match std::env::var(name) {
            Ok(v) if !v.is_empty() => v,
            _ => {
                if environment != "development" {
                    return Err(ConfigError::MissingSecret(name, environment.to_string()));
                }
                tracing::warn!("{name} not set, using development placeholder");
                return Ok(format!("dev-{name}-not-for-production"));
            }
        };
        if val.len() < MIN_SECRET_LEN && environment != "development" {
            return Err(ConfigError::SecretTooShort {
                name,
                min: MIN_SECRET_LEN,
            });
        }
        Ok(val)
    }

    fn optional(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|s| !s.trim().is_empty())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let http_port = match Self::optional("HTTP_PORT") {
            Some(p) => p.parse().map_err(|_| ConfigError::InvalidValue {
                name: "HTTP_PORT",
                value: p,
            })?,
            None => defaults.http_port,
        };

        let expiry_hours = match Self::optional("JWT_EXPIRY_HOURS") {
            Some(h) => h
                .parse()
                .ok()
                .filter(|h: &i64| *h > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "JWT_EXPIRY_HOURS",
                    value: h,
                })?,
            None => defaults.jwt.expiry_hours,
        };

        let renewal_policy = match Self::optional("SUBSCRIPTION_RENEWAL") {
            Some(p) => p.parse()?,
            None => RenewalPolicy::default(),
        };

        Ok(Self {
            database_path: Self::optional("DATABASE_PATH").unwrap_or(defaults.database_path),
            http_port,
            jwt: JwtConfig {
                secret: Self::require_secret("JWT_SECRET", &environment)?,
                expiry_hours,
                issuer: Self::optional("JWT_ISSUER").unwrap_or(defaults.jwt.issuer),
                audience: Self::optional("JWT_AUDIENCE").unwrap_or(defaults.jwt.audience),
            },
            frontend_url: Self::optional("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            email_from: Self::optional("EMAIL_FROM").unwrap_or(defaults.email_from),
            renewal_policy,
            admin_email: Self::optional("ADMIN_EMAIL"),
            admin_password: Self::optional("ADMIN_PASSWORD"),
            log_dir: Self::optional("LOG_DIR"),
            cors_allow_origin: Self::optional("CORS_ALLOW_ORIGIN"),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renewal_policy_parses_case_insensitively() {
        assert_eq!(
            "Extend".parse::<RenewalPolicy>().unwrap(),
            RenewalPolicy::Extend
        );
        assert_eq!(
            " overwrite ".parse::<RenewalPolicy>().unwrap(),
            RenewalPolicy::Overwrite
        );
        assert!("stack".parse::<RenewalPolicy>().is_err());
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database_path, "fitflow.db");
        assert_eq!(config.jwt.expiry_hours, 168);
        assert_eq!(config.jwt.issuer, "fitflow");
        assert_eq!(config.jwt.audience, "fitflow-clients");
        assert_eq!(config.renewal_policy, RenewalPolicy::Overwrite);
        assert!(config.is_development());
    }
}
