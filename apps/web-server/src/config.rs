//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConfig;
use quill_infra::{PasswordConfig, RateLimitConfig};

use crate::background::SchedulerConfig;
use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations before serving.
    #[cfg(feature = "postgres")]
    pub auto_migrate: bool,
    pub password: PasswordConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub scheduler: SchedulerConfig,
    pub telemetry: TelemetryConfig,
}

/// Session cookie and lifetime settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Only send the cookie over HTTPS.
    pub cookie_secure: bool,
    pub ttl: chrono::Duration,
    /// Cron expression for the expired-session purge.
    pub purge_schedule: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "quill.sid".to_string(),
            cookie_secure: false,
            ttl: chrono::Duration::days(1),
            purge_schedule: "0 */15 * * * *".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cookie_name: env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            cookie_secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.cookie_secure),
            ttl: env_parse::<i64>("SESSION_TTL_SECONDS")
                .and_then(ttl_from_secs)
                .unwrap_or(defaults.ttl),
            purge_schedule: env::var("SESSION_PURGE_CRON").unwrap_or(defaults.purge_schedule),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = env_parse("DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = env_parse("DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            config.sqlx_logging = env::var("DB_LOG_STATEMENTS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false);
            config
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_parse("PORT").unwrap_or(3002),
            #[cfg(feature = "postgres")]
            database,
            #[cfg(feature = "postgres")]
            auto_migrate: env::var("DB_AUTO_MIGRATE")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            password: PasswordConfig::from_env(),
            session: SessionConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            scheduler: SchedulerConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }
}

/// A positive, representable session lifetime.
fn ttl_from_secs(secs: i64) -> Option<chrono::Duration> {
    chrono::Duration::try_seconds(secs).filter(|ttl| *ttl > chrono::Duration::zero())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Anything but an explicit "off" value enables a flag.
pub(crate) fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" OFF "));
        assert!(!parse_flag("0"));
    }

    #[test]
    fn session_ttl_rejects_out_of_range_values() {
        assert_eq!(ttl_from_secs(3600), Some(chrono::Duration::hours(1)));
        assert_eq!(ttl_from_secs(0), None);
        assert_eq!(ttl_from_secs(-5), None);
        assert_eq!(ttl_from_secs(i64::MAX), None);
    }

    #[test]
    fn session_defaults() {
        let session = SessionConfig::default();
        assert_eq!(session.cookie_name, "quill.sid");
        assert_eq!(session.ttl, chrono::Duration::days(1));
        assert!(!session.cookie_secure);
    }
}
