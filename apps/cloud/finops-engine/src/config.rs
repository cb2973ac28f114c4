//! Configuration for the finops engine, generalized from the teacher's
//! `pricing-collector::config::Config`.

use core_config::{ConfigError, FromEnv};
use database::postgres::PostgresConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: PostgresConfig,
    pub aws_default_region: String,
    pub scheduler_cron: String,
    pub port: u16,
    pub mock_mode: bool,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_cron() -> String {
    // 6-field (seconds-leading), per the `cron` crate `tokio_cron_scheduler`
    // parses with — a bare 5-field Unix expression fails to parse.
    "0 */1 * * * *".to_string()
}

fn default_port() -> u16 {
    4000
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            database: PostgresConfig::from_env()?,
            aws_default_region: std::env::var("AWS_DEFAULT_REGION")
                .unwrap_or_else(|_| default_region()),
            scheduler_cron: std::env::var("SCHEDULER_CRON").unwrap_or_else(|_| default_cron()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_port),
            // Never silently true in production: an explicit opt-in is required.
            mock_mode: std::env::var("FINOPS_MOCK_MODE")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_mode_defaults_to_false_when_unset() {
        assert!(!Config::mock_mode_from_str(None));
    }

    #[test]
    fn mock_mode_requires_explicit_true_or_one() {
        assert!(Config::mock_mode_from_str(Some("true")));
        assert!(Config::mock_mode_from_str(Some("1")));
        assert!(!Config::mock_mode_from_str(Some("false")));
        assert!(!Config::mock_mode_from_str(Some("yes")));
    }

    #[test]
    fn default_cron_runs_every_minute() {
        assert_eq!(default_cron(), "0 */1 * * * *");
    }
}

#[cfg(test)]
impl Config {
    fn mock_mode_from_str(value: Option<&str>) -> bool {
        value
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false)
    }
}
