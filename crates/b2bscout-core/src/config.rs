use crate::app_config::{AppConfig, MAX_PAGES_HARD_CAP};
use crate::crawl_config::DEFAULT_USER_AGENT;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; the lookup is injected so the parsing rules
/// can be tested against a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_secs = |var: &str, raw: &str| -> Result<f64, ConfigError> {
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(
                var,
                format!("must be a non-negative number of seconds, got {raw}"),
            ));
        }
        Ok(value)
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let log_level = or_default("B2BSCOUT_LOG_LEVEL", "info");

    let crawl_delay_secs = parse_secs(
        "B2BSCOUT_CRAWL_DELAY_SECS",
        &or_default("B2BSCOUT_CRAWL_DELAY_SECS", "3.0"),
    )?;
    let crawl_jitter_secs = match lookup("B2BSCOUT_CRAWL_JITTER_SECS") {
        Ok(raw) => parse_secs("B2BSCOUT_CRAWL_JITTER_SECS", &raw)?,
        Err(_) => crawl_delay_secs * 0.3,
    };

    let headless = parse_bool(&or_default("B2BSCOUT_HEADLESS", "true"))
        .ok_or_else(|| invalid("B2BSCOUT_HEADLESS", "expected true or false".to_string()))?;

    let concurrency = parse_usize("B2BSCOUT_CONCURRENCY", "1")?.max(1);
    let user_agent = or_default("B2BSCOUT_USER_AGENT", DEFAULT_USER_AGENT);

    let max_pages = parse_usize("B2BSCOUT_MAX_PAGES", "1000")?;
    if max_pages == 0 {
        return Err(invalid("B2BSCOUT_MAX_PAGES", "must be at least 1".to_string()));
    }
    let max_pages = max_pages.min(MAX_PAGES_HARD_CAP);

    let max_records_per_category = parse_usize("B2BSCOUT_MAX_RECORDS_PER_CATEGORY", "5000")?;
    let robots_timeout_secs = parse_u64("B2BSCOUT_ROBOTS_TIMEOUT_SECS", "10")?;
    let navigation_timeout_secs = parse_u64("B2BSCOUT_NAVIGATION_TIMEOUT_SECS", "60")?;
    let settle_delay_ms = parse_u64("B2BSCOUT_SETTLE_DELAY_MS", "1000")?;

    Ok(AppConfig {
        log_level,
        crawl_delay_secs,
        crawl_jitter_secs,
        headless,
        concurrency,
        user_agent,
        max_pages,
        max_records_per_category,
        robots_timeout_secs,
        navigation_timeout_secs,
        settle_delay_ms,
    })
}

/// Accepts the usual spellings of a boolean flag.
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
