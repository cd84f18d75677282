use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_bool_accepts_common_spellings() {
    assert_eq!(parse_bool("true"), Some(true));
    assert_eq!(parse_bool("YES"), Some(true));
    assert_eq!(parse_bool(" 0 "), Some(false));
    assert_eq!(parse_bool("off"), Some(false));
    assert_eq!(parse_bool("maybe"), None);
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "info");
    assert!((cfg.crawl_delay_secs - 3.0).abs() < f64::EPSILON);
    assert!((cfg.crawl_jitter_secs - 0.9).abs() < 1e-9);
    assert!(cfg.headless);
    assert_eq!(cfg.concurrency, 1);
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(cfg.max_pages, 1000);
    assert_eq!(cfg.max_records_per_category, 5000);
    assert_eq!(cfg.robots_timeout_secs, 10);
    assert_eq!(cfg.navigation_timeout_secs, 60);
    assert_eq!(cfg.settle_delay_ms, 1000);
}

#[test]
fn jitter_follows_delay_when_unset() {
    let mut map = HashMap::new();
    map.insert("B2BSCOUT_CRAWL_DELAY_SECS", "10");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!((cfg.crawl_jitter_secs - 3.0).abs() < 1e-9);
}

#[test]
fn explicit_jitter_overrides_derived_value() {
    let mut map = HashMap::new();
    map.insert("B2BSCOUT_CRAWL_DELAY_SECS", "10");
    map.insert("B2BSCOUT_CRAWL_JITTER_SECS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.crawl_jitter_secs.abs() < f64::EPSILON);
}

#[test]
fn negative_delay_is_rejected() {
    let mut map = HashMap::new();
    map.insert("B2BSCOUT_CRAWL_DELAY_SECS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "B2BSCOUT_CRAWL_DELAY_SECS"),
        "expected InvalidEnvVar(B2BSCOUT_CRAWL_DELAY_SECS), got: {result:?}"
    );
}

#[test]
fn non_numeric_jitter_is_rejected() {
    let mut map = HashMap::new();
    map.insert("B2BSCOUT_CRAWL_JITTER_SECS", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "B2BSCOUT_CRAWL_JITTER_SECS"),
        "expected InvalidEnvVar(B2BSCOUT_CRAWL_JITTER_SECS), got: {result:?}"
    );
}

#[test]
fn invalid_headless_flag_is_rejected() {
    let mut map = HashMap::new();
    map.insert("B2BSCOUT_HEADLESS", "sometimes");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "B2BSCOUT_HEADLESS"),
        "expected InvalidEnvVar(B2BSCOUT_HEADLESS), got: {result:?}"
    );
}

#[test]
fn headless_can_be_disabled() {
    let mut map = HashMap::new();
    map.insert("B2BSCOUT_HEADLESS", "false");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(!cfg.headless);
}

#[test]
fn max_pages_is_clamped_to_hard_cap() {
    let mut map = HashMap::new();
    map.insert("B2BSCOUT_MAX_PAGES", "50000");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_pages, MAX_PAGES_HARD_CAP);
}

#[test]
fn zero_max_pages_is_rejected() {
    let mut map = HashMap::new();
    map.insert("B2BSCOUT_MAX_PAGES", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "B2BSCOUT_MAX_PAGES"),
        "expected InvalidEnvVar(B2BSCOUT_MAX_PAGES), got: {result:?}"
    );
}

#[test]
fn zero_concurrency_is_raised_to_one() {
    let mut map = HashMap::new();
    map.insert("B2BSCOUT_CONCURRENCY", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.concurrency, 1);
}

#[test]
fn settle_delay_override_and_invalid() {
    let mut map = HashMap::new();
    map.insert("B2BSCOUT_SETTLE_DELAY_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.settle_delay().as_millis(), 250);

    map.insert("B2BSCOUT_SETTLE_DELAY_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "B2BSCOUT_SETTLE_DELAY_MS"),
        "expected InvalidEnvVar(B2BSCOUT_SETTLE_DELAY_MS), got: {result:?}"
    );
}

#[test]
fn crawl_config_mirrors_app_config() {
    let mut map = HashMap::new();
    map.insert("B2BSCOUT_CRAWL_DELAY_SECS", "2");
    map.insert("B2BSCOUT_USER_AGENT", "b2bscout-test/1.0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let crawl = cfg.crawl_config();
    assert!((crawl.delay - 2.0).abs() < f64::EPSILON);
    assert!((crawl.jitter - 0.6).abs() < 1e-9);
    assert_eq!(crawl.user_agent, "b2bscout-test/1.0");
    assert!(crawl.headless);
}
