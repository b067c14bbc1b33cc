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
fn empty_environment_yields_defaults() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_scrape_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.rate_limit_secs, 2);
    assert_eq!(cfg.max_pages, 10);
    assert_eq!(cfg.max_empty_pages, 3);
    assert_eq!(cfg.cache_ttl_secs, 24 * 60 * 60);
    assert!(cfg.user_agent_rotation);
    assert!(!cfg.proxy_enabled);
    assert!(cfg.proxy_pool.is_empty());
    assert!(cfg.proxy_source_urls.is_empty());
    assert_eq!(cfg.proxy_refresh_secs, 10 * 60);
}

#[test]
fn numeric_overrides_are_applied() {
    let mut map = HashMap::new();
    map.insert("DIRSCOUT_MAX_PAGES", "25");
    map.insert("DIRSCOUT_RATE_LIMIT_SECS", "0");
    let cfg = build_scrape_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_pages, 25);
    assert_eq!(cfg.rate_limit_secs, 0);
}

#[test]
fn invalid_numeric_value_fails() {
    let mut map = HashMap::new();
    map.insert("DIRSCOUT_MAX_RETRIES", "lots");
    let result = build_scrape_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DIRSCOUT_MAX_RETRIES"),
        "expected InvalidEnvVar(DIRSCOUT_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn boolean_accepts_common_spellings() {
    for (raw, expected) in [("1", true), ("true", true), ("no", false), ("0", false)] {
        let mut map = HashMap::new();
        map.insert("DIRSCOUT_PROXY_ENABLED", raw);
        let cfg = build_scrape_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.proxy_enabled, expected, "raw value: {raw}");
    }
}

#[test]
fn invalid_boolean_fails() {
    let mut map = HashMap::new();
    map.insert("DIRSCOUT_USER_AGENT_ROTATION", "maybe");
    let result = build_scrape_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DIRSCOUT_USER_AGENT_ROTATION"
    ));
}

#[test]
fn proxy_pool_splits_on_commas_and_trims() {
    let mut map = HashMap::new();
    map.insert(
        "DIRSCOUT_PROXY_POOL",
        "http://10.0.0.1:8080, http://10.0.0.2:8080 ,,",
    );
    let cfg = build_scrape_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.proxy_pool,
        vec![
            "http://10.0.0.1:8080".to_owned(),
            "http://10.0.0.2:8080".to_owned()
        ]
    );
}

#[test]
fn proxy_sources_split_like_the_pool() {
    let mut map = HashMap::new();
    map.insert(
        "DIRSCOUT_PROXY_SOURCES",
        "https://proxies.example.com/gb.txt , https://mirror.example.net/list",
    );
    map.insert("DIRSCOUT_PROXY_REFRESH_SECS", "120");
    let cfg = build_scrape_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.proxy_source_urls,
        vec![
            "https://proxies.example.com/gb.txt".to_owned(),
            "https://mirror.example.net/list".to_owned()
        ]
    );
    assert_eq!(cfg.proxy_refresh_secs, 120);
}
