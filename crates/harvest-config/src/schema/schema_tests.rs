use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.browser.debug_port, 9222);
    assert!(config.browser.launch);
    assert!(!config.browser.headless);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_store_config_default() {
    let store = StoreConfig::default();
    assert!(store.path.ends_with(".seller-harvest/store.json"));
}

#[test]
fn test_selector_config_default() {
    let selectors = SelectorConfig::default();
    assert_eq!(selectors.filters_menu, r#"[data-test="filters-menu"]"#);
    assert_eq!(selectors.facet_id_prefix, "facet-checkbox-");
    assert_eq!(selectors.out_of_stock_marker, "out_of_stock");
    assert_eq!(selectors.seller_link_texts.len(), 2);
    assert_eq!(selectors.seller_link_texts[0], "Sold & shipped by");
}

#[test]
fn test_selector_entries_cover_fields() {
    let selectors = SelectorConfig::default();
    let entries = selectors.entries();
    assert!(entries.iter().any(|(name, _)| *name == "apply_button"));
    assert!(entries.iter().all(|(_, value)| !value.is_empty()));
}

#[test]
fn test_timing_config_default() {
    let timing = TimingConfig::default();
    assert_eq!(timing.poll_interval, 200);
    assert_eq!(timing.listing_timeout, 8_000);
    assert_eq!(timing.contact_retry_delay, 8_000);
}

#[test]
fn test_retry_config_default() {
    let retry = RetryConfig::default();
    assert_eq!(retry.panel_max_retries, 5);
    assert_eq!(retry.seller_link_attempts, 5);
    assert_eq!(retry.contact_rounds, 3);
    assert_eq!(retry.extraction_reopens, 1);
}

#[test]
fn test_partial_timing_table_keeps_defaults() {
    let timing: TimingConfig = toml::from_str("poll_interval = 50").unwrap();
    assert_eq!(timing.poll_interval, 50);
    assert_eq!(timing.modal_timeout, 5_000);
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("9222"));
    assert!(json.contains("facet-checkbox-"));
}
