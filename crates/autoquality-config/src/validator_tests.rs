use super::*;
use crate::loader::ConfigLoader;

#[test]
fn test_default_config_is_valid() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid(), "errors: {:?}", result.errors);
    assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
}

#[test]
fn test_empty_endpoint() {
    let mut config = Config::default();
    config.browser.endpoint = "  ".to_string();
    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "browser.endpoint"));
}

#[test]
fn test_websocket_endpoint_rejected() {
    let mut config = Config::default();
    config.browser.endpoint = "ws://localhost:9222".to_string();
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "browser.endpoint"));
}

#[test]
fn test_zero_discovery_interval() {
    let mut config = Config::default();
    config.browser.discovery_interval_secs = 0;
    let result = ConfigValidator::validate(&config);
    assert!(result
        .errors
        .iter()
        .any(|e| e.path == "browser.discovery_interval_secs"));
}

#[test]
fn test_no_match_urls_warns() {
    let mut config = Config::default();
    config.browser.match_urls.clear();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "browser.match_urls"));
}

#[test]
fn test_empty_preferences() {
    let config = ConfigLoader::load_str("[selection]\npreferences = []").unwrap();
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "selection.preferences"));
}

#[test]
fn test_blank_preference_entry() {
    let config =
        ConfigLoader::load_str("[selection]\npreferences = [\"1080p\", \" \", \"Auto\"]").unwrap();
    let result = ConfigValidator::validate(&config);
    assert!(result
        .errors
        .iter()
        .any(|e| e.path == "selection.preferences[1]"));
}

#[test]
fn test_duplicate_preference_warns() {
    let config =
        ConfigLoader::load_str("[selection]\npreferences = [\"720p\", \" 720p\", \"Auto\"]")
            .unwrap();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.path == "selection.preferences[1]"));
}

#[test]
fn test_missing_auto_fallback_warns() {
    let config = ConfigLoader::load_str("[selection]\npreferences = [\"1080p\", \"720p\"]").unwrap();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.path == "selection.preferences" && w.message.contains("Auto")));
}

#[test]
fn test_retry_schedule_checks() {
    let config = ConfigLoader::load_str("[selection]\nretry_delays_ms = []").unwrap();
    assert!(!ConfigValidator::validate(&config).is_valid());

    let config = ConfigLoader::load_str("[selection]\nretry_delays_ms = [100, 50]").unwrap();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.message.contains("escalate")));

    let config = ConfigLoader::load_str("[selection]\nretry_delays_ms = [5000, 6000]").unwrap();
    let result = ConfigValidator::validate(&config);
    assert!(result.warnings.iter().any(|w| w.message.contains("11000ms")));
}

#[test]
fn test_empty_selector() {
    let config = ConfigLoader::load_str("[locator]\ntrigger = \"\"").unwrap();
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "locator.trigger"));
}
