//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use autoquality_core::{
    CssLocator, DEFAULT_PREFERENCES, DEFAULT_RETRY_DELAYS_MS, PreferenceList, RetrySchedule,
};
use serde::{Deserialize, Serialize};

use crate::loader::ConfigLoader;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub locator: LocatorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Browser connection and page matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Pages whose URL starts with one of these prefixes are watched.
    #[serde(default = "default_match_urls")]
    pub match_urls: Vec<String>,

    #[serde(default = "default_discovery_interval")]
    pub discovery_interval_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            match_urls: default_match_urls(),
            discovery_interval_secs: default_discovery_interval(),
        }
    }
}

impl BrowserConfig {
    pub fn discovery_interval(&self) -> Duration {
        Duration::from_secs(self.discovery_interval_secs)
    }

    /// Whether a page URL is one we should watch.
    pub fn matches_url(&self, url: &str) -> bool {
        self.match_urls.iter().any(|prefix| url.starts_with(prefix.as_str()))
    }
}

fn default_endpoint() -> String {
    "http://localhost:9222".to_string()
}

fn default_match_urls() -> Vec<String> {
    vec!["https://w.tv/".to_string()]
}

fn default_discovery_interval() -> u64 {
    5
}

/// Preference table and retry timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Label patterns, most preferred first.
    #[serde(default = "default_preferences")]
    pub preferences: Vec<String>,

    /// Waits after opening the menu trigger, in milliseconds.
    #[serde(default = "default_retry_delays")]
    pub retry_delays_ms: Vec<u64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            preferences: default_preferences(),
            retry_delays_ms: default_retry_delays(),
        }
    }
}

impl SelectionConfig {
    pub fn preference_list(&self) -> PreferenceList {
        PreferenceList::new(&self.preferences)
    }

    pub fn retry_schedule(&self) -> RetrySchedule {
        RetrySchedule::from_millis(&self.retry_delays_ms)
    }
}

fn default_preferences() -> Vec<String> {
    DEFAULT_PREFERENCES.iter().map(|s| s.to_string()).collect()
}

fn default_retry_delays() -> Vec<u64> {
    DEFAULT_RETRY_DELAYS_MS.to_vec()
}

/// Structural signatures of the player markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub container: String,
    pub item: String,
    pub trigger: String,
    pub dialog: String,
    pub dialog_label_attribute: String,
    pub expanded_attribute: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        let css = CssLocator::default();
        Self {
            container: css.container,
            item: css.item,
            trigger: css.trigger,
            dialog: css.dialog,
            dialog_label_attribute: css.dialog_label_attribute,
            expanded_attribute: css.expanded_attribute,
        }
    }
}

impl LocatorConfig {
    pub fn to_locator(&self) -> CssLocator {
        CssLocator {
            container: self.container.clone(),
            item: self.item.clone(),
            trigger: self.trigger.clone(),
            dialog: self.dialog.clone(),
            dialog_label_attribute: self.dialog_label_attribute.clone(),
            expanded_attribute: self.expanded_attribute.clone(),
        }
    }

    /// `(field, selector)` pairs, for validation.
    pub(crate) fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("locator.container", &self.container),
            ("locator.item", &self.item),
            ("locator.trigger", &self.trigger),
            ("locator.dialog", &self.dialog),
            ("locator.dialog_label_attribute", &self.dialog_label_attribute),
            ("locator.expanded_attribute", &self.expanded_attribute),
        ]
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Also write daily-rotated log files.
    #[serde(default = "default_true")]
    pub file: bool,

    #[serde(default = "default_log_dir")]
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: true,
            directory: default_log_dir(),
        }
    }
}

impl LoggingConfig {
    /// Log directory with `~` expanded.
    pub fn directory_path(&self) -> PathBuf {
        PathBuf::from(ConfigLoader::expand_path(&self.directory))
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.autoquality/logs".to_string()
}

pub(crate) fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.browser.endpoint, "http://localhost:9222");
        assert_eq!(config.selection.preferences.len(), DEFAULT_PREFERENCES.len());
        assert_eq!(config.selection.retry_delays_ms, vec![0, 30, 80, 150, 300, 600]);
        assert_eq!(config.locator.to_locator(), CssLocator::default());
        assert!(config.logging.file);
    }

    #[test]
    fn test_matches_url() {
        let browser = BrowserConfig::default();
        assert!(browser.matches_url("https://w.tv/some-channel"));
        assert!(!browser.matches_url("https://example.com/"));
    }

    #[test]
    fn test_selection_conversions() {
        let selection = SelectionConfig {
            preferences: vec!["1080p".to_string(), "Auto".to_string()],
            retry_delays_ms: vec![10, 20],
        };
        assert_eq!(selection.preference_list().len(), 2);
        assert_eq!(selection.retry_schedule().budget(), Duration::from_millis(30));
    }

    #[test]
    fn test_serialize_roundtrip_keeps_sections() {
        let text = toml::to_string(&Config::default()).unwrap();
        assert!(text.contains("[browser]"));
        assert!(text.contains("[selection]"));
        assert!(text.contains("[locator]"));
    }
}
