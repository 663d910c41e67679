//! Configuration validation.

use std::collections::HashSet;

use autoquality_core::normalize_label;

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_browser(config, &mut result);
        Self::validate_preferences(config, &mut result);
        Self::validate_retry_schedule(config, &mut result);
        Self::validate_locator(config, &mut result);

        result
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        let browser = &config.browser;
        if browser.endpoint.trim().is_empty() {
            result.add_error(ValidationError::new("browser.endpoint", "Endpoint cannot be empty"));
        } else if !browser.endpoint.starts_with("http://") && !browser.endpoint.starts_with("https://")
        {
            result.add_error(ValidationError::new(
                "browser.endpoint",
                "Endpoint must be an http:// or https:// URL",
            ));
        }

        if browser.match_urls.is_empty() {
            result.add_warning(ValidationWarning::new(
                "browser.match_urls",
                "No URL prefixes configured, no page will be watched",
            ));
        }

        if browser.discovery_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "browser.discovery_interval_secs",
                "discovery_interval_secs must be greater than 0",
            ));
        }
    }

    fn validate_preferences(config: &Config, result: &mut ValidationResult) {
        let prefs = &config.selection.preferences;
        if prefs.is_empty() {
            result.add_error(ValidationError::new(
                "selection.preferences",
                "At least one preferred quality is required",
            ));
            return;
        }

        let mut seen = HashSet::new();
        for (i, pattern) in prefs.iter().enumerate() {
            let normalized = normalize_label(pattern);
            let path = format!("selection.preferences[{}]", i);
            if normalized.is_empty() {
                result.add_error(ValidationError::new(
                    path,
                    "Empty pattern would match every label",
                ));
            } else if !seen.insert(normalized.clone()) {
                result.add_warning(ValidationWarning::new(
                    path,
                    format!("Duplicate pattern '{}' is never reached", normalized),
                ));
            }
        }

        let last = prefs.last().map(|p| normalize_label(p));
        if last.as_deref() != Some("Auto") {
            result.add_warning(ValidationWarning::new(
                "selection.preferences",
                "Last preference is not 'Auto'; an Auto-only menu will be left untouched",
            ));
        }
    }

    fn validate_retry_schedule(config: &Config, result: &mut ValidationResult) {
        let delays = &config.selection.retry_delays_ms;
        if delays.is_empty() {
            result.add_error(ValidationError::new(
                "selection.retry_delays_ms",
                "Retry schedule cannot be empty",
            ));
            return;
        }

        if delays.windows(2).any(|w| w[1] < w[0]) {
            result.add_warning(ValidationWarning::new(
                "selection.retry_delays_ms",
                "Retry delays are expected to escalate",
            ));
        }

        let total: u64 = delays.iter().sum();
        if total > 10_000 {
            result.add_warning(ValidationWarning::new(
                "selection.retry_delays_ms",
                format!("Retry budget of {}ms is unusually long", total),
            ));
        }
    }

    fn validate_locator(config: &Config, result: &mut ValidationResult) {
        for (path, value) in config.locator.fields() {
            if value.trim().is_empty() {
                result.add_error(ValidationError::new(path, "Selector cannot be empty"));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
