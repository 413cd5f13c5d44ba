//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// One problem found in a config, addressed by its dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors block a run; warnings are logged and ignored.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(Finding {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Finding {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Static checks run before a harvest starts.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_timing(config, &mut result);
        Self::validate_retry(config, &mut result);
        Self::validate_selectors(config, &mut result);

        Ok(result)
    }

    /// Validate and turn the first error into a `ConfigError`.
    pub fn ensure_valid(config: &Config) -> Result<ValidationResult, ConfigError> {
        let result = Self::validate(config)?;
        if let Some(first) = result.errors.first() {
            return Err(ConfigError::InvalidValue {
                field: first.path.clone(),
                message: first.message.clone(),
            });
        }
        Ok(result)
    }

    fn validate_timing(config: &Config, result: &mut ValidationResult) {
        let timing = &config.timing;

        if timing.poll_interval == 0 {
            result.error("timing.poll_interval", "poll_interval must be greater than 0");
        } else if timing.poll_interval > 2_000 {
            result.warn(
                "timing.poll_interval",
                "poll_interval is above 2000ms, visibility checks will react slowly",
            );
        }

        let waits = [
            ("timing.modal_timeout", timing.modal_timeout),
            ("timing.panel_timeout", timing.panel_timeout),
            ("timing.listing_timeout", timing.listing_timeout),
            ("timing.recheck_listing_timeout", timing.recheck_listing_timeout),
            ("timing.tab_ready_timeout", timing.tab_ready_timeout),
            ("timing.contact_tab_timeout", timing.contact_tab_timeout),
        ];
        for (path, timeout) in waits {
            if timeout < timing.poll_interval {
                result.warn(
                    path,
                    format!("{}ms is shorter than poll_interval, only one sample is taken", timeout),
                );
            }
        }
    }

    fn validate_retry(config: &Config, result: &mut ValidationResult) {
        let retry = &config.retry;

        let required = [
            ("retry.panel_max_retries", retry.panel_max_retries),
            ("retry.seller_link_attempts", retry.seller_link_attempts),
            ("retry.contact_rounds", retry.contact_rounds),
        ];
        for (path, value) in required {
            if value == 0 {
                result.error(path, "must be greater than 0");
            }
        }

        if retry.extraction_reopens > 3 {
            result.warn(
                "retry.extraction_reopens",
                format!(
                    "extraction_reopens is {}, each reopen costs a full product-page load",
                    retry.extraction_reopens
                ),
            );
        }
    }

    fn validate_selectors(config: &Config, result: &mut ValidationResult) {
        let selectors = &config.selectors;

        for (name, value) in selectors.entries() {
            if value.trim().is_empty() {
                result.error(format!("selectors.{}", name), "Selector cannot be empty");
            }
        }

        if selectors.seller_link_texts.is_empty()
            || selectors.seller_link_texts.iter().all(|t| t.trim().is_empty())
        {
            result.error(
                "selectors.seller_link_texts",
                "At least one seller link text is required",
            );
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
