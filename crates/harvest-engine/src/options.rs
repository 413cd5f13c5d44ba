//! Engine tuning knobs, lifted from the configuration.

use std::time::Duration;

use harvest_config::{Config, RetryConfig, TimingConfig};

/// Element tags tried, loosest last, when looking for the seller link.
pub const LINK_TAGS_STRICT: [&str; 2] = ["a", "button"];
pub const LINK_TAGS_LOOSE: &str = "a,button,span,div";

/// Timing, retry budgets and the site conventions the engine itself needs.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub timing: TimingConfig,
    pub retry: RetryConfig,
    /// Facet ids containing this marker are the out-of-stock toggle.
    pub out_of_stock_marker: String,
    /// Seller link texts, most specific first.
    pub seller_link_texts: Vec<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl EngineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timing: config.timing.clone(),
            retry: config.retry.clone(),
            out_of_stock_marker: config.selectors.out_of_stock_marker.clone(),
            seller_link_texts: config.selectors.seller_link_texts.clone(),
        }
    }

    /// Milliseconds to [`Duration`].
    pub fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    pub fn poll_interval(&self) -> Duration {
        Self::ms(self.timing.poll_interval)
    }

    /// `(text, tags)` pairs in the order they are tried.
    ///
    /// The first text is tried on links, then buttons, then any element;
    /// the remaining texts only on any element.
    pub fn link_strategies(&self) -> Vec<(&str, &str)> {
        let mut texts = self
            .seller_link_texts
            .iter()
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty());

        let mut strategies = Vec::new();
        if let Some(primary) = texts.next() {
            for tags in LINK_TAGS_STRICT {
                strategies.push((primary, tags));
            }
            strategies.push((primary, LINK_TAGS_LOOSE));
        }
        for text in texts {
            strategies.push((text, LINK_TAGS_LOOSE));
        }
        strategies
    }
}
