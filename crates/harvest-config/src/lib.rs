//! # Harvest Config
//!
//! Configuration management for seller-harvest: browser connection, the
//! site-specific selectors the UI probe uses, timing and retry budgets of the
//! engine, resume-store location and logging.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, Finding, ValidationResult};
