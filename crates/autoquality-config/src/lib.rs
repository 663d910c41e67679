//! # autoquality config
//!
//! TOML configuration for the autoquality binary: browser endpoint and page
//! matching, preference table, retry schedule, menu locators and logging.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
