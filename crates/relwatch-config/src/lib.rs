//! # relwatch Config
//!
//! Configuration management for relwatch.
//!
//! Every configurable entity (service options, version lookups, notifiers,
//! webhooks) resolves its effective settings through an [`OverrideChain`]:
//! its own values first, then the `main` entity it borrows from, then the
//! user defaults and finally the built-in hard defaults.

mod duration;
mod error;
mod hard_defaults;
mod loader;
mod overrides;
mod schema;
mod validator;

pub use duration::{parse_duration, DurationParseError};
pub use error::ConfigError;
pub use hard_defaults::{hard_defaults, KNOWN_NOTIFY_TYPES};
pub use loader::ConfigLoader;
pub use overrides::{effective_type, first_non_empty, resolve, OverrideChain, StringMap};
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
