//! Layered override resolution.
//!
//! A value is looked up in up to four layers, always in this order:
//!
//! 1. `own`: the entity's own settings
//! 2. `main`: a sibling entity this one borrows from (e.g. a top-level notifier)
//! 3. `defaults`: user-supplied defaults
//! 4. `hard_defaults`: built-in defaults
//!
//! The first non-empty value wins. An absent layer counts as empty, and a key
//! found nowhere resolves to `""`.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use crate::duration::parse_duration;

#[cfg(test)]
#[path = "overrides_tests.rs"]
mod tests;

/// One override layer.
pub type StringMap = HashMap<String, String>;

/// Return the first non-empty `key` value scanning `layers` in order.
pub fn resolve(layers: &[Option<&StringMap>], key: &str) -> String {
    layers
        .iter()
        .flatten()
        .filter_map(|layer| layer.get(key))
        .find(|value| !value.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Return the first non-empty string, or `""`.
pub fn first_non_empty<'a>(values: &[&'a str]) -> &'a str {
    values.iter().copied().find(|v| !v.is_empty()).unwrap_or("")
}

/// Type of an entity: its own, else its main's, else its id.
pub fn effective_type(own_type: &str, main_type: &str, id: &str) -> String {
    first_non_empty(&[own_type, main_type, id]).to_string()
}

/// The four borrowed layers of one lookup, in their fixed order.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideChain<'a> {
    pub own: Option<&'a StringMap>,
    pub main: Option<&'a StringMap>,
    pub defaults: Option<&'a StringMap>,
    pub hard_defaults: Option<&'a StringMap>,
}

impl<'a> OverrideChain<'a> {
    /// Chain with only the entity's own layer.
    pub fn new(own: &'a StringMap) -> Self {
        Self {
            own: Some(own),
            ..Self::default()
        }
    }

    pub fn with_main(mut self, main: Option<&'a StringMap>) -> Self {
        self.main = main;
        self
    }

    pub fn with_defaults(mut self, defaults: Option<&'a StringMap>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_hard_defaults(mut self, hard_defaults: Option<&'a StringMap>) -> Self {
        self.hard_defaults = hard_defaults;
        self
    }

    /// Layers in resolution order.
    pub fn layers(&self) -> [Option<&'a StringMap>; 4] {
        [self.own, self.main, self.defaults, self.hard_defaults]
    }

    pub fn resolve(&self, key: &str) -> String {
        resolve(&self.layers(), key)
    }

    /// Every key present in any layer, sorted.
    pub fn keys(&self) -> BTreeSet<&'a str> {
        self.layers()
            .into_iter()
            .flatten()
            .flat_map(|layer| layer.keys().map(String::as_str))
            .collect()
    }

    /// Every key resolved to its effective non-empty value.
    pub fn resolve_all(&self) -> StringMap {
        self.keys()
            .into_iter()
            .filter_map(|key| {
                let value = self.resolve(key);
                (!value.is_empty()).then(|| (key.to_string(), value))
            })
            .collect()
    }

    /// Resolved `key` as a boolean. Unset or unparsable is `None`.
    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.resolve(key).to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }

    /// Resolved `key` as a duration. Unset or unparsable is `None`.
    pub fn duration(&self, key: &str) -> Option<Duration> {
        parse_duration(&self.resolve(key)).ok()
    }

    /// Wait before sending. Zero when unset or unparsable.
    pub fn delay(&self) -> Duration {
        self.duration("delay").unwrap_or(Duration::ZERO)
    }

    /// Send attempts allowed. `0` (also the fallback for unset or
    /// unparsable values) means a single attempt without retry.
    pub fn max_tries(&self) -> u32 {
        self.resolve("max_tries").parse().unwrap_or(0)
    }
}
