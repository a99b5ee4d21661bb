//! # Configuration collaborator contract.
//!
//! The runtime consumes configuration through the narrow [`Config`] trait:
//! section/option lookup with typed accessors, default-value variants, and a
//! single [`Config::reload`] operation that re-reads and merges sources in
//! place. How sources are read and merged is the collaborator's business.
//!
//! [`MemoryConfig`] is a plain in-memory implementation, useful as a default
//! and in tests. It keeps its sections behind a lock so a shared handle can
//! be updated while services read from it.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::ServiceError;

/// Read access to the application's configuration, plus one reload op.
///
/// The `*_or` variants return `dflt` when the named option has no value or
/// does not parse; use [`Config::has_option`] to tell the two apart.
pub trait Config: Send + Sync {
    /// Returns `true` if the named option exists.
    fn has_option(&self, section: &str, option: &str) -> bool;

    /// Returns the raw string value of an option.
    fn get_str(&self, section: &str, option: &str) -> Option<String>;

    /// Returns an option parsed as a signed integer.
    fn get_int(&self, section: &str, option: &str) -> Option<i64>;

    /// Returns an option parsed as a float.
    fn get_float(&self, section: &str, option: &str) -> Option<f64>;

    /// Returns an option parsed as a boolean.
    ///
    /// Accepted truthy spellings: `true`, `yes`, `on`, `1`; falsy: `false`,
    /// `no`, `off`, `0`. Case-insensitive.
    fn get_bool(&self, section: &str, option: &str) -> Option<bool>;

    /// String accessor with a default.
    fn str_or(&self, section: &str, option: &str, dflt: &str) -> String {
        self.get_str(section, option)
            .unwrap_or_else(|| dflt.to_string())
    }

    /// Integer accessor with a default.
    fn int_or(&self, section: &str, option: &str, dflt: i64) -> i64 {
        self.get_int(section, option).unwrap_or(dflt)
    }

    /// Float accessor with a default.
    fn float_or(&self, section: &str, option: &str, dflt: f64) -> f64 {
        self.get_float(section, option).unwrap_or(dflt)
    }

    /// Boolean accessor with a default.
    fn bool_or(&self, section: &str, option: &str, dflt: bool) -> bool {
        self.get_bool(section, option).unwrap_or(dflt)
    }

    /// Re-reads and merges configuration sources in place.
    ///
    /// Called by the runtime's reload phase before any service is asked to
    /// reload; an error here aborts the whole reload.
    fn reload(&self) -> Result<(), ServiceError>;
}

/// In-memory section/option map.
///
/// A minimal [`Config`] implementation for tests, demos, and programs whose
/// configuration lives in code. [`MemoryConfig::reload`] is a no-op since
/// there is no backing source to re-read.
///
/// # Example
/// ```
/// use servitor::{Config, MemoryConfig};
///
/// let cfg = MemoryConfig::new();
/// cfg.set("http", "listen", "127.0.0.1:8080");
/// cfg.set("http", "readtimeout", "10");
///
/// assert_eq!(cfg.str_or("http", "listen", ""), "127.0.0.1:8080");
/// assert_eq!(cfg.int_or("http", "readtimeout", 30), 10);
/// assert_eq!(cfg.int_or("http", "writetimeout", 30), 30);
/// ```
#[derive(Debug, Default)]
pub struct MemoryConfig {
    sections: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl MemoryConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option, creating the section as needed. Existing values are
    /// overwritten.
    pub fn set(&self, section: &str, option: &str, value: &str) {
        self.sections
            .write()
            .unwrap()
            .entry(section.to_string())
            .or_default()
            .insert(option.to_string(), value.to_string());
    }

    /// Applies a batch of `(section, option, value)` updates.
    pub fn update<I, S>(&self, updates: I)
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: AsRef<str>,
    {
        for (section, option, value) in updates {
            self.set(section.as_ref(), option.as_ref(), value.as_ref());
        }
    }
}

impl Config for MemoryConfig {
    fn has_option(&self, section: &str, option: &str) -> bool {
        self.sections
            .read()
            .unwrap()
            .get(section)
            .is_some_and(|options| options.contains_key(option))
    }

    fn get_str(&self, section: &str, option: &str) -> Option<String> {
        self.sections
            .read()
            .unwrap()
            .get(section)
            .and_then(|options| options.get(option))
            .cloned()
    }

    fn get_int(&self, section: &str, option: &str) -> Option<i64> {
        self.get_str(section, option)
            .and_then(|value| value.trim().parse().ok())
    }

    fn get_float(&self, section: &str, option: &str) -> Option<f64> {
        self.get_str(section, option)
            .and_then(|value| value.trim().parse().ok())
    }

    fn get_bool(&self, section: &str, option: &str) -> Option<bool> {
        match self.get_str(section, option)?.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    fn reload(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_option_falls_back_to_default() {
        let cfg = MemoryConfig::new();
        assert!(!cfg.has_option("http", "listen"));
        assert_eq!(cfg.str_or("http", "listen", "0.0.0.0:80"), "0.0.0.0:80");
        assert_eq!(cfg.int_or("http", "readtimeout", 10), 10);
        assert!(cfg.bool_or("log", "verbose", true));
    }

    #[test]
    fn test_typed_accessors_parse_values() {
        let cfg = MemoryConfig::new();
        cfg.set("https", "listen", "127.0.0.1:8443");
        cfg.set("https", "readtimeout", " 15 ");
        cfg.set("https", "ratio", "0.5");
        cfg.set("https", "enabled", "Yes");

        assert_eq!(cfg.get_str("https", "listen").unwrap(), "127.0.0.1:8443");
        assert_eq!(cfg.get_int("https", "readtimeout"), Some(15));
        assert_eq!(cfg.get_float("https", "ratio"), Some(0.5));
        assert_eq!(cfg.get_bool("https", "enabled"), Some(true));
    }

    #[test]
    fn test_unparsable_value_reads_as_none() {
        let cfg = MemoryConfig::new();
        cfg.set("http", "readtimeout", "soon");
        assert!(cfg.has_option("http", "readtimeout"));
        assert_eq!(cfg.get_int("http", "readtimeout"), None);
        assert_eq!(cfg.get_bool("http", "readtimeout"), None);
    }

    #[test]
    fn test_update_overwrites_existing_values() {
        let cfg = MemoryConfig::new();
        cfg.set("app", "mode", "debug");
        cfg.update([("app", "mode", "release"), ("app", "workers", "4")]);

        assert_eq!(cfg.str_or("app", "mode", ""), "release");
        assert_eq!(cfg.int_or("app", "workers", 0), 4);
    }
}
