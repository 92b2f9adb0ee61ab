//! Locale codes and the locale provider contract.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, LocaleConfig};
use crate::error::Result;

/// A language code such as `en` or `cs`.
///
/// Cheap to clone; compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale(Arc<str>);

impl Locale {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(Arc::from(code.as_ref().trim()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Locale {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}

impl From<&str> for Locale {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for Locale {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for Locale {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

/// Source of the active locale set.
///
/// Implementations must return a stable, non-empty ordered set whose
/// members include the default locale.
pub trait LocaleProvider: Send + Sync {
    fn active(&self) -> Vec<Locale>;

    fn default_locale(&self) -> Locale;

    fn is_active(&self, code: &str) -> bool {
        self.active().iter().any(|l| l == code)
    }

    /// Resolve an optional requested code to an active locale, falling back
    /// to the default one.
    fn resolve(&self, requested: Option<&str>) -> Locale {
        match requested {
            Some(code) if self.is_active(code) => Locale::new(code),
            _ => self.default_locale(),
        }
    }
}

/// Locale set taken from `[locale]` in `structure.toml`.
#[derive(Debug, Clone)]
pub struct ConfiguredLocales {
    active: Vec<Locale>,
    default: Locale,
}

impl ConfiguredLocales {
    /// Build from explicit codes. The default must be one of `active`.
    pub fn new<I, S>(active: I, default: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let active: Vec<Locale> = active.into_iter().map(Locale::new).collect();
        if active.is_empty() {
            return Err(ConfigError::Validation("active locale set is empty".into()).into());
        }
        let default = Locale::new(default);
        if !active.contains(&default) {
            return Err(
                ConfigError::Validation(format!("default locale `{default}` is not active")).into(),
            );
        }
        Ok(Self { active, default })
    }

    pub fn from_config(config: &LocaleConfig) -> Result<Self> {
        Self::new(&config.active, &config.default)
    }
}

impl LocaleProvider for ConfiguredLocales {
    fn active(&self) -> Vec<Locale> {
        self.active.clone()
    }

    fn default_locale(&self) -> Locale {
        self.default.clone()
    }

    fn is_active(&self, code: &str) -> bool {
        self.active.iter().any(|l| l == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_trims_and_compares() {
        let l = Locale::new(" en ");
        assert_eq!(l, "en");
        assert_eq!(l.to_string(), "en");
    }

    #[test]
    fn test_configured_locales_resolve() {
        let locales = ConfiguredLocales::new(["en", "cs"], "en").unwrap();
        assert_eq!(locales.resolve(Some("cs")), "cs");
        assert_eq!(locales.resolve(Some("de")), "en");
        assert_eq!(locales.resolve(None), "en");
    }

    #[test]
    fn test_empty_active_set_rejected() {
        let empty: [&str; 0] = [];
        assert!(ConfiguredLocales::new(empty, "en").is_err());
    }

    #[test]
    fn test_default_must_be_active() {
        assert!(ConfiguredLocales::new(["cs"], "en").is_err());
    }

    #[test]
    fn test_serialize_deserialize() {
        let json = serde_json::to_string(&Locale::new("cs")).unwrap();
        assert_eq!(json, r#""cs""#);
        let parsed: Locale = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, "cs");
    }
}
