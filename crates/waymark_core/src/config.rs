//! Endpoint configuration for the remote sync and auth services.
//!
//! # Responsibility
//! - Build and validate the sync/auth endpoint descriptors from the
//!   process environment (or any lookup function).
//! - Substitute `__NAME__` placeholder tokens in generated environment
//!   templates.
//!
//! # Invariants
//! - Construction fails fast: a missing or malformed value is an error
//!   before any dependent component is built.
//! - Stored URLs never carry a trailing slash.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Remote sync endpoint, e.g. `wss://sync.example.com`.
pub const ENV_SYNC_URL: &str = "WAYMARK_SYNC_URL";
/// Auth provider endpoint, `https://` only.
pub const ENV_AUTH_URL: &str = "WAYMARK_AUTH_URL";
/// Publishable auth API key.
pub const ENV_AUTH_KEY: &str = "WAYMARK_AUTH_KEY";

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"__([A-Z][A-Z0-9_]*)__").expect("placeholder pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingValue {
        name: &'static str,
    },
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingValue { name } => write!(f, "missing configuration value `{name}`"),
            Self::InvalidUrl {
                name,
                value,
                reason,
            } => write!(f, "invalid url in `{name}` (`{value}`): {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Validated endpoint descriptors for remote sync and authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub sync_server_url: String,
    pub auth_server_url: String,
    pub auth_api_key: String,
}

impl SyncConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let sync_server_url = require(&lookup, ENV_SYNC_URL)?;
        let auth_server_url = require(&lookup, ENV_AUTH_URL)?;
        let auth_api_key = require(&lookup, ENV_AUTH_KEY)?;

        if !sync_server_url.contains("://") {
            return Err(ConfigError::InvalidUrl {
                name: ENV_SYNC_URL,
                value: sync_server_url,
                reason: "expected a scheme such as wss:// or https://",
            });
        }
        if !auth_server_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl {
                name: ENV_AUTH_URL,
                value: auth_server_url,
                reason: "auth endpoint must use https://",
            });
        }

        Ok(Self {
            sync_server_url: trim_trailing_slash(&sync_server_url),
            auth_server_url: trim_trailing_slash(&auth_server_url),
            auth_api_key,
        })
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingValue { name }),
    }
}

fn trim_trailing_slash(value: &str) -> String {
    value.trim_end_matches('/').to_string()
}

/// Replaces every `__NAME__` token in `template` with the looked-up
/// value for `NAME`.
///
/// Missing values substitute as empty strings, with a warning, matching
/// the behavior of the environment descriptor generator.
pub fn substitute_placeholders(
    template: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |captures: &regex::Captures<'_>| {
            let name = &captures[1];
            match lookup(name) {
                Some(value) => value,
                None => {
                    warn!("event=config_template module=config status=missing placeholder={name}");
                    String::new()
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::{substitute_placeholders, ConfigError, SyncConfig};
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn builds_and_normalizes_valid_config() {
        let config = SyncConfig::from_lookup(lookup_from(&[
            ("WAYMARK_SYNC_URL", "wss://sync.example.com/"),
            ("WAYMARK_AUTH_URL", "https://auth.example.com/"),
            ("WAYMARK_AUTH_KEY", "public-key"),
        ]))
        .expect("config should build");

        assert_eq!(config.sync_server_url, "wss://sync.example.com");
        assert_eq!(config.auth_server_url, "https://auth.example.com");
        assert_eq!(config.auth_api_key, "public-key");
    }

    #[test]
    fn missing_or_blank_values_fail() {
        let err = SyncConfig::from_lookup(lookup_from(&[
            ("WAYMARK_SYNC_URL", "wss://sync.example.com"),
            ("WAYMARK_AUTH_URL", "https://auth.example.com"),
            ("WAYMARK_AUTH_KEY", "   "),
        ]))
        .expect_err("blank key must fail");
        assert_eq!(
            err,
            ConfigError::MissingValue {
                name: "WAYMARK_AUTH_KEY"
            }
        );
    }

    #[test]
    fn auth_url_must_be_https() {
        let err = SyncConfig::from_lookup(lookup_from(&[
            ("WAYMARK_SYNC_URL", "wss://sync.example.com"),
            ("WAYMARK_AUTH_URL", "http://auth.example.com"),
            ("WAYMARK_AUTH_KEY", "key"),
        ]))
        .expect_err("http auth endpoint must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidUrl {
                name: "WAYMARK_AUTH_URL",
                ..
            }
        ));
    }

    #[test]
    fn sync_url_requires_scheme() {
        let err = SyncConfig::from_lookup(lookup_from(&[
            ("WAYMARK_SYNC_URL", "sync.example.com"),
            ("WAYMARK_AUTH_URL", "https://auth.example.com"),
            ("WAYMARK_AUTH_KEY", "key"),
        ]))
        .expect_err("schemeless sync endpoint must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidUrl {
                name: "WAYMARK_SYNC_URL",
                ..
            }
        ));
    }

    #[test]
    fn substitutes_known_placeholders_and_blanks_unknown_ones() {
        let template = "url: __SYNC_URL__\nkey: __AUTH_KEY__\nplain: __not_a_token__";
        let rendered =
            substitute_placeholders(template, lookup_from(&[("SYNC_URL", "wss://s")]));
        assert_eq!(rendered, "url: wss://s\nkey: \nplain: __not_a_token__");
    }
}
