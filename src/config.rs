// src/config.rs

use std::{env, fmt, path::PathBuf};
use thiserror::Error;
use url::Url;

use crate::fetch::DEFAULT_SOURCE_URL;
use crate::publish::twitter::DEFAULT_TWEET_ENDPOINT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} is not set")]
    Missing { name: &'static str },

    #[error("{name} is not a valid URL ({value:?}): {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// OAuth 1.0a credentials for the posting account. Passed through to the
/// signer untouched.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_secret", &"<redacted>")
            .finish()
    }
}

/// Where the cursor lives.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    Redis { url: Url },
    File { dir: PathBuf },
}

/// Settings needed to read the series and the cursor. This is all a dry run needs.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub source_url: Url,
    pub store: StoreConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceConfig,
    pub credentials: Credentials,
    pub tweet_endpoint: Url,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any name → value lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing { name })
        };

        let credentials = Credentials {
            api_key: required("API_KEY")?,
            api_secret: required("API_SECRET")?,
            access_token: required("ACCESS_TOKEN")?,
            access_secret: required("ACCESS_SECRET")?,
        };

        let tweet_endpoint = url_or_default(&lookup, "TWEET_ENDPOINT", DEFAULT_TWEET_ENDPOINT)?;

        Ok(Self {
            source: SourceConfig::from_lookup(lookup)?,
            credentials,
            tweet_endpoint,
        })
    }
}

impl SourceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source_url = url_or_default(&lookup, "SOURCE_URL", DEFAULT_SOURCE_URL)?;

        let store = match lookup("REDIS_URL").filter(|v| !v.is_empty()) {
            Some(address) => StoreConfig::Redis {
                url: redis_url(&address, lookup("REDIS_PASSWORD").as_deref())?,
            },
            None => match lookup("CURSOR_DIR").filter(|v| !v.is_empty()) {
                Some(dir) => StoreConfig::File { dir: dir.into() },
                None => return Err(ConfigError::Missing { name: "REDIS_URL" }),
            },
        };

        Ok(Self { source_url, store })
    }
}

fn url_or_default<F>(lookup: &F, name: &'static str, default: &str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string());
    Url::parse(&value).map_err(|e| ConfigError::InvalidUrl {
        name,
        reason: e.to_string(),
        value,
    })
}

/// Accept either a bare `host:port` or a full `redis://` URL, and fold the
/// password into it.
fn redis_url(address: &str, password: Option<&str>) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        name: "REDIS_URL",
        value: address.to_string(),
        reason,
    };

    let raw = if address.contains("://") {
        address.to_string()
    } else {
        format!("redis://{address}")
    };
    let mut url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;

    if let Some(password) = password.filter(|p| !p.is_empty()) {
        url.set_password(Some(password))
            .map_err(|_| invalid("cannot carry a password".to_string()))?;
    }
    Ok(url)
}
