//! Configuration management for Crosscast
//!
//! Credentials come from environment variables. Each platform's bundle is
//! either complete or absent: a platform with any required variable missing
//! or blank is simply left unconfigured.

use std::path::Path;

use secrecy::SecretString;

use crate::error::{ConfigError, Result};
use crate::platforms::PlatformId;

/// Default Bluesky PDS endpoint
pub const DEFAULT_BLUESKY_SERVICE: &str = "https://bsky.social";

/// Relay every Nostr note is published to
pub const DEFAULT_NOSTR_RELAY: &str = "wss://relay.nostr.band/";

#[derive(Debug, Default)]
pub struct Config {
    pub twitter: Option<TwitterConfig>,
    pub mastodon: Option<MastodonConfig>,
    pub bluesky: Option<BlueskyConfig>,
    pub nostr: Option<NostrConfig>,
}

#[derive(Debug)]
pub struct TwitterConfig {
    pub api_key: String,
    pub api_secret: SecretString,
    pub access_token: String,
    pub access_secret: SecretString,
}

#[derive(Debug)]
pub struct MastodonConfig {
    pub instance: String,
    pub access_token: SecretString,
}

impl MastodonConfig {
    pub fn new(instance: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            access_token: SecretString::from(access_token.into()),
        }
    }
}

#[derive(Debug)]
pub struct BlueskyConfig {
    /// Email address or handle used to log in
    pub identifier: String,
    pub password: SecretString,
    pub service: String,
}

#[derive(Debug)]
pub struct NostrConfig {
    /// Secret key, nsec bech32 or 64-character hex
    pub private_key: SecretString,
    pub relay: String,
}

impl NostrConfig {
    pub fn new(private_key: impl Into<String>) -> Self {
        Self {
            private_key: SecretString::from(private_key.into()),
            relay: DEFAULT_NOSTR_RELAY.to_string(),
        }
    }
}

impl Config {
    /// Build configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use libcrosscast::config::Config;
    /// use libcrosscast::platforms::PlatformId;
    ///
    /// let vars = HashMap::from([("NOSTR_PRIVATE_KEY", "nsec1...")]);
    /// let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
    ///
    /// assert!(config.is_configured(PlatformId::Nostr));
    /// assert!(!config.is_configured(PlatformId::Twitter));
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let twitter = match (
            var("TWITTER_API_KEY"),
            var("TWITTER_API_SECRET"),
            var("TWITTER_ACCESS_TOKEN"),
            var("TWITTER_ACCESS_SECRET"),
        ) {
            (Some(api_key), Some(api_secret), Some(access_token), Some(access_secret)) => {
                Some(TwitterConfig {
                    api_key,
                    api_secret: SecretString::from(api_secret),
                    access_token,
                    access_secret: SecretString::from(access_secret),
                })
            }
            _ => None,
        };

        let mastodon = match (var("MASTODON_INSTANCE"), var("MASTODON_ACCESS_TOKEN")) {
            (Some(instance), Some(token)) => Some(MastodonConfig::new(instance, token)),
            _ => None,
        };

        let bluesky = match (var("BLUESKY_EMAIL"), var("BLUESKY_PASSWORD")) {
            (Some(identifier), Some(password)) => Some(BlueskyConfig {
                identifier,
                password: SecretString::from(password),
                service: var("BLUESKY_SERVICE")
                    .unwrap_or_else(|| DEFAULT_BLUESKY_SERVICE.to_string()),
            }),
            _ => None,
        };

        let nostr = var("NOSTR_PRIVATE_KEY").map(NostrConfig::new);

        let config = Self {
            twitter,
            mastodon,
            bluesky,
            nostr,
        };

        for id in PlatformId::ALL {
            if !config.is_configured(id) {
                tracing::debug!("{} credentials incomplete, platform disabled", id);
            }
        }

        config
    }

    /// Whether a complete credential bundle is present for `id`
    ///
    /// Threads takes no credentials and is always configured.
    pub fn is_configured(&self, id: PlatformId) -> bool {
        match id {
            PlatformId::Twitter => self.twitter.is_some(),
            PlatformId::Mastodon => self.mastodon.is_some(),
            PlatformId::Threads => true,
            PlatformId::Bluesky => self.bluesky.is_some(),
            PlatformId::Nostr => self.nostr.is_some(),
        }
    }
}

/// Load variables from a `.env` file into the process environment
///
/// With `path` set, the file must exist and parse. Without it, `./.env` (or
/// the nearest one in a parent directory) is loaded when present. Values
/// from the file replace variables already set in the process environment.
pub fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path_override(path).map_err(ConfigError::EnvFile)?;
            tracing::debug!("Loaded environment from {}", path.display());
        }
        None => match dotenvy::dotenv_override() {
            Ok(found) => tracing::debug!("Loaded environment from {}", found.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::EnvFile(e).into()),
        },
    }
    Ok(())
}
