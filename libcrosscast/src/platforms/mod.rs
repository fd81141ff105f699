//! Platform abstraction and implementations
//!
//! Every supported destination implements the [`Platform`] trait. The set of
//! destinations is closed: [`PlatformId`] names all five, and each has exactly
//! one implementation in this module.
//!
//! # Examples
//!
//! ```no_run
//! use libcrosscast::config::MastodonConfig;
//! use libcrosscast::platforms::{mastodon::MastodonClient, Platform};
//!
//! # async fn example() -> libcrosscast::error::Result<()> {
//! let config = MastodonConfig::new("mastodon.social", "your-access-token");
//! let mut platform = MastodonClient::new(config)?;
//!
//! platform.activate().await?;
//! platform.publish("Hello, fediverse!").await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod bluesky;
pub mod mastodon;
pub mod nostr;
pub mod threads;
pub mod twitter;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Identifier of a supported destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    /// X / Twitter
    Twitter,
    /// Mastodon and other Mastodon-API instances
    Mastodon,
    /// Threads (publishing disabled)
    Threads,
    /// Bluesky / AT Protocol
    Bluesky,
    /// Nostr, published through a single relay
    Nostr,
}

impl PlatformId {
    /// All platforms, in output order
    pub const ALL: [PlatformId; 5] = [
        PlatformId::Twitter,
        PlatformId::Mastodon,
        PlatformId::Threads,
        PlatformId::Bluesky,
        PlatformId::Nostr,
    ];

    /// Lowercase identifier used in flags, logs and output
    pub fn name(&self) -> &'static str {
        match self {
            PlatformId::Twitter => "twitter",
            PlatformId::Mastodon => "mastodon",
            PlatformId::Threads => "threads",
            PlatformId::Bluesky => "bluesky",
            PlatformId::Nostr => "nostr",
        }
    }

    /// Human-readable platform name
    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformId::Twitter => "Twitter",
            PlatformId::Mastodon => "Mastodon",
            PlatformId::Threads => "Threads",
            PlatformId::Bluesky => "Bluesky",
            PlatformId::Nostr => "Nostr",
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlatformId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "twitter" | "x" => Ok(PlatformId::Twitter),
            "mastodon" => Ok(PlatformId::Mastodon),
            "threads" => Ok(PlatformId::Threads),
            "bluesky" => Ok(PlatformId::Bluesky),
            "nostr" | "noster" => Ok(PlatformId::Nostr),
            _ => Err(format!(
                "Unknown platform: '{}'. Valid options: twitter, mastodon, threads, bluesky, nostr",
                s
            )),
        }
    }
}

/// Publishing capability of one destination
///
/// Implementations must not perform network I/O when constructed. Anything
/// that needs a round trip before the first publish (such as a login
/// exchange) belongs in [`Platform::activate`].
#[async_trait]
pub trait Platform: Send + Sync {
    /// Which destination this handle publishes to
    fn id(&self) -> PlatformId;

    /// One-time setup required before publishing
    ///
    /// Called at most once per run, before any call to [`Platform::publish`].
    /// The default implementation does nothing.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` or `PlatformError::Network` if
    /// the setup exchange fails. The handle is then unusable for the run.
    async fn activate(&mut self) -> Result<()> {
        Ok(())
    }

    /// Publish `text` as a single post
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the post or cannot be reached.
    async fn publish(&self, text: &str) -> Result<()>;
}
