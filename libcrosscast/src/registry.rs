//! Destination registry
//!
//! Holds one publishing handle per configured platform. The registry is built
//! once from a [`Config`], activated once, and then only read.

use std::collections::BTreeMap;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ActivationError, ConfigError, PlatformError, Result};
use crate::platforms::{
    bluesky::BlueskyClient, mastodon::MastodonClient, nostr::NostrClient,
    threads::ThreadsClient, twitter::TwitterClient, Platform, PlatformId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ActivationState {
    Pending,
    Ready,
    Failed(String),
}

struct Destination {
    handle: Box<dyn Platform>,
    state: ActivationState,
}

/// Configured destinations, keyed by platform
#[derive(Default)]
pub struct Registry {
    destinations: BTreeMap<PlatformId, Destination>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build handles for every platform with a complete credential bundle
    ///
    /// Threads needs no credentials and always gets a handle. No network I/O
    /// happens here. A handle whose construction fails is
    /// logged and the platform is left unconfigured.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use libcrosscast::config::Config;
    /// use libcrosscast::registry::Registry;
    ///
    /// # async fn example() {
    /// let mut registry = Registry::build(Config::from_env());
    /// if let Err(e) = registry.activate().await {
    ///     eprintln!("{}", e);
    /// }
    /// # }
    /// ```
    pub fn build(config: Config) -> Self {
        let Config {
            twitter,
            mastodon,
            bluesky,
            nostr,
        } = config;

        let mut handles: Vec<Result<Box<dyn Platform>>> = Vec::new();

        if let Some(twitter) = twitter {
            handles.push(TwitterClient::new(twitter).map(|c| Box::new(c) as Box<dyn Platform>));
        }
        if let Some(mastodon) = mastodon {
            handles.push(MastodonClient::new(mastodon).map(|c| Box::new(c) as Box<dyn Platform>));
        }
        handles.push(Ok(Box::new(ThreadsClient::new()) as Box<dyn Platform>));
        if let Some(bluesky) = bluesky {
            handles.push(Ok(Box::new(BlueskyClient::new(bluesky)) as Box<dyn Platform>));
        }
        if let Some(nostr) = nostr {
            handles.push(Ok(Box::new(NostrClient::new(nostr)) as Box<dyn Platform>));
        }

        let mut registry = Self::new();
        for handle in handles {
            match handle {
                Ok(handle) => {
                    let id = handle.id();
                    if let Err(e) = registry.register(handle) {
                        warn!("Skipping {}: {}", id, e);
                    }
                }
                Err(e) => warn!("Failed to set up platform client: {}", e),
            }
        }

        info!("Configured {} platform(s)", registry.destinations.len());
        registry
    }

    /// Add a handle for a platform that has none yet
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicatePlatform` if the platform already has a
    /// handle; handles are never replaced within a run.
    pub fn register(&mut self, handle: Box<dyn Platform>) -> Result<()> {
        let id = handle.id();
        if self.destinations.contains_key(&id) {
            return Err(ConfigError::DuplicatePlatform(id).into());
        }

        debug!("Registered {} platform client", id);
        self.destinations.insert(
            id,
            Destination {
                handle,
                state: ActivationState::Pending,
            },
        );
        Ok(())
    }

    /// Run one-time activation for every pending handle
    ///
    /// All pending handles are activated concurrently. A handle whose
    /// activation fails stays registered but is unusable for the rest of the
    /// run. Calling this again only activates handles registered since.
    ///
    /// # Errors
    ///
    /// Returns an `ActivationError` listing the platforms that failed during
    /// this call. Platforms that activated successfully are ready either way.
    pub async fn activate(&mut self) -> std::result::Result<(), ActivationError> {
        let pending = self
            .destinations
            .iter_mut()
            .filter(|(_, destination)| destination.state == ActivationState::Pending)
            .map(|(id, destination)| async move {
                let result = destination.handle.activate().await;
                destination.state = match &result {
                    Ok(()) => {
                        debug!("Activated {}", id);
                        ActivationState::Ready
                    }
                    Err(e) => {
                        warn!("Failed to activate {}: {}", id, e);
                        ActivationState::Failed(e.to_string())
                    }
                };
                (*id, result)
            });

        let failures: Vec<(PlatformId, PlatformError)> = join_all(pending)
            .await
            .into_iter()
            .filter_map(|(id, result)| match result {
                Ok(()) => None,
                Err(crate::error::CrossPostError::Platform(e)) => Some((id, e)),
                Err(e) => Some((id, PlatformError::Authentication(e.to_string()))),
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ActivationError { failures })
        }
    }

    /// Whether a handle exists for `id`
    pub fn is_configured(&self, id: PlatformId) -> bool {
        self.destinations.contains_key(&id)
    }

    /// Whether `id` is configured and has not failed activation
    pub fn is_usable(&self, id: PlatformId) -> bool {
        self.destinations
            .get(&id)
            .is_some_and(|d| !matches!(d.state, ActivationState::Failed(_)))
    }

    /// Configured platforms, in output order
    pub fn configured(&self) -> impl Iterator<Item = PlatformId> + '_ {
        self.destinations.keys().copied()
    }

    /// Publish `text` through the handle for `id`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::NotConfigured` if there is no handle,
    /// `PlatformError::Authentication` if the handle failed activation, or the
    /// handle's own publish error.
    pub async fn publish(&self, id: PlatformId, text: &str) -> Result<()> {
        let destination = self
            .destinations
            .get(&id)
            .ok_or_else(|| PlatformError::NotConfigured(id.to_string()))?;

        if let ActivationState::Failed(reason) = &destination.state {
            return Err(PlatformError::Authentication(format!(
                "{} is unusable after failed activation: {}",
                id.display_name(),
                reason
            ))
            .into());
        }

        destination.handle.publish(text).await
    }
}
