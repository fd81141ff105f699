//! Cross-post dispatch
//!
//! Sends one message to every platform that is both requested and
//! configured, all at once, and folds the results into a [`PostOutcome`].
//! Failures stay with the platform that produced them: an error or panic in
//! one publish never reaches the caller and never holds up the others.

use std::panic::AssertUnwindSafe;

use futures::future::join_all;
use futures::FutureExt;
use tracing::{info, warn};

use crate::error::{CrossPostError, Result};
use crate::platforms::PlatformId;
use crate::registry::Registry;
use crate::types::{PostOutcome, RequestFlags};

pub struct Dispatcher<'a> {
    registry: &'a Registry,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Platforms that will actually be published to for `flags`
    pub fn attempted(&self, flags: &RequestFlags) -> Vec<PlatformId> {
        flags
            .requested()
            .filter(|id| self.registry.is_configured(*id))
            .collect()
    }

    /// Post `message` to every requested, configured platform
    ///
    /// Attempts run concurrently on the calling task. The returned outcome
    /// covers all platforms once every attempt has settled; platforms that
    /// were not attempted are `false`.
    ///
    /// # Errors
    ///
    /// Returns `CrossPostError::InvalidInput` if `flags` requests no platform.
    /// Per-platform failures are never returned as errors.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use libcrosscast::config::Config;
    /// use libcrosscast::dispatcher::Dispatcher;
    /// use libcrosscast::platforms::PlatformId;
    /// use libcrosscast::registry::Registry;
    /// use libcrosscast::types::RequestFlags;
    ///
    /// # async fn example() -> libcrosscast::error::Result<()> {
    /// let mut registry = Registry::build(Config::from_env());
    /// let _ = registry.activate().await;
    ///
    /// let flags = RequestFlags::only(&[PlatformId::Mastodon, PlatformId::Nostr]);
    /// let outcome = Dispatcher::new(&registry).cross_post("Hello!", &flags).await?;
    /// println!("{}", outcome);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn cross_post(&self, message: &str, flags: &RequestFlags) -> Result<PostOutcome> {
        if flags.is_empty() {
            return Err(CrossPostError::InvalidInput(
                "At least one platform must be selected".to_string(),
            ));
        }

        let attempts = self
            .attempted(flags)
            .into_iter()
            .map(|id| async move { (id, self.publish_one(id, message).await) });

        let mut outcome = PostOutcome::default();
        for (id, succeeded) in join_all(attempts).await {
            outcome.set(id, succeeded);
        }

        Ok(outcome)
    }

    /// Publish to a single platform, converting any failure into `false`
    async fn publish_one(&self, id: PlatformId, message: &str) -> bool {
        info!("Posting to platform: {}", id);

        let attempt = AssertUnwindSafe(self.registry.publish(id, message))
            .catch_unwind()
            .await;

        match attempt {
            Ok(Ok(())) => {
                info!("Successfully posted to {}", id);
                true
            }
            Ok(Err(e)) => {
                warn!("{} posting failed: {}", id.display_name(), e);
                false
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<String>()
                    .map(String::as_str)
                    .or_else(|| panic.downcast_ref::<&str>().copied())
                    .unwrap_or("unknown panic");
                warn!("{} posting failed: panicked: {}", id.display_name(), reason);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::mock::MockPlatform;

    #[tokio::test]
    async fn test_empty_flags_rejected() {
        let registry = Registry::new();
        let dispatcher = Dispatcher::new(&registry);

        let result = dispatcher.cross_post("Hello", &RequestFlags::default()).await;
        assert!(matches!(result, Err(CrossPostError::InvalidInput(_))));
    }

    #[test]
    fn test_attempted_is_requested_and_configured() {
        let mut registry = Registry::new();
        registry
            .register(Box::new(MockPlatform::success(PlatformId::Twitter)))
            .unwrap();
        registry
            .register(Box::new(MockPlatform::success(PlatformId::Nostr)))
            .unwrap();

        let dispatcher = Dispatcher::new(&registry);
        let flags = RequestFlags::only(&[PlatformId::Twitter, PlatformId::Mastodon]);

        assert_eq!(dispatcher.attempted(&flags), vec![PlatformId::Twitter]);
    }

    #[tokio::test]
    async fn test_panicking_platform_reports_false() {
        let mut registry = Registry::new();
        registry
            .register(Box::new(MockPlatform::panicking(PlatformId::Bluesky)))
            .unwrap();

        let outcome = Dispatcher::new(&registry)
            .cross_post("Hello", &RequestFlags::all())
            .await
            .unwrap();

        assert_eq!(outcome, PostOutcome::default());
    }
}
