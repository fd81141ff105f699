//! Nostr platform implementation
//!
//! Each publish is a self-contained exchange with a single relay: sign a
//! kind-1 text note, connect, send it, disconnect. The connection lives in a
//! [`RelaySession`] that is closed on every path once opened.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nostr_sdk::{Client, Event, EventBuilder, Keys, Timestamp};
use secrecy::ExposeSecret;

use crate::config::NostrConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::{Platform, PlatformId};

pub struct NostrClient {
    config: NostrConfig,
}

impl NostrClient {
    pub fn new(config: NostrConfig) -> Self {
        Self { config }
    }

    /// Relay this client publishes to
    pub fn relay(&self) -> &str {
        &self.config.relay
    }

    /// Decode the configured secret key (nsec bech32 or 64-character hex)
    fn keys(&self) -> Result<Keys> {
        let key_str = self.config.private_key.expose_secret().trim();

        Keys::parse(key_str)
            .map_err(|e| PlatformError::Signing(format!("Invalid Nostr private key: {}", e)).into())
    }

    /// Sign a text note carrying `text`
    fn sign_note(&self, text: &str) -> Result<Event> {
        let keys = self.keys()?;

        EventBuilder::text_note(text, [])
            .custom_created_at(Timestamp::now())
            .to_event(&keys)
            .map_err(|e| PlatformError::Signing(format!("Failed to sign note: {}", e)).into())
    }
}

#[async_trait]
impl Platform for NostrClient {
    fn id(&self) -> PlatformId {
        PlatformId::Nostr
    }

    async fn publish(&self, text: &str) -> Result<()> {
        let event = self.sign_note(text)?;

        let session = RelaySession::open(&self.config.relay).await?;
        let published = session.send(event).await;
        session.close().await;

        published
    }
}

/// How long a relay gets to acknowledge a published note
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(20);

/// Connection to one relay, released when the session ends
///
/// `close` disconnects explicitly. If the session is dropped without being
/// closed (the publishing future was cancelled or panicked) the disconnect
/// is scheduled on the current runtime instead.
pub struct RelaySession {
    client: Client,
    relay: String,
    send_timeout: Duration,
    released: Released,
    closed: bool,
}

/// Shared view of whether a session's relay connection has been released
#[derive(Debug, Clone, Default)]
pub struct Released(Arc<AtomicBool>);

impl Released {
    pub fn is_released(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn mark(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl RelaySession {
    /// Connect to `relay`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Network` if the relay URL is invalid or the
    /// relay cannot be added to the pool.
    pub async fn open(relay: &str) -> Result<Self> {
        let mut session = Self {
            client: Client::default(),
            relay: relay.to_string(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
            released: Released::default(),
            closed: false,
        };

        if let Err(e) = session.client.add_relay(relay).await {
            session.closed = true;
            session.released.mark();
            return Err(
                PlatformError::Network(format!("Failed to add relay {}: {}", relay, e)).into(),
            );
        }

        session.client.connect().await;
        tracing::debug!("Connected to relay {}", relay);

        Ok(session)
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Handle that reports when the connection has been released
    pub fn released(&self) -> Released {
        self.released.clone()
    }

    /// Publish a signed event to the relay
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Posting` if the relay rejects the event or
    /// does not answer within the send timeout.
    pub async fn send(&self, event: Event) -> Result<()> {
        match tokio::time::timeout(self.send_timeout, self.client.send_event(event)).await {
            Ok(Ok(_)) => {
                tracing::debug!("Published note to {}", self.relay);
                Ok(())
            }
            Ok(Err(e)) => Err(PlatformError::Posting(format!(
                "Failed to publish to {}: {}",
                self.relay, e
            ))
            .into()),
            Err(_) => Err(PlatformError::Posting(format!(
                "Timed out publishing to {} after {:?}",
                self.relay, self.send_timeout
            ))
            .into()),
        }
    }

    /// Disconnect from the relay
    pub async fn close(mut self) {
        self.closed = true;
        disconnect(&self.client, &self.relay).await;
        self.released.mark();
    }
}

async fn disconnect(client: &Client, relay: &str) {
    if let Err(e) = client.disconnect().await {
        tracing::warn!("Failed to disconnect from {}: {}", relay, e);
    }
}

impl Drop for RelaySession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        let client = self.client.clone();
        let relay = self.relay.clone();
        let released = self.released.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    disconnect(&client, &relay).await;
                    released.mark();
                });
            }
            Err(_) => tracing::warn!("Relay session for {} dropped outside a runtime", relay),
        }
    }
}
