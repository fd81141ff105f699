//! Bluesky platform implementation
//!
//! Bluesky needs a session before it accepts posts. The agent is created and
//! logged in during activation; until then every publish fails.

use async_trait::async_trait;
use bsky_sdk::agent::config::Config as AgentConfig;
use bsky_sdk::BskyAgent;
use secrecy::ExposeSecret;

use crate::config::BlueskyConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::{Platform, PlatformId};

/// Map Bluesky/AT Protocol errors to PlatformError
///
/// # Arguments
///
/// * `error` - The error from bsky-sdk (generic over error types)
/// * `context` - The operation context (e.g., "login", "posting")
fn map_bluesky_error<E: std::fmt::Display + std::fmt::Debug>(
    error: E,
    context: &str,
) -> PlatformError {
    let error_msg = error.to_string();
    let debug_msg = format!("{:?}", error);

    if error_msg.contains("401")
        || error_msg.contains("403")
        || error_msg.contains("AuthenticationRequired")
        || error_msg.contains("InvalidToken")
        || error_msg.contains("ExpiredToken")
        || error_msg.contains("AuthFactorTokenRequired")
        || debug_msg.contains("Unauthorized")
    {
        return PlatformError::Authentication(format!(
            "Bluesky authentication failed during {}: {}",
            context, error_msg
        ));
    }

    if error_msg.contains("429")
        || error_msg.contains("RateLimitExceeded")
        || debug_msg.contains("RateLimit")
    {
        return PlatformError::RateLimit(format!(
            "Bluesky rate limit exceeded during {}: {}",
            context, error_msg
        ));
    }

    if error_msg.contains("connect")
        || error_msg.contains("timed out")
        || error_msg.contains("dns")
        || debug_msg.contains("Connect")
        || debug_msg.contains("Timeout")
    {
        return PlatformError::Network(format!(
            "Could not reach the Bluesky PDS during {}: {}",
            context, error_msg
        ));
    }

    PlatformError::Posting(format!(
        "Bluesky operation failed during {}: {}",
        context, error_msg
    ))
}

pub struct BlueskyClient {
    agent: Option<BskyAgent>,
    credentials: BlueskyConfig,
}

impl BlueskyClient {
    /// Create an inactive client; call [`Platform::activate`] to log in
    pub fn new(credentials: BlueskyConfig) -> Self {
        Self {
            agent: None,
            credentials,
        }
    }

    pub fn is_activated(&self) -> bool {
        self.agent.is_some()
    }
}

#[async_trait]
impl Platform for BlueskyClient {
    fn id(&self) -> PlatformId {
        PlatformId::Bluesky
    }

    async fn activate(&mut self) -> Result<()> {
        if self.agent.is_some() {
            return Ok(());
        }

        tracing::debug!(
            "Creating Bluesky session for {} on {}",
            self.credentials.identifier,
            self.credentials.service
        );

        let agent = BskyAgent::builder()
            .config(AgentConfig {
                endpoint: self.credentials.service.clone(),
                ..Default::default()
            })
            .build()
            .await
            .map_err(|e| map_bluesky_error(e, "agent setup"))?;

        agent
            .login(
                &self.credentials.identifier,
                self.credentials.password.expose_secret(),
            )
            .await
            .map_err(|e| map_bluesky_error(e, "login"))?;

        self.agent = Some(agent);
        tracing::debug!("Bluesky session created");

        Ok(())
    }

    async fn publish(&self, text: &str) -> Result<()> {
        use bsky_sdk::api::app::bsky::feed::post::RecordData;
        use bsky_sdk::api::types::string::Datetime;

        let agent = self.agent.as_ref().ok_or_else(|| {
            PlatformError::Authentication("Bluesky session not established".to_string())
        })?;

        let record = RecordData {
            created_at: Datetime::now(),
            embed: None,
            entities: None,
            facets: None,
            labels: None,
            langs: None,
            reply: None,
            tags: None,
            text: text.to_string(),
        };

        let response = agent
            .create_record(record)
            .await
            .map_err(|e| map_bluesky_error(e, "posting"))?;

        tracing::debug!("Posted to Bluesky: {}", response.uri);

        Ok(())
    }
}
