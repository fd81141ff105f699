//! Mastodon platform implementation
//!
//! Uses the megalodon library, so any instance speaking the Mastodon API
//! (Mastodon, Pleroma, Akkoma, GoToSocial) works as a destination.

use async_trait::async_trait;
use megalodon::entities::StatusVisibility;
use megalodon::megalodon::{PostStatusInputOptions, PostStatusOutput};
use megalodon::{Megalodon, SNS};
use secrecy::ExposeSecret;

use crate::config::MastodonConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::{Platform, PlatformId};

/// Mastodon platform client
pub struct MastodonClient {
    /// The megalodon client for API interactions
    client: Box<dyn Megalodon + Send + Sync>,

    /// The instance URL (e.g., "https://mastodon.social")
    instance_url: String,
}

impl MastodonClient {
    /// Create a new Mastodon client
    ///
    /// Instance URLs without a scheme get `https://` prepended. No request is
    /// made until the first publish.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use libcrosscast::config::MastodonConfig;
    /// use libcrosscast::platforms::mastodon::MastodonClient;
    ///
    /// # fn example() -> libcrosscast::error::Result<()> {
    /// let client = MastodonClient::new(MastodonConfig::new("mastodon.social", "token"))?;
    /// assert_eq!(client.instance_url(), "https://mastodon.social");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: MastodonConfig) -> Result<Self> {
        let instance_url = normalize_instance_url(&config.instance);

        let client = megalodon::generator(
            SNS::Mastodon,
            instance_url.clone(),
            Some(config.access_token.expose_secret().to_string()),
            None,
        )
        .map_err(|e| {
            PlatformError::Authentication(format!("Failed to create Mastodon client: {:?}", e))
        })?;

        Ok(Self {
            client,
            instance_url,
        })
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }
}

#[async_trait]
impl Platform for MastodonClient {
    fn id(&self) -> PlatformId {
        PlatformId::Mastodon
    }

    async fn publish(&self, text: &str) -> Result<()> {
        let options = PostStatusInputOptions {
            visibility: Some(StatusVisibility::Public),
            ..Default::default()
        };

        let response = self
            .client
            .post_status(text.to_string(), Some(&options))
            .await
            .map_err(|e| map_megalodon_error(e, "post status"))?;

        let status_id = match response.json {
            PostStatusOutput::Status(status) => status.id,
            PostStatusOutput::ScheduledStatus(scheduled) => scheduled.id,
        };
        tracing::debug!("Posted to Mastodon ({}): {}", self.instance_url, status_id);

        Ok(())
    }
}

/// Ensure the instance URL carries a scheme
fn normalize_instance_url(instance: &str) -> String {
    let instance = instance.trim().trim_end_matches('/');
    if instance.starts_with("http://") || instance.starts_with("https://") {
        instance.to_string()
    } else {
        format!("https://{}", instance)
    }
}

/// Map megalodon errors to PlatformError
///
/// - HTTP 401/403 → `Authentication`
/// - HTTP 429 → `RateLimit`
/// - other HTTP statuses → `Posting`
/// - no status → `Network`
fn map_megalodon_error(error: megalodon::error::Error, context: &str) -> PlatformError {
    let error_str = error.to_string();

    match extract_http_status(&error_str) {
        Some(401) | Some(403) => PlatformError::Authentication(format!(
            "Mastodon rejected the access token ({}): {}",
            context, error_str
        )),
        Some(429) => PlatformError::RateLimit(format!(
            "Mastodon rate limit exceeded ({}): {}",
            context, error_str
        )),
        Some(_) => PlatformError::Posting(format!(
            "Mastodon request failed ({}): {}",
            context, error_str
        )),
        None => PlatformError::Network(format!("Mastodon error ({}): {}", context, error_str)),
    }
}

/// Extract an HTTP status code from an error message
///
/// Looks for patterns like "HTTP 401", "status 403" or a standalone
/// three-digit code followed by ':' or ' '.
fn extract_http_status(error_str: &str) -> Option<u16> {
    let prefixes = ["HTTP ", "status ", "code: ", "status_code: "];

    for prefix in &prefixes {
        if let Some(pos) = error_str.find(prefix) {
            let after_prefix = &error_str[pos + prefix.len()..];
            if let Some(code) = after_prefix.get(0..3).and_then(|s| s.parse::<u16>().ok()) {
                if (100..=599).contains(&code) {
                    return Some(code);
                }
            }
        }
    }

    let bytes = error_str.as_bytes();
    for (i, window) in bytes.windows(4).enumerate() {
        let is_code = window[..3].iter().all(u8::is_ascii_digit)
            && (window[3] == b':' || window[3] == b' ')
            && (i == 0 || !bytes[i - 1].is_ascii_digit());
        if !is_code {
            continue;
        }
        if let Some(code) = std::str::from_utf8(&window[..3])
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
        {
            if (100..=599).contains(&code) {
                return Some(code);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_instance_url_adds_scheme() {
        assert_eq!(normalize_instance_url("mastodon.social"), "https://mastodon.social");
        assert_eq!(normalize_instance_url("mastodon.social/"), "https://mastodon.social");
    }

    #[test]
    fn test_normalize_instance_url_keeps_scheme() {
        assert_eq!(
            normalize_instance_url("https://fosstodon.org"),
            "https://fosstodon.org"
        );
        assert_eq!(
            normalize_instance_url("http://localhost:3000"),
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_new_does_not_touch_the_network() {
        let client =
            MastodonClient::new(MastodonConfig::new("mastodon.example", "token")).unwrap();

        assert_eq!(client.instance_url(), "https://mastodon.example");
        assert_eq!(client.id(), PlatformId::Mastodon);
    }

    #[test]
    fn test_extract_http_status() {
        assert_eq!(extract_http_status("HTTP 401 Unauthorized"), Some(401));
        assert_eq!(extract_http_status("request failed with status 429"), Some(429));
        assert_eq!(extract_http_status("422: Validation failed"), Some(422));
        assert_eq!(extract_http_status("error 1234: not a status"), None);
        assert_eq!(extract_http_status("connection refused"), None);
    }
}
