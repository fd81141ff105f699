//! Twitter platform implementation
//!
//! Posts through the v2 `POST /2/tweets` endpoint with OAuth 1.0a user-context
//! authorization (HMAC-SHA1 request signing).

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::Rng;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha1::Sha1;

use crate::config::TwitterConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::{Platform, PlatformId};

/// Production API host
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// RFC 3986 unreserved characters stay as-is, everything else is encoded
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

pub struct TwitterClient {
    http: reqwest::Client,
    api_base: String,
    credentials: TwitterConfig,
}

impl TwitterClient {
    /// Create a client for the production API
    pub fn new(credentials: TwitterConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("crosscast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                PlatformError::Network(format!("Failed to create Twitter HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            credentials,
        })
    }

    /// Point the client at a different API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn tweets_url(&self) -> String {
        format!("{}/2/tweets", self.api_base)
    }

    /// Build the `Authorization` header value for a request
    ///
    /// JSON bodies are not part of the OAuth signature base, so only the
    /// `oauth_*` parameters are signed.
    fn authorization_header(&self, method: &str, url: &str) -> Result<String> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp().to_string();

        authorization_header(
            method,
            url,
            &[],
            &OAuthCredentials {
                consumer_key: &self.credentials.api_key,
                consumer_secret: self.credentials.api_secret.expose_secret(),
                token: &self.credentials.access_token,
                token_secret: self.credentials.access_secret.expose_secret(),
            },
            &nonce,
            &timestamp,
        )
    }
}

#[async_trait]
impl Platform for TwitterClient {
    fn id(&self) -> PlatformId {
        PlatformId::Twitter
    }

    async fn publish(&self, text: &str) -> Result<()> {
        let url = self.tweets_url();
        let authorization = self.authorization_header("POST", &url)?;

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("Twitter request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &body).into());
        }

        match response.json::<TweetResponse>().await {
            Ok(tweet) => tracing::debug!("Posted to Twitter: {}", tweet.data.id),
            Err(e) => tracing::debug!("Posted to Twitter, unreadable response body: {}", e),
        }

        Ok(())
    }
}

fn map_status_error(status: reqwest::StatusCode, body: &str) -> PlatformError {
    let detail = format!("HTTP {}: {}", status.as_u16(), body.trim());
    match status.as_u16() {
        401 | 403 => {
            PlatformError::Authentication(format!("Twitter rejected credentials ({})", detail))
        }
        429 => PlatformError::RateLimit(format!("Twitter rate limit ({})", detail)),
        _ => PlatformError::Posting(format!("Twitter rejected the post ({})", detail)),
    }
}

struct OAuthCredentials<'a> {
    consumer_key: &'a str,
    consumer_secret: &'a str,
    token: &'a str,
    token_secret: &'a str,
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

fn oauth_params<'a>(
    credentials: &OAuthCredentials<'a>,
    nonce: &'a str,
    timestamp: &'a str,
) -> Vec<(&'a str, &'a str)> {
    vec![
        ("oauth_consumer_key", credentials.consumer_key),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp),
        ("oauth_token", credentials.token),
        ("oauth_version", "1.0"),
    ]
}

/// Compute the OAuth 1.0a HMAC-SHA1 signature
///
/// `params` holds every signed parameter (query, form body and `oauth_*`).
fn signature(
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String> {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let parameter_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let base_string = format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&parameter_string)
    );
    let signing_key = format!("{}&{}", encode(consumer_secret), encode(token_secret));

    let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
        .map_err(|e| PlatformError::Signing(format!("Invalid OAuth signing key: {}", e)))?;
    mac.update(base_string.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn authorization_header(
    method: &str,
    url: &str,
    extra_params: &[(&str, &str)],
    credentials: &OAuthCredentials<'_>,
    nonce: &str,
    timestamp: &str,
) -> Result<String> {
    let oauth = oauth_params(credentials, nonce, timestamp);

    let mut signed: Vec<(&str, &str)> = oauth.clone();
    signed.extend_from_slice(extra_params);
    let signature = signature(
        method,
        url,
        &signed,
        credentials.consumer_secret,
        credentials.token_secret,
    )?;

    let mut header_params: Vec<(&str, &str)> = oauth;
    header_params.push(("oauth_signature", &signature));
    header_params.sort();

    let fields = header_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {}", fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> TwitterConfig {
        TwitterConfig {
            api_key: "consumer-key".to_string(),
            api_secret: SecretString::from("consumer-secret".to_string()),
            access_token: "access-token".to_string(),
            access_secret: SecretString::from("access-secret".to_string()),
        }
    }

    #[test]
    fn test_encode_follows_rfc3986() {
        assert_eq!(encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(encode("An encoded string!"), "An%20encoded%20string%21");
        assert_eq!(encode("Dogs, Cats & Mice"), "Dogs%2C%20Cats%20%26%20Mice");
        assert_eq!(encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(encode("☃"), "%E2%98%83");
    }

    #[test]
    fn test_signature_matches_reference_request() {
        // Reference request from Twitter's "Creating a signature" guide
        let params = [
            ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ("include_entities", "true"),
            ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
            ("oauth_nonce", "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1318622958"),
            ("oauth_token", "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
            ("oauth_version", "1.0"),
        ];

        let signature = signature(
            "POST",
            "https://api.twitter.com/1.1/statuses/update.json",
            &params,
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        )
        .unwrap();

        assert_eq!(signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn test_authorization_header_fields() {
        let credentials = OAuthCredentials {
            consumer_key: "consumer-key",
            consumer_secret: "consumer-secret",
            token: "access-token",
            token_secret: "access-secret",
        };

        let header = authorization_header(
            "POST",
            "https://api.twitter.com/2/tweets",
            &[],
            &credentials,
            "nonce123",
            "1700000000",
        )
        .unwrap();

        assert!(header.starts_with(
            "OAuth oauth_consumer_key=\"consumer-key\", oauth_nonce=\"nonce123\""
        ));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_timestamp=\"1700000000\""));
        assert!(header.contains("oauth_token=\"access-token\""));
        assert!(header.contains("oauth_version=\"1.0\""));
        assert!(header.contains("oauth_signature=\""));
        assert!(!header.contains("consumer-secret"));
        assert!(!header.contains("access-secret"));
    }

    #[test]
    fn test_map_status_error() {
        assert!(matches!(
            map_status_error(reqwest::StatusCode::UNAUTHORIZED, ""),
            PlatformError::Authentication(_)
        ));
        assert!(matches!(
            map_status_error(reqwest::StatusCode::TOO_MANY_REQUESTS, ""),
            PlatformError::RateLimit(_)
        ));
        assert!(matches!(
            map_status_error(reqwest::StatusCode::BAD_REQUEST, "duplicate content"),
            PlatformError::Posting(msg) if msg.contains("duplicate content")
        ));
    }

    #[tokio::test]
    async fn test_publish_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(header_exists("authorization"))
            .and(body_json(serde_json::json!({ "text": "Hello, world" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": { "id": "1445880548472328192", "text": "Hello, world" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TwitterClient::new(test_config())
            .unwrap()
            .with_api_base(mock_server.uri());

        let result = client.publish("Hello, world").await;
        assert!(result.is_ok(), "Publish should succeed: {:?}", result.err());
    }

    #[tokio::test]
    async fn test_publish_rejected_credentials() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&mock_server)
            .await;

        let client = TwitterClient::new(test_config())
            .unwrap()
            .with_api_base(mock_server.uri());

        let result = client.publish("Hello").await;
        assert!(matches!(
            result,
            Err(crate::error::CrossPostError::Platform(PlatformError::Authentication(_)))
        ));
    }

    #[tokio::test]
    async fn test_publish_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = TwitterClient::new(test_config())
            .unwrap()
            .with_api_base(format!("{}/", mock_server.uri()));

        let result = client.publish("Hello").await;
        assert!(matches!(
            result,
            Err(crate::error::CrossPostError::Platform(PlatformError::Posting(_)))
        ));
    }
}
