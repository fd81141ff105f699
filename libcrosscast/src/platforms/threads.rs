//! Threads platform implementation
//!
//! Publishing to Threads is disabled. The client exists so that the set of
//! destinations stays complete. It needs no credentials and always reports
//! failure.

use async_trait::async_trait;

use crate::error::{PlatformError, Result};
use crate::platforms::{Platform, PlatformId};

#[derive(Debug, Default)]
pub struct ThreadsClient;

impl ThreadsClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Platform for ThreadsClient {
    fn id(&self) -> PlatformId {
        PlatformId::Threads
    }

    async fn publish(&self, _text: &str) -> Result<()> {
        Err(PlatformError::NotImplemented("Threads publishing is disabled".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ThreadsClient {
        ThreadsClient::new()
    }

    #[tokio::test]
    async fn test_publish_always_fails() {
        let client = client();

        for text in ["", "Hello", "A much longer message with words"] {
            let result = client.publish(text).await;
            assert!(matches!(
                result,
                Err(crate::error::CrossPostError::Platform(PlatformError::NotImplemented(_)))
            ));
        }
    }

    #[tokio::test]
    async fn test_activation_is_a_no_op() {
        let mut client = client();
        assert!(client.activate().await.is_ok());
        assert_eq!(client.id(), PlatformId::Threads);
    }
}
