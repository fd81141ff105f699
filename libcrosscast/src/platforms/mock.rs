//! Mock platform implementation for testing
//!
//! This module provides a configurable mock platform that can simulate various
//! behaviors including successes, failures, delays and panics. It stands in
//! for any [`PlatformId`] so dispatch logic can be exercised without
//! credentials or network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{PlatformError, Result};
use crate::platforms::{Platform, PlatformId};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform this mock stands in for
    pub id: PlatformId,

    /// Whether activation should succeed
    pub activate_succeeds: bool,

    /// Whether publishing should succeed
    pub publish_succeeds: bool,

    /// Panic inside publish instead of returning
    pub publish_panics: bool,

    /// Error to return on publish failure
    pub publish_error: Option<String>,

    /// Delay before completing operations (simulates network latency)
    pub delay: Duration,

    /// Number of times activate has been called
    pub activate_call_count: Arc<Mutex<usize>>,

    /// Number of times publish has been called
    pub publish_call_count: Arc<Mutex<usize>>,

    /// Messages that have been published (for verification)
    pub published: Arc<Mutex<Vec<String>>>,
}

impl MockConfig {
    pub fn new(id: PlatformId) -> Self {
        Self {
            id,
            activate_succeeds: true,
            publish_succeeds: true,
            publish_panics: false,
            publish_error: None,
            delay: Duration::from_millis(0),
            activate_call_count: Arc::new(Mutex::new(0)),
            publish_call_count: Arc::new(Mutex::new(0)),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Shared view of a mock's counters, usable after the mock is handed to a registry
#[derive(Debug, Clone)]
pub struct MockProbe {
    activate_call_count: Arc<Mutex<usize>>,
    publish_call_count: Arc<Mutex<usize>>,
    published: Arc<Mutex<Vec<String>>>,
}

impl MockProbe {
    pub fn activate_call_count(&self) -> usize {
        *self.activate_call_count.lock().unwrap()
    }

    pub fn publish_call_count(&self) -> usize {
        *self.publish_call_count.lock().unwrap()
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock platform that always succeeds
    pub fn success(id: PlatformId) -> Self {
        Self::new(MockConfig::new(id))
    }

    /// Create a mock platform that fails activation
    pub fn activation_failure(id: PlatformId) -> Self {
        Self::new(MockConfig {
            activate_succeeds: false,
            ..MockConfig::new(id)
        })
    }

    /// Create a mock platform that fails publishing
    pub fn publish_failure(id: PlatformId, error: &str) -> Self {
        Self::new(MockConfig {
            publish_succeeds: false,
            publish_error: Some(error.to_string()),
            ..MockConfig::new(id)
        })
    }

    /// Create a mock platform that panics while publishing
    pub fn panicking(id: PlatformId) -> Self {
        Self::new(MockConfig {
            publish_panics: true,
            ..MockConfig::new(id)
        })
    }

    /// Create a mock platform with a delay
    pub fn with_delay(id: PlatformId, delay: Duration) -> Self {
        Self::new(MockConfig {
            delay,
            ..MockConfig::new(id)
        })
    }

    /// Counters that stay readable after the mock is moved
    pub fn probe(&self) -> MockProbe {
        MockProbe {
            activate_call_count: Arc::clone(&self.config.activate_call_count),
            publish_call_count: Arc::clone(&self.config.publish_call_count),
            published: Arc::clone(&self.config.published),
        }
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn id(&self) -> PlatformId {
        self.config.id
    }

    async fn activate(&mut self) -> Result<()> {
        *self.config.activate_call_count.lock().unwrap() += 1;

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if self.config.activate_succeeds {
            Ok(())
        } else {
            Err(PlatformError::Authentication("Mock activation failed".to_string()).into())
        }
    }

    async fn publish(&self, text: &str) -> Result<()> {
        *self.config.publish_call_count.lock().unwrap() += 1;

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if self.config.publish_panics {
            panic!("mock {} panicked while publishing", self.config.id);
        }

        if self.config.publish_succeeds {
            self.config.published.lock().unwrap().push(text.to_string());
            Ok(())
        } else {
            let error_msg = self
                .config
                .publish_error
                .clone()
                .unwrap_or_else(|| "Mock publishing failed".to_string());
            Err(PlatformError::Posting(error_msg).into())
        }
    }
}
