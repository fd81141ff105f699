//! Error types for Crosscast

use thiserror::Error;

use crate::platforms::PlatformId;

pub type Result<T> = std::result::Result<T, CrossPostError>;

#[derive(Error, Debug)]
pub enum CrossPostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CrossPostError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CrossPostError::InvalidInput(_) => 1,
            CrossPostError::Platform(PlatformError::Authentication(_)) => 2,
            CrossPostError::Platform(_) => 1,
            CrossPostError::Config(_) => 1,
            CrossPostError::Output(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load env file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("Platform {0} is already registered")]
    DuplicatePlatform(PlatformId),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Platform not configured: {0}")]
    NotConfigured(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

/// One-time activation failed for one or more platforms.
///
/// Returned by `Registry::activate` on its own rather than through
/// [`CrossPostError`]: the failed platforms stay registered but are unusable
/// for the rest of the run, and their publish attempts report failure.
#[derive(Error, Debug, Clone)]
#[error("{}", describe_failures(.failures))]
pub struct ActivationError {
    pub failures: Vec<(PlatformId, PlatformError)>,
}

impl ActivationError {
    /// Platforms whose activation failed
    pub fn platforms(&self) -> impl Iterator<Item = PlatformId> + '_ {
        self.failures.iter().map(|(id, _)| *id)
    }
}

fn describe_failures(failures: &[(PlatformId, PlatformError)]) -> String {
    let details: Vec<String> = failures
        .iter()
        .map(|(id, e)| format!("{} ({})", id, e))
        .collect();
    format!(
        "{} platform(s) failed to activate: {}",
        failures.len(),
        details.join(", ")
    )
}
