//! Crosscast - post one message to many social platforms at once
//!
//! A [`Registry`] holds a publishing handle per configured platform and a
//! [`Dispatcher`] fans a message out to the requested ones, collecting a
//! per-platform [`PostOutcome`]. One platform failing never stops the others.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod platforms;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{CrossPostError, Result};
pub use platforms::{Platform, PlatformId};
pub use registry::Registry;
pub use types::{PostOutcome, RequestFlags};
