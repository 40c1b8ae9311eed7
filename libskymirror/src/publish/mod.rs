//! Publisher abstraction and implementations
//!
//! The mirror republishes through this trait. One authenticate call happens
//! before the loop starts; if it fails the process has nothing useful left to
//! do and exits. Text length and formatting constraints are the publisher's
//! concern, not the mirror's.

use async_trait::async_trait;

use crate::error::Result;

pub mod bluesky;

// Mock publisher is available for all builds (not just tests) to support
// integration tests
pub mod mock;

/// Create the configured publisher.
///
/// Reads the app password from `SKYMIRROR_BLUESKY_PASSWORD` if set, falling
/// back to the configured password file. Does not authenticate; callers do
/// that once before the loop starts.
///
/// # Errors
///
/// Returns `ConfigError::MissingField` when no publisher is enabled, or
/// `PublishError::Authentication` when credentials cannot be read.
pub async fn create_publisher(config: &crate::Config) -> Result<Box<dyn Publisher>> {
    use crate::error::{ConfigError, PublishError};

    let Some(bluesky) = config.bluesky.as_ref().filter(|b| b.enabled) else {
        return Err(ConfigError::MissingField("bluesky".to_string()).into());
    };

    tracing::info!(handle = %bluesky.handle, "Creating Bluesky publisher");

    let app_password = match std::env::var("SKYMIRROR_BLUESKY_PASSWORD") {
        Ok(password) => password.trim().to_string(),
        Err(_) => {
            let password_path = bluesky.expand_password_file_path()?;

            if !password_path.exists() {
                return Err(PublishError::Authentication(format!(
                    "Bluesky password file not found: {}. Create this file with your app password, or set SKYMIRROR_BLUESKY_PASSWORD.",
                    password_path.display()
                ))
                .into());
            }

            std::fs::read_to_string(&password_path)
                .map_err(|e| {
                    PublishError::Authentication(format!(
                        "Failed to read Bluesky password file {}: {}",
                        password_path.display(),
                        e
                    ))
                })?
                .trim()
                .to_string()
        }
    };

    let publisher = bluesky::BlueskyPublisher::new(
        bluesky.service.clone(),
        bluesky.handle.clone(),
        app_password,
    )
    .await?;

    Ok(Box::new(publisher))
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Establish a session with the platform.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Authentication` on bad credentials or an
    /// unreachable service. The mirror treats this as fatal at startup.
    async fn authenticate(&mut self) -> Result<()>;

    /// Publish the rendered text, returning the platform-specific post id.
    ///
    /// # Errors
    ///
    /// Returns `PublishError` when the platform rejects the post or the
    /// network fails; the caller decides whether and when to retry.
    async fn publish(&self, text: &str) -> Result<String>;

    /// Lowercase platform identifier (e.g. "bluesky")
    fn name(&self) -> &str;

    /// Maximum post length, or `None` if the platform has no hard limit
    fn character_limit(&self) -> Option<usize>;
}
