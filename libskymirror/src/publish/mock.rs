//! Mock publisher implementation for testing
//!
//! Configurable successes and failures, with shared counters and a record of
//! everything published, so mirror-loop tests can verify ordering and dedup
//! behavior without platform credentials or network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{PublishError, Result};
use crate::publish::Publisher;

/// Configuration for mock publisher behavior
#[derive(Debug, Clone)]
pub struct MockPublisherConfig {
    /// Publisher name (e.g. "mock-bluesky")
    pub name: String,

    /// Whether authentication should succeed
    pub auth_succeeds: bool,

    /// Error to return on authentication failure
    pub auth_error: Option<String>,

    /// Whether publishing should succeed in general
    pub publish_succeeds: bool,

    /// Specific rendered texts that fail even when publishing succeeds
    /// overall (for partial-tick scenarios)
    pub fail_texts: Vec<String>,

    /// Error to return on publish failure
    pub publish_error: Option<String>,

    /// Character limit reported to callers
    pub character_limit: Option<usize>,

    /// Number of times authenticate has been called
    pub auth_call_count: Arc<Mutex<usize>>,

    /// Number of times publish has been called (successes and failures)
    pub publish_call_count: Arc<Mutex<usize>>,

    /// Texts that have been published, in call order
    pub published: Arc<Mutex<Vec<String>>>,
}

impl Default for MockPublisherConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            auth_succeeds: true,
            auth_error: None,
            publish_succeeds: true,
            fail_texts: Vec::new(),
            publish_error: None,
            character_limit: None,
            auth_call_count: Arc::new(Mutex::new(0)),
            publish_call_count: Arc::new(Mutex::new(0)),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock publisher for testing
pub struct MockPublisher {
    config: MockPublisherConfig,
    authenticated: bool,
}

impl MockPublisher {
    pub fn new(config: MockPublisherConfig) -> Self {
        Self {
            config,
            authenticated: false,
        }
    }

    /// A publisher that always succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockPublisherConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// A publisher that fails authentication
    pub fn auth_failure(name: &str, error: &str) -> Self {
        Self::new(MockPublisherConfig {
            name: name.to_string(),
            auth_succeeds: false,
            auth_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A publisher that fails every publish
    pub fn publish_failure(name: &str, error: &str) -> Self {
        Self::new(MockPublisherConfig {
            name: name.to_string(),
            publish_succeeds: false,
            publish_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A publisher that fails only for the given rendered texts
    pub fn failing_for(name: &str, fail_texts: Vec<String>) -> Self {
        Self::new(MockPublisherConfig {
            name: name.to_string(),
            fail_texts,
            ..Default::default()
        })
    }

    /// Number of times authenticate was called
    pub fn auth_call_count(&self) -> usize {
        *self.config.auth_call_count.lock().unwrap()
    }

    /// Number of times publish was called, counting failures
    pub fn publish_call_count(&self) -> usize {
        *self.config.publish_call_count.lock().unwrap()
    }

    /// Shared handle onto the publish call counter
    pub fn publish_call_count_handle(&self) -> Arc<Mutex<usize>> {
        self.config.publish_call_count.clone()
    }

    /// Everything published so far, in call order
    pub fn published(&self) -> Vec<String> {
        self.config.published.lock().unwrap().clone()
    }

    /// Shared handle onto the published list, usable after boxing
    pub fn published_handle(&self) -> Arc<Mutex<Vec<String>>> {
        self.config.published.clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn authenticate(&mut self) -> Result<()> {
        *self.config.auth_call_count.lock().unwrap() += 1;

        if self.config.auth_succeeds {
            self.authenticated = true;
            Ok(())
        } else {
            let error_msg = self
                .config
                .auth_error
                .clone()
                .unwrap_or_else(|| "Mock authentication failed".to_string());
            Err(PublishError::Authentication(error_msg).into())
        }
    }

    async fn publish(&self, text: &str) -> Result<String> {
        *self.config.publish_call_count.lock().unwrap() += 1;

        if !self.authenticated {
            return Err(PublishError::Authentication("Not authenticated".to_string()).into());
        }

        let fails = !self.config.publish_succeeds
            || self.config.fail_texts.iter().any(|t| t == text);

        if fails {
            let error_msg = self
                .config
                .publish_error
                .clone()
                .unwrap_or_else(|| "Mock publishing failed".to_string());
            return Err(PublishError::Posting(error_msg).into());
        }

        self.config.published.lock().unwrap().push(text.to_string());

        let post_id = format!("{}:mock-{}", self.config.name, uuid::Uuid::new_v4());
        Ok(post_id)
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_success() {
        let mut publisher = MockPublisher::success("test");

        publisher.authenticate().await.unwrap();
        assert_eq!(publisher.auth_call_count(), 1);

        let post_id = publisher.publish("Test content").await.unwrap();
        assert!(post_id.starts_with("test:mock-"));

        let published = publisher.published();
        assert_eq!(published, vec!["Test content"]);
    }

    #[tokio::test]
    async fn test_mock_auth_failure() {
        let mut publisher = MockPublisher::auth_failure("test", "Invalid credentials");

        let result = publisher.authenticate().await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_mock_publish_failure() {
        let mut publisher = MockPublisher::publish_failure("test", "Network error");

        publisher.authenticate().await.unwrap();
        let result = publisher.publish("Test content").await;
        assert!(result.is_err());
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_mock_failing_for_specific_texts() {
        let mut publisher = MockPublisher::failing_for("test", vec!["bad".to_string()]);

        publisher.authenticate().await.unwrap();
        assert!(publisher.publish("good").await.is_ok());
        assert!(publisher.publish("bad").await.is_err());
        assert_eq!(publisher.published(), vec!["good"]);
    }

    #[tokio::test]
    async fn test_mock_requires_authentication() {
        let publisher = MockPublisher::success("test");

        let result = publisher.publish("Test").await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Not authenticated"));
    }
}
