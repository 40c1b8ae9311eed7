//! Bluesky publisher

use async_trait::async_trait;
use bsky_sdk::BskyAgent;

use crate::error::{PublishError, Result};
use crate::publish::Publisher;

/// Map Bluesky/AT Protocol errors to PublishError
///
/// bsky-sdk surfaces XRPC status codes and AT Protocol error codes inside
/// the error text, so classification goes by message content.
fn map_bluesky_error<E: std::fmt::Display + std::fmt::Debug>(
    error: E,
    context: &str,
) -> PublishError {
    let error_msg = format!("{}", error);
    let debug_msg = format!("{:?}", error);

    if error_msg.contains("401")
        || error_msg.contains("403")
        || error_msg.contains("AuthenticationRequired")
        || error_msg.contains("InvalidToken")
        || error_msg.contains("ExpiredToken")
        || error_msg.contains("InvalidCredentials")
        || error_msg.contains("AccountNotFound")
        || debug_msg.contains("Unauthorized")
        || debug_msg.contains("Forbidden")
    {
        return PublishError::Authentication(format!(
            "Bluesky authentication failed during {}: {}. Check your handle and app password.",
            context, error_msg
        ));
    }

    if error_msg.contains("429")
        || error_msg.contains("RateLimitExceeded")
        || error_msg.contains("TooManyRequests")
        || debug_msg.contains("RateLimit")
    {
        return PublishError::RateLimit(format!(
            "Bluesky rate limit exceeded during {}: {}",
            context, error_msg
        ));
    }

    if error_msg.contains("connection")
        || error_msg.contains("network")
        || error_msg.contains("timeout")
        || error_msg.contains("unreachable")
        || error_msg.contains("dns")
        || debug_msg.contains("Connect")
        || debug_msg.contains("Timeout")
    {
        return PublishError::Network(format!(
            "Network error reaching the Bluesky PDS during {}: {}",
            context, error_msg
        ));
    }

    PublishError::Posting(format!(
        "Bluesky operation failed during {}: {}",
        context, error_msg
    ))
}

pub struct BlueskyPublisher {
    agent: BskyAgent,
    service: String,
    handle: String,
    app_password: String,
    authenticated: bool,
}

impl BlueskyPublisher {
    /// Create a new Bluesky publisher.
    ///
    /// # Arguments
    ///
    /// * `service` - PDS endpoint (e.g. "https://bsky.social")
    /// * `handle` - Account handle (e.g. "mirror.bsky.social")
    /// * `app_password` - App password for the account
    pub async fn new(service: String, handle: String, app_password: String) -> Result<Self> {
        let agent = BskyAgent::builder()
            .build()
            .await
            .map_err(|e| PublishError::Authentication(format!("Failed to create agent: {}", e)))?;

        Ok(Self {
            agent,
            service,
            handle,
            app_password,
            authenticated: false,
        })
    }

    async fn create_session(&mut self) -> Result<()> {
        tracing::debug!(service = %self.service, handle = %self.handle, "Creating Bluesky session");

        self.agent
            .login(&self.handle, &self.app_password)
            .await
            .map_err(|e| map_bluesky_error(e, "authentication"))?;

        self.authenticated = true;
        tracing::debug!("Bluesky session created");

        Ok(())
    }
}

#[async_trait]
impl Publisher for BlueskyPublisher {
    async fn authenticate(&mut self) -> Result<()> {
        self.create_session().await
    }

    async fn publish(&self, text: &str) -> Result<String> {
        use bsky_sdk::api::app::bsky::feed::post::RecordData;
        use bsky_sdk::api::types::string::Datetime;

        if !self.authenticated {
            return Err(PublishError::Authentication("Not authenticated".to_string()).into());
        }

        tracing::debug!("Publishing to Bluesky: {} characters", text.len());

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

        let response = self
            .agent
            .create_record(record)
            .await
            .map_err(|e| map_bluesky_error(e, "publishing"))?;

        let at_uri = response.uri.to_string();
        tracing::debug!("Published to Bluesky: {}", at_uri);

        Ok(at_uri)
    }

    fn name(&self) -> &str {
        "bluesky"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(300)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping_authentication_401() {
        let result = map_bluesky_error("401 Unauthorized", "publishing");
        match result {
            PublishError::Authentication(msg) => {
                assert!(msg.contains("authentication failed"));
                assert!(msg.contains("publishing"));
            }
            _ => panic!("Expected Authentication error"),
        }
    }

    #[test]
    fn test_error_mapping_invalid_credentials() {
        let result = map_bluesky_error(
            "InvalidCredentials: the provided credentials are invalid",
            "authentication",
        );
        assert!(matches!(result, PublishError::Authentication(_)));
    }

    #[test]
    fn test_error_mapping_rate_limit() {
        let result = map_bluesky_error("429 Too Many Requests: RateLimitExceeded", "publishing");
        match result {
            PublishError::RateLimit(msg) => assert!(msg.contains("rate limit")),
            _ => panic!("Expected RateLimit error"),
        }
    }

    #[test]
    fn test_error_mapping_network() {
        let result = map_bluesky_error("connection refused: failed to reach PDS", "publishing");
        match result {
            PublishError::Network(msg) => {
                assert!(msg.contains("Network error"));
                assert!(msg.contains("publishing"));
            }
            _ => panic!("Expected Network error"),
        }
    }

    #[test]
    fn test_error_mapping_generic_posting_error() {
        let result = map_bluesky_error("something unexpected happened", "publishing");
        match result {
            PublishError::Posting(msg) => {
                assert!(msg.contains("operation failed"));
                assert!(msg.contains("something unexpected"));
            }
            _ => panic!("Expected Posting error"),
        }
    }

    #[tokio::test]
    async fn test_publish_without_authentication() {
        let publisher = BlueskyPublisher {
            agent: BskyAgent::builder().build().await.unwrap(),
            service: "https://bsky.social".to_string(),
            handle: "test.bsky.social".to_string(),
            app_password: "test".to_string(),
            authenticated: false,
        };

        let result = publisher.publish("Test content").await;
        match result {
            Err(crate::SkymirrorError::Publish(PublishError::Authentication(msg))) => {
                assert_eq!(msg, "Not authenticated");
            }
            _ => panic!("Expected authentication error"),
        }
    }

    #[tokio::test]
    async fn test_name_and_limit() {
        let publisher = BlueskyPublisher {
            agent: BskyAgent::builder().build().await.unwrap(),
            service: "https://bsky.social".to_string(),
            handle: "test.bsky.social".to_string(),
            app_password: "test".to_string(),
            authenticated: false,
        };

        assert_eq!(publisher.name(), "bluesky");
        assert_eq!(publisher.character_limit(), Some(300));
    }
}
