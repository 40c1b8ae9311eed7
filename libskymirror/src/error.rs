//! Error types for Skymirror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SkymirrorError>;

#[derive(Error, Debug)]
pub enum SkymirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Seen-log error: {0}")]
    Store(#[from] StoreError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SkymirrorError {
    /// Returns the appropriate exit code for this error
    ///
    /// Authentication failures are fatal for the whole process (nothing can
    /// be mirrored without a session) and get their own code so supervisors
    /// can tell them apart from transient runtime errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            SkymirrorError::InvalidInput(_) => 3,
            SkymirrorError::Publish(PublishError::Authentication(_)) => 2,
            SkymirrorError::Publish(_) => 1,
            SkymirrorError::Fetch(_) => 1,
            SkymirrorError::Config(_) => 1,
            SkymirrorError::Database(_) => 1,
            SkymirrorError::Store(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database operation failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors from loading or persisting the seen-log file
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seen-log: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from the source side of a tick. All of these are recoverable: the
/// tick ends early and the next timer cadence retries the fetch.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Expected page structure missing: {0}")]
    MissingStructure(String),

    #[error("Session state error: {0}")]
    Session(String),

    #[error("Rate limited by source: {0}")]
    RateLimit(String),
}

#[derive(Error, Debug, Clone)]
pub enum PublishError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = SkymirrorError::InvalidInput("Empty content".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_authentication_error() {
        let error = SkymirrorError::Publish(PublishError::Authentication(
            "Invalid app password".to_string(),
        ));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_publish_error() {
        let error = SkymirrorError::Publish(PublishError::Posting("Network timeout".to_string()));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_fetch_error() {
        let error = SkymirrorError::Fetch(FetchError::MissingStructure(
            "no post elements".to_string(),
        ));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_config_error() {
        let error = SkymirrorError::Config(ConfigError::MissingField("bluesky".to_string()));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting_fetch() {
        let error = SkymirrorError::Fetch(FetchError::Network("connection refused".to_string()));
        assert_eq!(
            format!("{}", error),
            "Fetch error: Network error: connection refused"
        );
    }

    #[test]
    fn test_error_message_formatting_authentication() {
        let error = SkymirrorError::Publish(PublishError::Authentication(
            "Invalid handle".to_string(),
        ));
        assert_eq!(
            format!("{}", error),
            "Publish error: Authentication failed: Invalid handle"
        );
    }

    #[test]
    fn test_error_conversion_from_fetch_error() {
        let fetch_error = FetchError::Timeout("30s elapsed".to_string());
        let error: SkymirrorError = fetch_error.into();
        assert!(matches!(error, SkymirrorError::Fetch(_)));
    }

    #[test]
    fn test_error_conversion_from_publish_error() {
        let publish_error = PublishError::Posting("relay refused".to_string());
        let error: SkymirrorError = publish_error.into();
        assert!(matches!(error, SkymirrorError::Publish(_)));
    }

    #[test]
    fn test_error_conversion_from_store_error() {
        let store_error = StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let error: SkymirrorError = store_error.into();
        assert!(matches!(error, SkymirrorError::Store(_)));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_fetch_error_clone() {
        let original = FetchError::Network("reset by peer".to_string());
        let cloned = original.clone();
        assert_eq!(format!("{}", original), format!("{}", cloned));
    }

    #[test]
    fn test_exit_code_consistency() {
        let auth1 = SkymirrorError::Publish(PublishError::Authentication("a".to_string()));
        let auth2 = SkymirrorError::Publish(PublishError::Authentication("b".to_string()));
        assert_eq!(auth1.exit_code(), auth2.exit_code());

        let posting = SkymirrorError::Publish(PublishError::Posting("x".to_string()));
        let network = SkymirrorError::Publish(PublishError::Network("x".to_string()));
        let rate = SkymirrorError::Publish(PublishError::RateLimit("x".to_string()));
        assert_eq!(posting.exit_code(), 1);
        assert_eq!(network.exit_code(), 1);
        assert_eq!(rate.exit_code(), 1);
    }
}
