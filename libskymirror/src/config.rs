//! Configuration management for Skymirror

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mirror: MirrorConfig,
    pub source: Option<SourceConfig>,
    pub bluesky: Option<BlueskyConfig>,
    pub database: Option<DatabaseConfig>,
}

/// Settings for the mirror loop itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Seconds between polls of the source profile
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Maximum number of identifiers retained in the seen-log
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Path of the persisted seen-log file
    #[serde(default = "default_seen_log")]
    pub seen_log: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            capacity: default_capacity(),
            seen_log: default_seen_log(),
        }
    }
}

fn default_interval() -> u64 {
    300
}

fn default_capacity() -> usize {
    5
}

fn default_seen_log() -> String {
    "~/.local/share/skymirror/seen.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Profile page to scrape for new posts
    pub profile_url: String,
    /// How many of the newest posts to consider per tick
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,
    /// CSS selector matching one post's text on the profile page
    #[serde(default = "default_post_selector")]
    pub post_selector: String,
    /// CSS selector matching media inside one post element, relative to the page
    #[serde(default)]
    pub media_selector: Option<String>,
    /// Opaque session/cookie state, persisted across fetches
    #[serde(default = "default_session_file")]
    pub session_file: String,
}

fn default_batch_limit() -> usize {
    3
}

fn default_post_selector() -> String {
    r#"div[data-testid="postText"]"#.to_string()
}

fn default_session_file() -> String {
    "~/.local/share/skymirror/session.json".to_string()
}

impl SourceConfig {
    pub fn expand_session_file_path(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(
            shellexpand::tilde(&self.session_file).to_string(),
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueskyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// PDS endpoint
    #[serde(default = "default_service")]
    pub service: String,
    /// Account handle (e.g. "mirror.bsky.social")
    pub handle: String,
    /// File holding the app password, one line
    pub password_file: String,
}

fn default_true() -> bool {
    true
}

fn default_service() -> String {
    "https://bsky.social".to_string()
}

impl BlueskyConfig {
    pub fn expand_password_file_path(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(
            shellexpand::tilde(&self.password_file).to_string(),
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            mirror: MirrorConfig::default(),
            source: Some(SourceConfig {
                profile_url: "https://bsky.app/profile/example.bsky.social".to_string(),
                batch_limit: default_batch_limit(),
                post_selector: default_post_selector(),
                media_selector: None,
                session_file: default_session_file(),
            }),
            bluesky: Some(BlueskyConfig {
                enabled: true,
                service: default_service(),
                handle: "mirror.bsky.social".to_string(),
                password_file: "~/.config/skymirror/bluesky.password".to_string(),
            }),
            database: Some(DatabaseConfig {
                path: "~/.local/share/skymirror/mirror.db".to_string(),
            }),
        }
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("SKYMIRROR_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("skymirror").join("config.toml"))
}

/// Resolve the data directory path following XDG Base Directory spec
pub fn resolve_data_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("skymirror"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parses_with_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.mirror.interval, 300);
        assert_eq!(config.mirror.capacity, 5);
        assert!(config.source.is_none());
        assert!(config.bluesky.is_none());
        assert!(config.database.is_none());
    }

    #[test]
    fn test_full_config_parses() {
        let content = r#"
[mirror]
interval = 60
capacity = 8
seen_log = "/tmp/seen.json"

[source]
profile_url = "https://bsky.app/profile/alice.example"
batch_limit = 2

[bluesky]
handle = "mirror.example"
password_file = "/tmp/pw"

[database]
path = "/tmp/mirror.db"
"#;
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config.mirror.interval, 60);
        assert_eq!(config.mirror.capacity, 8);

        let source = config.source.unwrap();
        assert_eq!(source.batch_limit, 2);
        assert_eq!(source.post_selector, r#"div[data-testid="postText"]"#);

        let bluesky = config.bluesky.unwrap();
        assert!(bluesky.enabled);
        assert_eq!(bluesky.service, "https://bsky.social");
        assert_eq!(bluesky.handle, "mirror.example");
    }

    #[test]
    fn test_default_config_roundtrips() {
        let config = Config::default_config();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.mirror.capacity, config.mirror.capacity);
        assert_eq!(
            parsed.source.unwrap().profile_url,
            config.source.unwrap().profile_url
        );
    }

    #[test]
    fn test_load_from_missing_path_is_read_error() {
        let path = PathBuf::from("/nonexistent/skymirror/config.toml");
        let result = Config::load_from_path(&path);
        assert!(matches!(
            result,
            Err(crate::SkymirrorError::Config(ConfigError::ReadError(_)))
        ));
    }
}
