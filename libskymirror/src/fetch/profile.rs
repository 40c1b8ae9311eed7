//! HTTP profile-page fetcher
//!
//! Pulls the source profile page and extracts post text (and media refs) with
//! CSS selectors. Cookie state from previous fetches is kept in an opaque
//! session file so the source sees one continuing session across process
//! restarts.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::{FetchError, Result, SkymirrorError};
use crate::fetch::SourceFetcher;
use crate::types::Item;

/// Opaque session state persisted between fetches.
///
/// Stored as raw Set-Cookie values so the format survives whatever the
/// source decides to send; only the name=value pair is echoed back.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionState {
    cookies: Vec<String>,
}

impl SessionState {
    fn load(path: &PathBuf) -> std::result::Result<Self, FetchError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| FetchError::Session(format!("read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| FetchError::Session(format!("parse {}: {}", path.display(), e)))
    }

    fn save(&self, path: &PathBuf) -> std::result::Result<(), FetchError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| FetchError::Session(format!("create {}: {}", parent.display(), e)))?;
        }
        let content = serde_json::to_string(self)
            .map_err(|e| FetchError::Session(format!("serialize session: {}", e)))?;
        std::fs::write(path, content)
            .map_err(|e| FetchError::Session(format!("write {}: {}", path.display(), e)))
    }

    /// Header value for the outgoing Cookie header, if any cookies are held
    fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<&str> = self
            .cookies
            .iter()
            .filter_map(|c| c.split(';').next())
            .collect();
        Some(pairs.join("; "))
    }

    /// Merge Set-Cookie values from a response, replacing cookies by name
    fn absorb(&mut self, set_cookies: &[String]) {
        for incoming in set_cookies {
            let name = incoming.split('=').next().unwrap_or_default().to_string();
            self.cookies
                .retain(|c| c.split('=').next().unwrap_or_default() != name);
            self.cookies.push(incoming.clone());
        }
    }
}

pub struct ProfileFetcher {
    client: reqwest::Client,
    profile_url: String,
    batch_limit: usize,
    post_selector: Selector,
    media_selector: Option<Selector>,
    session_file: PathBuf,
}

impl ProfileFetcher {
    /// Build a fetcher from the source config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a configured CSS selector does not parse.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("skymirror/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {}", e)))?;

        let post_selector = Selector::parse(&config.post_selector).map_err(|e| {
            SkymirrorError::InvalidInput(format!(
                "invalid post selector '{}': {}",
                config.post_selector, e
            ))
        })?;

        let media_selector = match &config.media_selector {
            Some(raw) => Some(Selector::parse(raw).map_err(|e| {
                SkymirrorError::InvalidInput(format!("invalid media selector '{}': {}", raw, e))
            })?),
            None => None,
        };

        Ok(Self {
            client,
            profile_url: config.profile_url.clone(),
            batch_limit: config.batch_limit,
            post_selector,
            media_selector,
            session_file: config.expand_session_file_path()?,
        })
    }

    fn extract_items(&self, body: &str) -> std::result::Result<Vec<Item>, FetchError> {
        let document = Html::parse_document(body);

        let mut items = Vec::new();
        // Document order on the profile page is newest-first
        for element in document.select(&self.post_selector) {
            let text: String = element.text().collect::<Vec<_>>().join("");

            let media = match &self.media_selector {
                Some(selector) => element
                    .select(selector)
                    .filter_map(|m| m.value().attr("src").or_else(|| m.value().attr("href")))
                    .map(str::to_string)
                    .collect(),
                None => Vec::new(),
            };

            items.push(Item { text, media });
            if items.len() >= self.batch_limit {
                break;
            }
        }

        if items.is_empty() {
            return Err(FetchError::MissingStructure(format!(
                "no elements matched '{}' on {}",
                self.post_selector_string(),
                self.profile_url
            )));
        }

        Ok(items)
    }

    fn post_selector_string(&self) -> String {
        // Selector does not expose its source; good enough for error text
        format!("{:?}", self.post_selector)
    }
}

fn map_request_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(error.to_string())
    } else {
        FetchError::Network(error.to_string())
    }
}

#[async_trait]
impl SourceFetcher for ProfileFetcher {
    async fn fetch_latest(&mut self) -> Result<Vec<Item>> {
        let mut session = SessionState::load(&self.session_file)?;

        let mut request = self.client.get(&self.profile_url);
        if let Some(cookie) = session.cookie_header() {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await.map_err(map_request_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimit(format!(
                "{} returned 429",
                self.profile_url
            ))
            .into());
        }
        if !status.is_success() {
            return Err(FetchError::Network(format!(
                "{} returned status {}",
                self.profile_url, status
            ))
            .into());
        }

        let set_cookies: Vec<String> = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();

        let body = response.text().await.map_err(map_request_error)?;
        let items = self.extract_items(&body)?;

        debug!(
            source = %self.profile_url,
            items = items.len(),
            "Fetched profile page"
        );

        // Session is only advanced after a fully successful fetch
        session.absorb(&set_cookies);
        session.save(&self.session_file)?;

        Ok(items)
    }

    fn source(&self) -> &str {
        &self.profile_url
    }
}
