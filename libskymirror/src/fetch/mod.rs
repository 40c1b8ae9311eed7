//! Source abstraction and implementations
//!
//! The mirror loop never talks to the external site directly; it goes through
//! the `SourceFetcher` trait. The real implementation scrapes a profile page
//! over HTTP, the scripted one feeds canned batches to tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Item;

pub mod profile;

// Scripted fetcher is available for all builds (not just tests) to support
// integration tests
pub mod mock;

/// A source of candidate items for mirroring.
///
/// `fetch_latest` returns a bounded batch of the newest items, newest-first.
/// Implementations own their session state (cookies etc.): it is loaded
/// before each fetch, written back after each successful fetch, and must
/// tolerate being entirely absent on first run.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch the newest items from the source, newest-first.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the source is unreachable, the request times
    /// out, or the expected page structure is missing. A failed fetch leaves
    /// the session state untouched.
    async fn fetch_latest(&mut self) -> Result<Vec<Item>>;

    /// Identifier of the external profile being polled (for logs and history)
    fn source(&self) -> &str;
}
