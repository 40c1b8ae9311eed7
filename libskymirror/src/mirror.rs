//! Mirror loop controller
//!
//! Drives periodic fetch -> diff -> publish cycles and is the single
//! authority on "has this item already been published". One tick runs to
//! completion before the next is considered; the seen-log is owned
//! exclusively by the controller, which is what makes it safe to mutate
//! without locking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::fetch::SourceFetcher;
use crate::identifier::identifier;
use crate::publish::Publisher;
use crate::seen_log::{SeenLog, SeenLogStore};
use crate::types::MirrorRecord;

pub struct MirrorLoop {
    fetcher: Box<dyn SourceFetcher>,
    publisher: Box<dyn Publisher>,
    seen: SeenLog,
    store: SeenLogStore,
    db: Option<Database>,
    authenticated: bool,
}

impl MirrorLoop {
    /// Build a controller from injected collaborators.
    ///
    /// The seen-log is loaded from the store once, here; absent storage
    /// starts an empty log.
    pub fn new(
        fetcher: Box<dyn SourceFetcher>,
        publisher: Box<dyn Publisher>,
        store: SeenLogStore,
        capacity: usize,
        db: Option<Database>,
    ) -> Result<Self> {
        let seen = store.load(capacity)?;
        if !seen.is_empty() {
            info!(
                entries = seen.len(),
                capacity,
                "Loaded seen-log from {}",
                store.path().display()
            );
        }

        Ok(Self {
            fetcher,
            publisher,
            seen,
            store,
            db,
            authenticated: false,
        })
    }

    /// The current seen-log contents, oldest first
    pub fn seen_identifiers(&self) -> Vec<String> {
        self.seen.entries()
    }

    /// Run the mirror until the shutdown flag is set.
    ///
    /// Authenticates once up front; an authentication failure is returned to
    /// the caller and treated as fatal, since nothing can be published
    /// without a session. After that, ticks never return errors: fetch and
    /// publish failures are logged and retried on a later cadence.
    pub async fn start(&mut self, interval: Duration, shutdown: Arc<AtomicBool>) -> Result<()> {
        self.ensure_authenticated().await?;

        info!(
            source = %self.fetcher.source(),
            platform = %self.publisher.name(),
            interval_secs = interval.as_secs(),
            capacity = self.seen.capacity(),
            "Mirror loop starting"
        );

        loop {
            if shutdown.load(Ordering::Relaxed) {
                info!("Shutdown requested, stopping mirror loop");
                break;
            }

            self.tick().await;

            // Sleep until the next tick, checking for shutdown every second.
            // Because the sleep starts after the tick completes, two ticks
            // can never overlap; a tick that overruns the interval just
            // delays the next one.
            let mut remaining = interval;
            while !remaining.is_zero() {
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
                let step = remaining.min(Duration::from_secs(1));
                sleep(step).await;
                remaining = remaining.saturating_sub(step);
            }
        }

        Ok(())
    }

    /// Authenticate and run a single tick (for `--once` mode and tests).
    ///
    /// Returns the number of items published.
    pub async fn run_once(&mut self) -> Result<usize> {
        self.ensure_authenticated().await?;
        Ok(self.tick().await)
    }

    async fn ensure_authenticated(&mut self) -> Result<()> {
        if self.authenticated {
            return Ok(());
        }
        self.publisher.authenticate().await?;
        self.authenticated = true;
        info!(platform = %self.publisher.name(), "Publisher authenticated");
        Ok(())
    }

    /// One fetch -> diff -> publish cycle.
    ///
    /// Fetch failure ends the tick with the seen-log untouched. Per-item
    /// publish failure withholds that item's identifier (so a later tick
    /// retries it if it is still in the fetch window) and continues with the
    /// remaining items.
    async fn tick(&mut self) -> usize {
        let items = match self.fetcher.fetch_latest().await {
            Ok(items) => items,
            Err(e) => {
                warn!("Fetch failed, will retry next tick: {}", e);
                return 0;
            }
        };

        debug!(fetched = items.len(), "Tick fetched candidate batch");

        let mut published = 0;

        // The batch arrives newest-first; walking it in reverse publishes
        // unseen items in the order they originally appeared at the source.
        for item in items.iter().rev() {
            let id = identifier(&item.text);

            // Checked against the live log, not a start-of-tick snapshot:
            // duplicate-text items within one batch collapse to a single
            // publish.
            if self.seen.contains(&id) {
                debug!(identifier = %id, "Already mirrored, skipping");
                continue;
            }

            let rendered = item.render();
            match self.publisher.publish(&rendered).await {
                Ok(post_id) => {
                    info!(
                        platform = %self.publisher.name(),
                        post_id = %post_id,
                        identifier = %id,
                        "Mirrored new item"
                    );
                    published += 1;

                    self.seen.insert(id.clone());
                    if let Err(e) = self.store.save(&self.seen) {
                        warn!("Failed to persist seen-log: {}", e);
                    }

                    self.record_history(&id, &rendered, post_id).await;
                }
                Err(e) => {
                    warn!(
                        identifier = %id,
                        "Publish failed, item stays unseen for retry: {}",
                        e
                    );
                }
            }
        }

        if published > 0 {
            info!(published, "Tick complete");
        } else {
            debug!("Tick complete, nothing new");
        }

        published
    }

    async fn record_history(&self, id: &str, content: &str, post_id: String) {
        let Some(db) = &self.db else {
            return;
        };

        let record = MirrorRecord {
            id: None,
            identifier: id.to_string(),
            content: content.to_string(),
            source: self.fetcher.source().to_string(),
            platform: self.publisher.name().to_string(),
            platform_post_id: Some(post_id),
            published_at: chrono::Utc::now().timestamp(),
        };

        if let Err(e) = db.record_mirror(&record).await {
            warn!("Failed to record mirror history: {}", e);
        }
    }
}
