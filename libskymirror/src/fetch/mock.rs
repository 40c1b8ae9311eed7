//! Scripted source fetcher for testing
//!
//! Plays back a fixed sequence of fetch outcomes, one per tick, so tests can
//! drive the mirror loop through new-item, repeat, and failure scenarios
//! without a network or a real profile page.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{FetchError, Result};
use crate::fetch::SourceFetcher;
use crate::types::Item;

/// One scripted fetch outcome
#[derive(Debug, Clone)]
pub enum FetchScript {
    Items(Vec<Item>),
    Fail(FetchError),
}

pub struct ScriptedFetcher {
    source: String,
    script: Arc<Mutex<VecDeque<FetchScript>>>,
    fetch_count: Arc<Mutex<usize>>,
}

impl ScriptedFetcher {
    pub fn new(source: &str, script: Vec<FetchScript>) -> Self {
        Self {
            source: source.to_string(),
            script: Arc::new(Mutex::new(script.into())),
            fetch_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Convenience: a fetcher that always returns the same batch
    pub fn repeating(source: &str, items: Vec<Item>) -> Self {
        // The final script entry repeats forever, so one entry is enough
        Self::new(source, vec![FetchScript::Items(items)])
    }

    /// Number of times `fetch_latest` has been called
    pub fn fetch_count(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }

    /// Handle onto the call counter, usable after the fetcher is boxed
    pub fn fetch_count_handle(&self) -> Arc<Mutex<usize>> {
        self.fetch_count.clone()
    }
}

#[async_trait]
impl SourceFetcher for ScriptedFetcher {
    async fn fetch_latest(&mut self) -> Result<Vec<Item>> {
        *self.fetch_count.lock().unwrap() += 1;

        let mut script = self.script.lock().unwrap();
        // Pop until one entry remains; the last one repeats on every
        // subsequent call
        let entry = if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script
                .front()
                .cloned()
                .unwrap_or(FetchScript::Items(Vec::new()))
        };

        match entry {
            FetchScript::Items(items) => Ok(items),
            FetchScript::Fail(error) => Err(error.into()),
        }
    }

    fn source(&self) -> &str {
        &self.source
    }
}
