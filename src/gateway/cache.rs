use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::common::Message;

/// Read path served to visitors; the only path the gateway revalidates.
pub const GUESTBOOK_PATH: &str = "/guestbook";

struct CachedPage {
    limit: usize,
    messages: Arc<Vec<Message>>,
}

/// Path-scoped cache of read-path snapshots.
///
/// `revalidate` drops a single path and bumps a generation counter that
/// anyone may watch. There is no TTL: a snapshot lives until revalidated.
pub struct ReadCache {
    pages: Mutex<HashMap<String, CachedPage>>,
    generation: watch::Sender<u64>,
}

impl ReadCache {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            pages: Mutex::new(HashMap::new()),
            generation,
        }
    }

    /// Returns the cached snapshot for `path`, or runs `load` and caches its
    /// result. Loader errors are passed through and nothing is cached.
    pub fn get_or_load<E>(
        &self,
        path: &str,
        limit: usize,
        load: impl FnOnce() -> Result<Vec<Message>, E>,
    ) -> Result<Arc<Vec<Message>>, E> {
        if let Some(messages) = self.cached(path, limit) {
            log::debug!("Serving {path} from cache ({} messages)", messages.len());
            return Ok(messages);
        }

        let started_at = self.generation();
        let messages = Arc::new(load()?);
        if let Ok(mut pages) = self.pages.lock() {
            // A revalidation that landed while `load` ran means the snapshot
            // may predate a committed mutation; serve it once but keep it out.
            if self.generation() == started_at {
                pages.insert(
                    path.to_string(),
                    CachedPage {
                        limit,
                        messages: Arc::clone(&messages),
                    },
                );
            } else {
                log::debug!("Not caching {path}: revalidated during load");
            }
        }
        Ok(messages)
    }

    fn cached(&self, path: &str, limit: usize) -> Option<Arc<Vec<Message>>> {
        let pages = self.pages.lock().ok()?;
        pages
            .get(path)
            .filter(|page| page.limit == limit)
            .map(|page| Arc::clone(&page.messages))
    }

    /// Marks `path` stale so the next read recomputes it from the store.
    pub fn revalidate(&self, path: &str) {
        // The bump happens under the page lock so a concurrent insert either
        // sees the new generation or is removed here.
        let mut pages = self.pages.lock().ok();
        if let Some(pages) = pages.as_mut() {
            pages.remove(path);
        }
        self.generation.send_modify(|generation| *generation += 1);
        drop(pages);
        log::info!("Revalidated {path}");
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }
}

impl Default for ReadCache {
    fn default() -> Self {
        Self::new()
    }
}
