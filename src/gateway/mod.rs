//! Server side of the guestbook: validates and applies mutations against the
//! message store and keeps the read path's cache honest.
//!
//! Every call is independent. The only shared mutable state is the store
//! itself and the read cache, both internally synchronized.

pub mod admin;
pub mod cache;
pub mod error;

pub use admin::AdminGate;
pub use cache::{GUESTBOOK_PATH, ReadCache};
pub use error::GatewayError;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::{self, JoinError};

use crate::common::validation::validate_submission;
use crate::common::{Message, NewMessage};
use crate::storage::{MessageStore, StoreError};

/// Size of the recent window served on page load.
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Cheap to clone; clones share the store and the read cache.
#[derive(Clone)]
pub struct MutationGateway {
    store: Arc<dyn MessageStore>,
    admin: AdminGate,
    cache: Arc<ReadCache>,
}

impl MutationGateway {
    pub fn new(store: Arc<dyn MessageStore>, admin: AdminGate) -> Self {
        if !admin.is_enabled() {
            log::warn!("No admin key configured; deletion is disabled");
        }
        Self {
            store,
            admin,
            cache: Arc::new(ReadCache::new()),
        }
    }

    /// Most recent `limit` confirmed messages, newest first.
    ///
    /// A store failure degrades to an empty list so the page still renders.
    pub fn list_recent(&self, limit: usize) -> Vec<Message> {
        match self
            .cache
            .get_or_load(GUESTBOOK_PATH, limit, || self.store.list(limit))
        {
            Ok(messages) => Vec::clone(&messages),
            Err(err) => {
                log::error!("Failed to fetch messages: {err}");
                Vec::new()
            }
        }
    }

    /// Validates and persists a new message, returning the store-assigned id.
    ///
    /// `created_at` is taken from the server clock at acceptance; callers
    /// cannot supply it.
    pub fn create(&self, author: &str, body: &str) -> Result<String, GatewayError> {
        let (author, body) = validate_submission(author, body).inspect_err(|err| {
            log::info!("Rejected submission: {err}");
        })?;

        let record = NewMessage {
            author,
            body,
            created_at: Utc::now(),
        };

        match self.store.create(&record) {
            Ok(id) => {
                log::info!("Stored message {id} from {}", record.author);
                self.cache.revalidate(GUESTBOOK_PATH);
                Ok(id)
            }
            Err(err) => {
                log::error!("Failed to add message: {err}");
                Err(GatewayError::Submission)
            }
        }
    }

    /// Removes a message if `supplied_secret` matches the configured key.
    pub fn delete(&self, id: &str, supplied_secret: &str) -> Result<(), GatewayError> {
        if !self.admin.authorized(supplied_secret) {
            log::warn!("Rejected delete of {id}: bad admin key");
            return Err(GatewayError::Unauthorized);
        }

        match self.store.delete(id) {
            Ok(()) => {
                log::info!("Deleted message {id}");
                self.cache.revalidate(GUESTBOOK_PATH);
                Ok(())
            }
            Err(StoreError::NotFound(_)) => {
                log::warn!("Delete of {id} found nothing");
                Err(GatewayError::NotFound)
            }
            Err(err) => {
                log::error!("Failed to delete message {id}: {err}");
                Err(GatewayError::Deletion)
            }
        }
    }

    /// Fires once per successful create or delete.
    pub fn revalidations(&self) -> watch::Receiver<u64> {
        self.cache.subscribe()
    }

    pub fn revalidation_count(&self) -> u64 {
        self.cache.generation()
    }

    /// Runs `call` on tokio's blocking pool. Store calls hold a mutex and hit
    /// the disk, so async callers go through here instead of calling directly.
    pub async fn blocking<T, F>(&self, call: F) -> Result<T, JoinError>
    where
        T: Send + 'static,
        F: FnOnce(&MutationGateway) -> T + Send + 'static,
    {
        let gateway = self.clone();
        task::spawn_blocking(move || call(&gateway)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{OnceLock, Weak};

    use super::*;
    use crate::common::ValidationError;
    use crate::storage::SqliteMessageStore;

    const SECRET: &str = "let-me-in";

    /// Wraps the SQLite store and fails on demand.
    struct FlakyStore {
        inner: SqliteMessageStore,
        down: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: SqliteMessageStore::in_memory().unwrap(),
                down: AtomicBool::new(false),
            }
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("backend offline".to_string()));
            }
            Ok(())
        }
    }

    impl MessageStore for FlakyStore {
        fn create(&self, record: &NewMessage) -> Result<String, StoreError> {
            self.check()?;
            self.inner.create(record)
        }

        fn delete(&self, id: &str) -> Result<(), StoreError> {
            self.check()?;
            self.inner.delete(id)
        }

        fn list(&self, limit: usize) -> Result<Vec<Message>, StoreError> {
            self.check()?;
            self.inner.list(limit)
        }
    }

    fn gateway() -> (MutationGateway, Arc<FlakyStore>) {
        let store = Arc::new(FlakyStore::new());
        let gateway = MutationGateway::new(store.clone(), AdminGate::new(SECRET));
        (gateway, store)
    }

    #[test]
    fn create_trims_and_stamps_server_time() {
        let (gateway, _) = gateway();
        let before = Utc::now().timestamp_millis();

        let id = gateway.create("  Ana ", " Hi! ").unwrap();

        let recent = gateway.list_recent(DEFAULT_RECENT_LIMIT);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, id);
        assert_eq!(recent[0].author, "Ana");
        assert_eq!(recent[0].body, "Hi!");
        assert!(recent[0].created_at.timestamp_millis() >= before);
    }

    #[test]
    fn validation_failure_never_touches_store() {
        let (gateway, store) = gateway();
        store.down.store(true, Ordering::SeqCst);

        let err = gateway.create("Ana", &"x".repeat(141)).unwrap_err();
        assert_eq!(
            err,
            GatewayError::Validation(ValidationError::BodyTooLong { chars: 141 })
        );
        assert_eq!(gateway.revalidation_count(), 0);

        store.down.store(false, Ordering::SeqCst);
        assert_eq!(store.inner.count().unwrap(), 0);
    }

    #[test]
    fn store_failure_becomes_submission_error() {
        let (gateway, store) = gateway();
        store.down.store(true, Ordering::SeqCst);

        assert_eq!(gateway.create("Ana", "Hi!"), Err(GatewayError::Submission));
        assert_eq!(gateway.revalidation_count(), 0);
    }

    #[test]
    fn cached_read_path_is_refreshed_after_create() {
        let (gateway, _) = gateway();
        assert!(gateway.list_recent(DEFAULT_RECENT_LIMIT).is_empty());

        gateway.create("Ana", "Hi!").unwrap();
        assert_eq!(gateway.list_recent(DEFAULT_RECENT_LIMIT).len(), 1);
        assert_eq!(gateway.revalidation_count(), 1);
    }

    #[test]
    fn read_failure_degrades_to_empty() {
        let (gateway, store) = gateway();
        gateway.create("Ana", "Hi!").unwrap();
        store.down.store(true, Ordering::SeqCst);

        assert!(gateway.list_recent(DEFAULT_RECENT_LIMIT).is_empty());

        store.down.store(false, Ordering::SeqCst);
        assert_eq!(gateway.list_recent(DEFAULT_RECENT_LIMIT).len(), 1);
    }

    #[test]
    fn wrong_secret_is_unauthorized_and_keeps_record() {
        let (gateway, _) = gateway();
        let id = gateway.create("Ana", "Hi!").unwrap();

        assert_eq!(gateway.delete(&id, "guess"), Err(GatewayError::Unauthorized));
        assert_eq!(gateway.list_recent(DEFAULT_RECENT_LIMIT)[0].id, id);
        assert_eq!(gateway.revalidation_count(), 1);
    }

    #[test]
    fn store_failure_on_delete_becomes_deletion_error() {
        let (gateway, store) = gateway();
        let id = gateway.create("Ana", "Hi!").unwrap();
        store.down.store(true, Ordering::SeqCst);

        assert_eq!(gateway.delete(&id, SECRET), Err(GatewayError::Deletion));
    }

    #[test]
    fn delete_twice_is_ok_then_not_found() {
        let (gateway, _) = gateway();
        let id = gateway.create("Ana", "Hi!").unwrap();

        assert_eq!(gateway.delete(&id, SECRET), Ok(()));
        assert!(gateway.list_recent(DEFAULT_RECENT_LIMIT).is_empty());
        assert_eq!(gateway.delete(&id, SECRET), Err(GatewayError::NotFound));
    }

    /// Returns its snapshot only after another writer has committed, the way
    /// a read racing a create does under concurrent requests.
    struct RacingStore {
        inner: SqliteMessageStore,
        gateway: OnceLock<Weak<MutationGateway>>,
        raced: AtomicBool,
    }

    impl MessageStore for RacingStore {
        fn create(&self, record: &NewMessage) -> Result<String, StoreError> {
            self.inner.create(record)
        }

        fn delete(&self, id: &str) -> Result<(), StoreError> {
            self.inner.delete(id)
        }

        fn list(&self, limit: usize) -> Result<Vec<Message>, StoreError> {
            let snapshot = self.inner.list(limit)?;
            if !self.raced.swap(true, Ordering::SeqCst) {
                let gateway = self.gateway.get().and_then(Weak::upgrade).unwrap();
                gateway.create("Bob", "concurrent").unwrap();
            }
            Ok(snapshot)
        }
    }

    #[test]
    fn create_committed_during_a_read_shows_up_on_the_next_read() {
        let store = Arc::new(RacingStore {
            inner: SqliteMessageStore::in_memory().unwrap(),
            gateway: OnceLock::new(),
            raced: AtomicBool::new(false),
        });
        let gateway = Arc::new(MutationGateway::new(store.clone(), AdminGate::new(SECRET)));
        store.gateway.set(Arc::downgrade(&gateway)).unwrap();

        assert!(gateway.list_recent(DEFAULT_RECENT_LIMIT).is_empty());
        assert_eq!(store.inner.count().unwrap(), 1);

        let recent = gateway.list_recent(DEFAULT_RECENT_LIMIT);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].body, "concurrent");
    }

    #[tokio::test]
    async fn blocking_calls_run_off_the_runtime_thread() {
        let (gateway, _) = gateway();
        let caller = std::thread::current().id();

        let (worker, id) = gateway
            .blocking(|gateway| (std::thread::current().id(), gateway.create("Ana", "Hi!")))
            .await
            .unwrap();

        assert_ne!(worker, caller);
        assert_eq!(gateway.list_recent(DEFAULT_RECENT_LIMIT)[0].id, id.unwrap());
    }
}
