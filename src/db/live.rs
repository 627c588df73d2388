//! Live subscriptions: push-based reads re-published after every write.
//!
//! Each subscription holds a [`Query`] and the sending half of a
//! `tokio::sync::watch` channel. After a committed write to a collection the
//! store re-runs every open query on that collection and replaces the
//! snapshot. Dropping the [`LiveQuery`] closes the channel; the registry
//! prunes closed subscriptions on the next publish.

use std::marker::PhantomData;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use super::{DbError, Document, Query, Stored};

struct Subscription {
    query: Query,
    tx: watch::Sender<Vec<Document>>,
}

#[derive(Default)]
pub struct LiveRegistry {
    subs: Mutex<Vec<Subscription>>,
}

impl LiveRegistry {
    pub fn register(&self, query: Query, initial: Vec<Document>) -> watch::Receiver<Vec<Document>> {
        let (tx, rx) = watch::channel(initial);
        self.subs.lock().push(Subscription { query, tx });
        rx
    }

    /// Re-run every open query on `collection` with `run` and publish results.
    pub fn publish<F>(&self, collection: &str, mut run: F)
    where
        F: FnMut(&Query) -> Result<Vec<Document>, DbError>,
    {
        let mut subs = self.subs.lock();
        subs.retain(|s| !s.tx.is_closed());
        for sub in subs.iter().filter(|s| s.query.collection == collection) {
            match run(&sub.query) {
                Ok(snapshot) => {
                    sub.tx.send_replace(snapshot);
                }
                Err(e) => log::warn!("Live query on '{}' failed: {}", collection, e),
            }
        }
    }

    /// Number of open subscriptions.
    pub fn active(&self) -> usize {
        let mut subs = self.subs.lock();
        subs.retain(|s| !s.tx.is_closed());
        subs.len()
    }
}

/// Typed handle on a live subscription.
pub struct LiveQuery<T> {
    rx: watch::Receiver<Vec<Document>>,
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> LiveQuery<T> {
    pub(crate) fn new(rx: watch::Receiver<Vec<Document>>) -> Self {
        LiveQuery {
            rx,
            _record: PhantomData,
        }
    }

    /// Decode the latest snapshot. Documents that no longer decode are
    /// skipped with a warning.
    pub fn snapshot(&self) -> Vec<Stored<T>> {
        decode_lossy(&self.rx.borrow())
    }

    /// Whether a newer snapshot is waiting to be read.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait until the snapshot changes, then return it.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Vec<Stored<T>>> {
        self.rx.changed().await.ok()?;
        Some(decode_lossy(&self.rx.borrow_and_update()))
    }
}

/// Decode documents into typed records, skipping malformed ones.
pub fn decode_lossy<T: DeserializeOwned>(docs: &[Document]) -> Vec<Stored<T>> {
    docs.iter()
        .filter_map(|doc| match Stored::from_document(doc) {
            Ok(stored) => Some(stored),
            Err(e) => {
                log::warn!(
                    "Skipping malformed document {}/{}: {}",
                    doc.collection,
                    doc.id,
                    e
                );
                None
            }
        })
        .collect()
}
