//! The daemon's mirror of the shared document.
//!
//! `LiveDocument` holds the latest snapshot the store has pushed. Mutations
//! never touch the mirror directly: they hand a complete next snapshot to the
//! store and the mirror catches up from the resulting notification.
//! Concurrent writers are not serialized; the last replace wins.

use crate::model::AppData;
use crate::seed;
use crate::store::{DocumentEvent, DocumentKey, DocumentStore, StoreError, Subscription};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub struct LiveDocument {
    store: DocumentStore,
    key: DocumentKey,
    subscription: Subscription,
    latest: Arc<AppData>,
    revision: i64,
}

pub struct Opened {
    pub live: LiveDocument,
    pub seeded: bool,
}

impl LiveDocument {
    /// Opens the workspace store, subscribes to the shared document and
    /// seeds it when it does not exist yet.
    pub fn open(workspace: &Path) -> Result<Opened, StoreError> {
        let mut store = DocumentStore::open(workspace)?;
        let key = DocumentKey::app_data();
        let subscription = store.subscribe(&key)?;

        let first = subscription.try_next().ok_or_else(|| StoreError::Unreadable {
            key: key.to_string(),
            reason: "no initial snapshot".to_string(),
        })?;
        let (latest, revision, seeded) = match first {
            DocumentEvent::Present { revision, value } => (value, revision, false),
            DocumentEvent::Missing => {
                info!(%key, "document not found, seeding initial dataset");
                let data = seed::initial_data();
                let revision = store.replace(&key, &data)?;
                (data, revision, true)
            }
            DocumentEvent::Unreadable { reason, .. } => {
                return Err(StoreError::Unreadable {
                    key: key.to_string(),
                    reason,
                })
            }
        };

        let mut live = LiveDocument {
            store,
            key,
            subscription,
            latest: Arc::new(latest),
            revision,
        };
        live.refresh();
        Ok(Opened { live, seeded })
    }

    /// The current snapshot. Callers should not hold on to it across a
    /// `refresh` or `commit`.
    pub fn snapshot(&self) -> Arc<AppData> {
        Arc::clone(&self.latest)
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    pub fn conn(&self) -> &Connection {
        self.store.conn()
    }

    /// Adopts every pending notification, including commits by other
    /// processes sharing the workspace.
    pub fn refresh(&mut self) {
        if let Err(e) = self.store.poll_external() {
            warn!(error = %e, "failed to poll for external changes");
        }
        while let Some(event) = self.subscription.try_next() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: DocumentEvent) {
        match event {
            DocumentEvent::Present { revision, value } => {
                self.latest = Arc::new(value);
                self.revision = revision;
            }
            DocumentEvent::Missing => {
                warn!(key = %self.key, "document disappeared, keeping cached snapshot");
            }
            DocumentEvent::Unreadable { revision, reason } => {
                warn!(key = %self.key, revision, %reason, "ignoring unreadable document");
            }
        }
    }

    /// Asks the store to adopt `next` as the whole document. On failure the
    /// mirror is left exactly as it was.
    pub fn commit(&mut self, next: AppData) -> Result<i64, StoreError> {
        let revision = self.store.replace(&self.key, &next)?;
        self.refresh();
        info!(revision, "snapshot committed");
        Ok(revision)
    }
}
