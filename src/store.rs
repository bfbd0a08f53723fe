//! The shared document store.
//!
//! One JSON document per `(collection, key)` pair, replaced wholesale on every
//! write. Subscribers receive the full document whenever it changes, whether
//! the write came through this store or through another connection to the
//! same workspace database.

use crate::db;
use crate::model::AppData;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};
use thiserror::Error;
use tracing::debug;

pub const APP_COLLECTION: &str = "utp-data";
pub const APP_KEY: &str = "singleton";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub collection: String,
    pub key: String,
}

impl DocumentKey {
    pub fn app_data() -> Self {
        Self {
            collection: APP_COLLECTION.to_string(),
            key: APP_KEY.to_string(),
        }
    }
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.key)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open workspace store: {0}")]
    Open(String),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("document {key} is unreadable: {reason}")]
    Unreadable { key: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    Missing,
    Present { revision: i64, value: AppData },
    /// The stored text could not be decoded as AppData.
    Unreadable { revision: i64, reason: String },
}

pub struct Subscription {
    rx: Receiver<DocumentEvent>,
}

impl Subscription {
    /// Next pending notification, if any. Never blocks.
    pub fn try_next(&self) -> Option<DocumentEvent> {
        self.rx.try_recv().ok()
    }
}

pub struct DocumentStore {
    conn: Connection,
    subscribers: Vec<(DocumentKey, Sender<DocumentEvent>)>,
    data_version: i64,
}

fn read_data_version(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("PRAGMA data_version", [], |r| r.get(0))?)
}

impl DocumentStore {
    pub fn open(workspace: &Path) -> Result<Self, StoreError> {
        let conn = db::open_db(workspace).map_err(|e| StoreError::Open(format!("{e:#}")))?;
        let data_version = read_data_version(&conn)?;
        Ok(Self {
            conn,
            subscribers: Vec::new(),
            data_version,
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Registers a subscriber. The current state of the document is queued
    /// as the first event.
    pub fn subscribe(&mut self, key: &DocumentKey) -> Result<Subscription, StoreError> {
        let (tx, rx) = channel();
        let current = self.load(key)?;
        // The receiver is alive in this scope, so the send cannot fail.
        let _ = tx.send(current);
        self.subscribers.push((key.clone(), tx));
        Ok(Subscription { rx })
    }

    /// Unconditionally overwrites the document and returns its new revision.
    pub fn replace(&mut self, key: &DocumentKey, value: &AppData) -> Result<i64, StoreError> {
        let text = serde_json::to_string(value).map_err(StoreError::Encode)?;
        let updated_at = chrono::Utc::now().to_rfc3339();
        let revision: i64 = self.conn.query_row(
            "INSERT INTO documents(collection, key, value, revision, updated_at)
             VALUES(?, ?, ?, 1, ?)
             ON CONFLICT(collection, key) DO UPDATE SET
               value = excluded.value,
               revision = documents.revision + 1,
               updated_at = excluded.updated_at
             RETURNING revision",
            (&key.collection, &key.key, &text, &updated_at),
            |r| r.get(0),
        )?;
        debug!(%key, revision, "document replaced");
        self.notify(
            key,
            DocumentEvent::Present {
                revision,
                value: value.clone(),
            },
        );
        Ok(revision)
    }

    /// Picks up commits made by other connections to the same database and
    /// pushes the fresh documents to subscribers. Returns whether anything
    /// changed.
    pub fn poll_external(&mut self) -> Result<bool, StoreError> {
        let version = read_data_version(&self.conn)?;
        if version == self.data_version {
            return Ok(false);
        }
        self.data_version = version;

        let mut keys: Vec<DocumentKey> = Vec::new();
        for (k, _) in &self.subscribers {
            if !keys.contains(k) {
                keys.push(k.clone());
            }
        }
        for key in keys {
            let event = self.load(&key)?;
            self.notify(&key, event);
        }
        Ok(true)
    }

    fn notify(&mut self, key: &DocumentKey, event: DocumentEvent) {
        // Dropped receivers unsubscribe themselves.
        self.subscribers
            .retain(|(k, tx)| k != key || tx.send(event.clone()).is_ok());
    }

    fn load(&self, key: &DocumentKey) -> Result<DocumentEvent, StoreError> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT value, revision FROM documents WHERE collection = ? AND key = ?",
                (&key.collection, &key.key),
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        let Some((text, revision)) = row else {
            return Ok(DocumentEvent::Missing);
        };
        Ok(match serde_json::from_str::<AppData>(&text) {
            Ok(value) => DocumentEvent::Present { revision, value },
            Err(e) => DocumentEvent::Unreadable {
                revision,
                reason: e.to_string(),
            },
        })
    }
}
