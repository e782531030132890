//! Document store abstraction.
//!
//! A document is an untyped JSON object addressed by a collection name and a
//! key. Stores only offer whole-document reads and writes; how a write is
//! combined with an existing document is chosen per call with [`MergeMode`].
//!
//! Two implementations are provided:
//! - [`memory::InMemoryDocumentStore`] keeps documents in process memory
//! - [`postgres::SeaOrmDocumentStore`] keeps documents in a Postgres JSONB column

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;
use thiserror::Error;

pub mod memory;
pub mod postgres;

/// Top-level fields of a document.
pub type Fields = serde_json::Map<String, Value>;

/// Errors raised while reaching or writing a document store.
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying database rejected or failed the operation
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// A stored document is not a JSON object
    #[error("Document {collection}/{key} is not an object")]
    MalformedDocument { collection: String, key: String },
    /// The store is unreachable or refused the request
    #[error("Document store unavailable: {0}")]
    Unavailable(String),
}

/// How `set_document` combines new fields with an existing document.
///
/// Every mode creates the document when none exists yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// The document becomes exactly the given fields.
    Replace,
    /// Given fields overwrite existing ones; array values are unioned into
    /// the existing array instead of replacing it.
    MergeArrayUnion,
    /// Given fields overwrite existing ones; other fields are kept.
    MergeFields,
}

/// Capability to read and write whole documents.
#[automock]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches a document, `None` when it does not exist.
    async fn get_document(&self, collection: &str, key: &str) -> Result<Option<Fields>, Error>;

    /// Writes `fields` into a document according to `mode`.
    async fn set_document(
        &self,
        collection: &str,
        key: &str,
        fields: Fields,
        mode: MergeMode,
    ) -> Result<(), Error>;
}

/// Combines `incoming` with an optional `existing` document.
///
/// Store implementations call this while holding whatever lock makes a single
/// write atomic.
pub fn merge(existing: Option<Fields>, incoming: Fields, mode: MergeMode) -> Fields {
    let mut merged = match mode {
        MergeMode::Replace => return incoming,
        MergeMode::MergeFields | MergeMode::MergeArrayUnion => existing.unwrap_or_default(),
    };

    for (field, value) in incoming {
        match (mode, value) {
            (MergeMode::MergeArrayUnion, Value::Array(additions)) => {
                let mut current = match merged.remove(&field) {
                    Some(Value::Array(current)) => current,
                    _ => Vec::new(),
                };
                for element in additions {
                    if !current.contains(&element) {
                        current.push(element);
                    }
                }
                merged.insert(field, Value::Array(current));
            }
            (_, value) => {
                merged.insert(field, value);
            }
        }
    }
    merged
}
