use crate::document::{DocumentStore, Error, Fields, MergeMode, merge};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Document store kept in process memory.
///
/// Each `set_document` runs under the write lock, so a single write is atomic
/// with respect to every other read and write.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<(String, String), Fields>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_document(&self, collection: &str, key: &str) -> Result<Option<Fields>, Error> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(&(collection.to_owned(), key.to_owned()))
            .cloned())
    }

    async fn set_document(
        &self,
        collection: &str,
        key: &str,
        fields: Fields,
        mode: MergeMode,
    ) -> Result<(), Error> {
        let mut documents = self.documents.write().await;
        let address = (collection.to_owned(), key.to_owned());
        let existing = documents.remove(&address);
        documents.insert(address, merge(existing, fields, mode));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn missing_document_reads_as_none() {
        let store = InMemoryDocumentStore::new();

        let document = store.get_document("users", "42").await.unwrap();

        assert!(document.is_none());
    }

    #[tokio::test]
    async fn set_then_get_returns_written_fields() {
        // Arrange
        let store = InMemoryDocumentStore::new();

        // Act
        store
            .set_document(
                "users",
                "42",
                fields(json!({"username": "alice"})),
                MergeMode::Replace,
            )
            .await
            .unwrap();
        let document = store.get_document("users", "42").await.unwrap();

        // Assert
        assert_eq!(document, Some(fields(json!({"username": "alice"}))));
    }

    #[tokio::test]
    async fn collections_do_not_share_keys() {
        let store = InMemoryDocumentStore::new();
        store
            .set_document("users", "42", fields(json!({"a": 1})), MergeMode::Replace)
            .await
            .unwrap();

        let other = store.get_document("archive", "42").await.unwrap();

        assert!(other.is_none());
    }

    #[tokio::test]
    async fn concurrent_array_unions_keep_every_element() {
        // Arrange
        let store = std::sync::Arc::new(InMemoryDocumentStore::new());

        // Act
        let writes = (0..20).map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .set_document(
                        "users",
                        "42",
                        fields(json!({"tasks": [i]})),
                        MergeMode::MergeArrayUnion,
                    )
                    .await
            })
        });
        for write in writes.collect::<Vec<_>>() {
            write.await.unwrap().unwrap();
        }

        // Assert
        let document = store.get_document("users", "42").await.unwrap().unwrap();
        assert_eq!(document["tasks"].as_array().unwrap().len(), 20);
    }
}
