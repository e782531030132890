use crate::document::{DocumentStore, Error, Fields, MergeMode, merge};
use crate::entities::document;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use serde_json::Value;
use std::sync::Arc;

/// Document store backed by the `documents` table.
///
/// Writes run in a transaction that locks the document row, so a single
/// `set_document` call is atomic against concurrent writers of the same key.
#[derive(Clone, Debug)]
pub struct SeaOrmDocumentStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmDocumentStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn into_fields(model: document::Model) -> Result<Fields, Error> {
    match model.fields {
        Value::Object(fields) => Ok(fields),
        _ => Err(Error::MalformedDocument {
            collection: model.collection,
            key: model.key,
        }),
    }
}

#[async_trait]
impl DocumentStore for SeaOrmDocumentStore {
    #[tracing::instrument(skip(self))]
    async fn get_document(&self, collection: &str, key: &str) -> Result<Option<Fields>, Error> {
        document::Entity::find_by_id((collection.to_owned(), key.to_owned()))
            .one(self.db.as_ref())
            .await?
            .map(into_fields)
            .transpose()
    }

    #[tracing::instrument(skip(self, fields))]
    async fn set_document(
        &self,
        collection: &str,
        key: &str,
        fields: Fields,
        mode: MergeMode,
    ) -> Result<(), Error> {
        let txn = self.db.begin().await?;

        // Make sure a row exists so the following select can lock it.
        let placeholder = document::ActiveModel {
            collection: ActiveValue::Set(collection.to_owned()),
            key: ActiveValue::Set(key.to_owned()),
            fields: ActiveValue::Set(Value::Object(Fields::new())),
            updated_at: ActiveValue::Set(chrono::Utc::now().fixed_offset()),
        };
        document::Entity::insert(placeholder)
            .on_conflict(
                OnConflict::columns([document::Column::Collection, document::Column::Key])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        let current = document::Entity::find_by_id((collection.to_owned(), key.to_owned()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| Error::Unavailable(format!("{collection}/{key} vanished mid-write")))?;

        let merged = merge(Some(into_fields(current.clone())?), fields, mode);

        let mut active_model: document::ActiveModel = current.into();
        active_model.fields = ActiveValue::Set(Value::Object(merged));
        active_model.updated_at = ActiveValue::Set(chrono::Utc::now().fixed_offset());
        active_model.update(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}
