//! Task reads and writes against the per-user document.
//!
//! Every user owns one document in the [`USERS_COLLECTION`] collection. Its
//! `tasks` field is an unordered array of task records. Stores offer no way to
//! address a single array element, so every mutation is a whole-document
//! read-modify-write:
//!
//! - adding a task unions a one-element array into `tasks`, which never drops
//!   tasks written concurrently
//! - marking a task done reads the whole array, flips one flag and writes the
//!   whole array back; two overlapping calls for the same user can lose one
//!   of the updates (last writer wins)

use crate::clock::{self, Clock};
use crate::document::{self, DocumentStore, Fields, MergeMode};
use crate::task::Task;
use async_trait::async_trait;
use chrono::Utc;
use mockall::automock;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const USERS_COLLECTION: &str = "users";
const TASKS_FIELD: &str = "tasks";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Document store failure")]
    Store(#[from] document::Error),
    #[error("Cannot encode task")]
    Encode(#[from] serde_json::Error),
}

#[automock]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Creates the user's document if it does not exist yet. Best effort: failures are only logged.
    async fn ensure_user_exists(&self, user_id: &str, username: &str);
    /// Appends `task` to the user's tasks without touching existing ones.
    async fn add_task(&self, user_id: &str, task: Task) -> Result<(), Error>;
    /// Marks the task with `task_id` done. Unknown identifiers are a silent no-op.
    async fn mark_task_done(&self, user_id: &str, task_id: &str) -> Result<(), Error>;
    /// Tasks dated today, in stored order.
    async fn get_today_tasks(&self, user_id: &str) -> Result<Vec<Task>, Error>;
    /// Every task of the user, in stored order.
    async fn get_all_tasks(&self, user_id: &str) -> Result<Vec<Task>, Error>;
    /// Tasks whose date is literally `date`, in stored order.
    async fn get_tasks_by_date(&self, user_id: &str, date: &str) -> Result<Vec<Task>, Error>;
}

/// [`TaskStore`] over any [`DocumentStore`]. Holds no mutable state of its own.
#[derive(Clone)]
pub struct TaskStoreImpl {
    documents: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl TaskStoreImpl {
    pub fn new(documents: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { documents, clock }
    }

    async fn read_records(&self, user_id: &str) -> Result<Vec<Value>, Error> {
        let document = self
            .documents
            .get_document(USERS_COLLECTION, user_id)
            .await?;
        Ok(document.map(take_records).unwrap_or_default())
    }

    async fn read_tasks(&self, user_id: &str) -> Result<Vec<Task>, Error> {
        let records = self.read_records(user_id).await?;
        Ok(decode_records(user_id, &records))
    }
}

fn take_records(mut document: Fields) -> Vec<Value> {
    match document.remove(TASKS_FIELD) {
        Some(Value::Array(records)) => records,
        _ => Vec::new(),
    }
}

/// Decodes stored records, skipping the ones that are not valid tasks.
fn decode_records(user_id: &str, records: &[Value]) -> Vec<Task> {
    records
        .iter()
        .enumerate()
        .filter_map(|(position, record)| match Task::decode(record) {
            Ok(task) => Some(task),
            Err(e) => {
                warn!(user_id, position, "Skipping malformed task record: {e}");
                None
            }
        })
        .collect()
}

#[async_trait]
impl TaskStore for TaskStoreImpl {
    #[tracing::instrument(skip(self))]
    async fn ensure_user_exists(&self, user_id: &str, username: &str) {
        match self
            .documents
            .get_document(USERS_COLLECTION, user_id)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                let mut fields = Fields::new();
                fields.insert("username".into(), json!(username));
                fields.insert("created".into(), json!(self.clock.now().with_timezone(&Utc)));
                // A concurrent add may have created the document since the lookup.
                if let Err(e) = self
                    .documents
                    .set_document(USERS_COLLECTION, user_id, fields, MergeMode::MergeFields)
                    .await
                {
                    warn!("Failed to create user {user_id}: {e}");
                }
            }
            Err(e) => warn!("Failed to look up user {user_id}: {e}"),
        }
    }

    #[tracing::instrument(skip(self, task), fields(task_id = %task.id))]
    async fn add_task(&self, user_id: &str, task: Task) -> Result<(), Error> {
        let mut fields = Fields::new();
        fields.insert(TASKS_FIELD.into(), Value::Array(vec![task.encode()?]));
        self.documents
            .set_document(USERS_COLLECTION, user_id, fields, MergeMode::MergeArrayUnion)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn mark_task_done(&self, user_id: &str, task_id: &str) -> Result<(), Error> {
        let Some(document) = self
            .documents
            .get_document(USERS_COLLECTION, user_id)
            .await?
        else {
            debug!("No document for user {user_id}, nothing to mark");
            return Ok(());
        };
        let Some(Value::Array(mut records)) = document.get(TASKS_FIELD).cloned() else {
            debug!("User {user_id} has no tasks, nothing to mark");
            return Ok(());
        };

        let mut matched = false;
        for record in records.iter_mut() {
            let Some(fields) = record.as_object_mut() else {
                continue;
            };
            if fields.get("id").and_then(Value::as_str) == Some(task_id) {
                fields.insert("done".into(), Value::Bool(true));
                matched = true;
            }
        }
        if !matched {
            debug!("No task {task_id} for user {user_id}, writing tasks back unchanged");
        }

        let mut fields = Fields::new();
        fields.insert(TASKS_FIELD.into(), Value::Array(records));
        self.documents
            .set_document(USERS_COLLECTION, user_id, fields, MergeMode::MergeFields)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_today_tasks(&self, user_id: &str) -> Result<Vec<Task>, Error> {
        let today = clock::today(self.clock.as_ref());
        let tasks = self.read_tasks(user_id).await?;
        Ok(tasks.into_iter().filter(|task| task.date == today).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_all_tasks(&self, user_id: &str) -> Result<Vec<Task>, Error> {
        self.read_tasks(user_id).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_tasks_by_date(&self, user_id: &str, date: &str) -> Result<Vec<Task>, Error> {
        let tasks = self.read_tasks(user_id).await?;
        Ok(tasks.into_iter().filter(|task| task.date == date).collect())
    }
}
