use crate::commands::{Error, Reply, StoreAction};
use crate::task::Task;
use crate::task_store::TaskStore;
use chrono::{DateTime, Local};
use tracing::info;

/// Creates a task dated on `now` and confirms it by echoing the text.
pub async fn add(
    store: &dyn TaskStore,
    user_id: &str,
    username: &str,
    text: &str,
    now: DateTime<Local>,
) -> Result<Reply, Error> {
    if text.is_empty() {
        return Err(Error::EmptyTaskText);
    }

    let task = Task::new(text, username, now);
    let task_id = task.id.clone();
    store
        .add_task(user_id, task)
        .await
        .map_err(Error::store(StoreAction::AddTask))?;
    info!("Added task {task_id} for user {user_id}");

    Ok(format!("✅ Task added: {text}"))
}
