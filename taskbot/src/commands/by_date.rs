use crate::commands::list::status_marker;
use crate::commands::{Error, Reply, StoreAction};
use crate::task::{self, Task};
use crate::task_store::TaskStore;

/// Tasks of a single date, each line showing the task identifier.
///
/// The date is validated before the store is queried.
pub async fn tasks_by_date(store: &dyn TaskStore, user_id: &str, date: &str) -> Result<Reply, Error> {
    if !task::is_valid_date(date) {
        return Err(Error::InvalidDate(date.to_string()));
    }

    let tasks = store
        .get_tasks_by_date(user_id, date)
        .await
        .map_err(Error::store(StoreAction::ListTasksByDate))?;
    Ok(render_for_date(date, &tasks))
}

pub fn render_for_date(date: &str, tasks: &[Task]) -> Reply {
    if tasks.is_empty() {
        return format!("✅ No tasks found on {date}.");
    }

    let mut reply = format!("**📝 Tasks on {date}:**\n");
    for (position, task) in tasks.iter().enumerate() {
        reply.push_str(&format!(
            "{}. {} {} (`{}`)\n",
            position + 1,
            status_marker(task),
            task.text,
            task.id
        ));
    }
    reply
}
