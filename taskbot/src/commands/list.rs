use crate::commands::{Error, Reply, StoreAction};
use crate::task::Task;
use crate::task_store::TaskStore;
use std::collections::BTreeMap;

pub const NO_TASKS_TEXT: &str = "✅ No tasks found.";

/// Today's tasks, grouped by date.
pub async fn list_today(store: &dyn TaskStore, user_id: &str) -> Result<Reply, Error> {
    let tasks = store
        .get_today_tasks(user_id)
        .await
        .map_err(Error::store(StoreAction::ListTasks))?;
    Ok(render_grouped(tasks))
}

/// Every task of the user, grouped by date.
pub async fn list_all(store: &dyn TaskStore, user_id: &str) -> Result<Reply, Error> {
    let tasks = store
        .get_all_tasks(user_id)
        .await
        .map_err(Error::store(StoreAction::ListTasks))?;
    Ok(render_grouped(tasks))
}

/// Groups tasks by date. Dates iterate in ascending order, which for
/// `YYYY-MM-DD` strings is also chronological; tasks keep their order within a date.
pub fn group_by_date(tasks: Vec<Task>) -> BTreeMap<String, Vec<Task>> {
    let mut grouped: BTreeMap<String, Vec<Task>> = BTreeMap::new();
    for task in tasks {
        grouped.entry(task.date.clone()).or_default().push(task);
    }
    grouped
}

pub(crate) fn status_marker(task: &Task) -> &'static str {
    if task.done { "✅" } else { "❌" }
}

pub fn render_grouped(tasks: Vec<Task>) -> Reply {
    if tasks.is_empty() {
        return NO_TASKS_TEXT.to_string();
    }

    let mut reply = String::from("**📝 Your tasks:**\n");
    for (date, tasks) in group_by_date(tasks) {
        reply.push_str(&format!("\n🗓 **{date}**\n"));
        for (position, task) in tasks.iter().enumerate() {
            reply.push_str(&format!(
                "{}. {} {}\n",
                position + 1,
                status_marker(task),
                task.text
            ));
        }
    }
    reply
}
