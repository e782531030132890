//! Completing tasks by number or identifier.
//!
//! A number refers to the 1-based position in the *current* list of today's
//! tasks, as shown by the `list` command. The list is fetched again when the
//! number is resolved, so an add or done in between can shift positions; the
//! number is only as stable as that list.

use crate::commands::{Error, Reply, StoreAction};
use crate::task::Task;
use crate::task_store::TaskStore;
use tracing::info;

/// Resolves a 1-based `position` against `tasks`.
pub fn resolve_position(tasks: &[Task], position: i64) -> Result<&Task, Error> {
    usize::try_from(position)
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| tasks.get(index))
        .ok_or(Error::InvalidTaskNumber(position))
}

/// Turns a task number or a literal identifier into a task identifier.
pub async fn resolve_task_id(
    store: &dyn TaskStore,
    user_id: &str,
    reference: &str,
) -> Result<String, Error> {
    if reference.is_empty() {
        return Err(Error::MissingTaskReference);
    }
    let Ok(position) = reference.parse::<i64>() else {
        return Ok(reference.to_string());
    };

    let today = store
        .get_today_tasks(user_id)
        .await
        .map_err(Error::store(StoreAction::FetchTodayTasks))?;
    Ok(resolve_position(&today, position)?.id.clone())
}

pub async fn done(store: &dyn TaskStore, user_id: &str, reference: &str) -> Result<Reply, Error> {
    let task_id = resolve_task_id(store, user_id, reference).await?;
    store
        .mark_task_done(user_id, &task_id)
        .await
        .map_err(Error::store(StoreAction::MarkDone))?;
    info!("Marked task {task_id} done for user {user_id}");
    Ok("✅ Task marked as done!".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;
    use crate::task_store::{self, MockTaskStore};
    use chrono::Local;
    use mockall::predicate::*;

    fn today_tasks(count: usize) -> Vec<Task> {
        (1..=count)
            .map(|i| {
                let mut task = Task::new(format!("task {i}"), "alice", Local::now());
                task.id = format!("id-{i}");
                task
            })
            .collect()
    }

    fn store_error() -> task_store::Error {
        task_store::Error::Store(document::Error::Unavailable("down".into()))
    }

    mod resolve_position_tests {
        use super::*;

        #[test]
        fn positions_inside_the_list_resolve_in_order() {
            let tasks = today_tasks(3);

            for k in 1..=3 {
                let task = resolve_position(&tasks, k).unwrap();
                assert_eq!(task.id, format!("id-{k}"));
            }
        }

        #[test]
        fn zero_is_rejected() {
            let tasks = today_tasks(3);

            assert!(matches!(
                resolve_position(&tasks, 0),
                Err(Error::InvalidTaskNumber(0))
            ));
        }

        #[test]
        fn one_past_the_end_is_rejected() {
            let tasks = today_tasks(3);

            assert!(matches!(
                resolve_position(&tasks, 4),
                Err(Error::InvalidTaskNumber(4))
            ));
        }

        #[test]
        fn negative_numbers_are_rejected() {
            let tasks = today_tasks(3);

            assert!(matches!(
                resolve_position(&tasks, -1),
                Err(Error::InvalidTaskNumber(-1))
            ));
        }

        #[test]
        fn empty_list_rejects_every_number() {
            assert!(resolve_position(&[], 1).is_err());
        }
    }

    #[tokio::test]
    async fn number_resolves_against_today_tasks() {
        // Arrange
        let mut store = MockTaskStore::new();
        store
            .expect_get_today_tasks()
            .with(eq("42"))
            .times(1)
            .returning(|_| Ok(today_tasks(3)));
        store
            .expect_mark_task_done()
            .with(eq("42"), eq("id-2"))
            .times(1)
            .returning(|_, _| Ok(()));

        // Act
        let reply = done(&store, "42", "2").await;

        // Assert
        assert_eq!(reply.unwrap(), "✅ Task marked as done!");
    }

    #[tokio::test]
    async fn identifier_is_used_as_is() {
        // Arrange
        let mut store = MockTaskStore::new();
        store.expect_get_today_tasks().never();
        store
            .expect_mark_task_done()
            .with(eq("42"), eq("3f2b-uuid"))
            .times(1)
            .returning(|_, _| Ok(()));

        // Act
        let reply = done(&store, "42", "3f2b-uuid").await;

        // Assert
        assert!(reply.is_ok());
    }

    #[tokio::test]
    async fn out_of_range_number_does_not_write() {
        let mut store = MockTaskStore::new();
        store
            .expect_get_today_tasks()
            .returning(|_| Ok(today_tasks(2)));
        store.expect_mark_task_done().never();

        let result = done(&store, "42", "3").await;

        assert!(matches!(result, Err(Error::InvalidTaskNumber(3))));
    }

    #[tokio::test]
    async fn missing_reference_is_rejected() {
        let mut store = MockTaskStore::new();
        store.expect_get_today_tasks().never();
        store.expect_mark_task_done().never();

        let result = done(&store, "42", "").await;

        assert!(matches!(result, Err(Error::MissingTaskReference)));
    }

    #[tokio::test]
    async fn failing_today_lookup_is_a_fetch_error() {
        let mut store = MockTaskStore::new();
        store
            .expect_get_today_tasks()
            .returning(|_| Err(store_error()));
        store.expect_mark_task_done().never();

        let result = done(&store, "42", "1").await;

        assert!(matches!(
            result,
            Err(Error::Store {
                action: StoreAction::FetchTodayTasks,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn failing_write_is_a_mark_done_error() {
        let mut store = MockTaskStore::new();
        store
            .expect_mark_task_done()
            .returning(|_, _| Err(store_error()));

        let result = done(&store, "42", "some-id").await;

        assert!(matches!(
            result,
            Err(Error::Store {
                action: StoreAction::MarkDone,
                ..
            })
        ));
    }
}
