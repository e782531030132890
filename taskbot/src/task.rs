//! The task record stored inside a user document.

use crate::clock::DATE_FORMAT;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A stored record could not be turned into a [`Task`].
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Task record is not an object")]
    NotAnObject,
    #[error("Invalid task record: {0}")]
    InvalidRecord(#[from] serde_json::Error),
}

/// A single dated to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
    /// Calendar date the task belongs to, `YYYY-MM-DD`. Never changes after creation.
    pub date: String,
    /// Display name of the creator, may be empty.
    #[serde(default)]
    pub username: String,
    pub created: DateTime<Utc>,
}

impl Task {
    /// Creates an open task with a fresh identifier, dated on `now`'s calendar day.
    pub fn new(text: impl Into<String>, username: impl Into<String>, now: DateTime<Local>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            done: false,
            date: now.format(DATE_FORMAT).to_string(),
            username: username.into(),
            created: now.with_timezone(&Utc),
        }
    }

    /// Decodes an untrusted stored record.
    pub fn decode(record: &Value) -> Result<Self, DecodeError> {
        if !record.is_object() {
            return Err(DecodeError::NotAnObject);
        }
        Ok(Task::deserialize(record)?)
    }

    /// Encodes the task as a stored record.
    pub fn encode(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Whether `date` is a real calendar date written exactly as `YYYY-MM-DD`.
pub fn is_valid_date(date: &str) -> bool {
    date.len() == 10 && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn new_task_is_open_and_dated_today() {
        // Arrange
        let now = Local.with_ymd_and_hms(2025, 8, 1, 9, 30, 0).unwrap();

        // Act
        let task = Task::new("buy milk", "alice", now);

        // Assert
        assert_eq!(task.text, "buy milk");
        assert_eq!(task.username, "alice");
        assert_eq!(task.date, "2025-08-01");
        assert!(!task.done);
        assert!(!task.id.is_empty());
    }

    #[test]
    fn new_tasks_get_distinct_ids() {
        let now = Local::now();

        let first = Task::new("a", "", now);
        let second = Task::new("a", "", now);

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn decode_accepts_a_complete_record() {
        // Arrange
        let record = json!({
            "id": "t-1",
            "text": "write report",
            "done": true,
            "date": "2025-07-31",
            "username": "bob",
            "created": "2025-07-31T08:00:00Z"
        });

        // Act
        let task = Task::decode(&record).unwrap();

        // Assert
        assert_eq!(task.id, "t-1");
        assert_eq!(task.text, "write report");
        assert!(task.done);
        assert_eq!(task.date, "2025-07-31");
        assert_eq!(task.username, "bob");
    }

    #[test]
    fn decode_defaults_optional_fields() {
        let record = json!({
            "id": "t-1",
            "text": "write report",
            "date": "2025-07-31",
            "created": "2025-07-31T08:00:00Z"
        });

        let task = Task::decode(&record).unwrap();

        assert!(!task.done);
        assert_eq!(task.username, "");
    }

    #[test]
    fn decode_rejects_record_missing_text() {
        let record = json!({
            "id": "t-1",
            "done": false,
            "date": "2025-07-31",
            "created": "2025-07-31T08:00:00Z"
        });

        let result = Task::decode(&record);

        assert!(matches!(result, Err(DecodeError::InvalidRecord(_))));
    }

    #[test]
    fn decode_rejects_non_object() {
        let result = Task::decode(&json!("t-1"));

        assert!(matches!(result, Err(DecodeError::NotAnObject)));
    }

    #[test]
    fn encode_then_decode_keeps_the_task() {
        let task = Task::new("water plants", "carol", Local::now());

        let decoded = Task::decode(&task.encode().unwrap()).unwrap();

        assert_eq!(decoded, task);
    }

    #[test]
    fn valid_dates() {
        assert!(is_valid_date("2025-08-01"));
        assert!(is_valid_date("2024-02-29"));
    }

    #[test]
    fn invalid_dates() {
        assert!(!is_valid_date("2025-13-40"));
        assert!(!is_valid_date("foo"));
        assert!(!is_valid_date("2025-8-1"));
        assert!(!is_valid_date("2023-02-29"));
        assert!(!is_valid_date(""));
    }
}
