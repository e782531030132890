//! Text commands understood by the bot.
//!
//! A command is a case-sensitive keyword plus free argument text. Each command
//! runs its task store calls and renders a reply; failures are turned into a
//! user-facing message by [`Error::user_message`].

use crate::clock::Clock;
use crate::ingress::InboundMessage;
use crate::task_store::{self, TaskStore};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

pub mod add;
pub mod by_date;
pub mod done;
pub mod list;

pub type Reply = String;

/// What a failed store call was trying to do, used to pick the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    AddTask,
    ListTasks,
    FetchTodayTasks,
    MarkDone,
    ListTasksByDate,
}

impl Display for StoreAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let action = match self {
            StoreAction::AddTask => "add task",
            StoreAction::ListTasks => "list tasks",
            StoreAction::FetchTodayTasks => "fetch today's tasks",
            StoreAction::MarkDone => "mark task as done",
            StoreAction::ListTasksByDate => "list tasks by date",
        };
        write!(f, "{action}")
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Task text is empty")]
    EmptyTaskText,
    #[error("No task number or identifier given")]
    MissingTaskReference,
    #[error("Task number {0} is out of range")]
    InvalidTaskNumber(i64),
    #[error("'{0}' is not a YYYY-MM-DD date")]
    InvalidDate(String),
    #[error("Cannot {action}")]
    Store {
        action: StoreAction,
        #[source]
        source: task_store::Error,
    },
}

impl Error {
    pub(crate) fn store(action: StoreAction) -> impl FnOnce(task_store::Error) -> Self {
        move |source| Error::Store { action, source }
    }

    /// Whether the error was caused by the user's input rather than the system.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Error::Store { .. })
    }

    /// Reply shown to the user. Never contains internal detail.
    pub fn user_message(&self, prefix: &str) -> Reply {
        match self {
            Error::EmptyTaskText => format!("⚠️ Usage: `{prefix}add Your task`"),
            Error::MissingTaskReference => format!(
                "⚠️ Please provide task number or ID.\nExample: `{prefix}done 1` or `{prefix}done <task_id>`"
            ),
            Error::InvalidTaskNumber(_) => "⚠️ Invalid task number.".to_string(),
            Error::InvalidDate(_) => format!(
                "❌ Invalid date format. Please use YYYY-MM-DD (e.g., `{prefix}tasks 2025-08-01`)."
            ),
            Error::Store { action, .. } => match action {
                StoreAction::AddTask => "❌ Failed to add task.",
                StoreAction::ListTasks => "❌ Failed to retrieve your tasks.",
                StoreAction::FetchTodayTasks => "❌ Failed to fetch your tasks.",
                StoreAction::MarkDone => "❌ Failed to mark task as done.",
                StoreAction::ListTasksByDate => "❌ Failed to retrieve tasks.",
            }
            .to_string(),
        }
    }
}

/// A parsed inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Add(String),
    List,
    ListAll,
    Done(String),
    Tasks(String),
    Unknown(String),
}

impl Command {
    pub fn parse(keyword: &str, arguments: &str) -> Self {
        let arguments = arguments.trim().to_string();
        match keyword {
            "start" | "help" => Command::Start,
            "add" => Command::Add(arguments),
            "list" => Command::List,
            "list_all" => Command::ListAll,
            "done" => Command::Done(arguments),
            "tasks" => Command::Tasks(arguments),
            other => Command::Unknown(other.to_string()),
        }
    }
}

pub fn help_text(prefix: &str) -> Reply {
    format!(
        "👋 Hi! I can help you manage your daily tasks.\n\n\
         Use:\n\
         • `{prefix}add Your task here` to add a task\n\
         • `{prefix}list` to view tasks today\n\
         • `{prefix}list_all` to view tasks all date\n\
         • `{prefix}tasks 2025-08-01` to view tasks of a date with their IDs\n\
         • `{prefix}done 1` to mark task #1 as completed"
    )
}

pub fn unknown_command_text(prefix: &str) -> Reply {
    format!("❓ Unknown command. Use {prefix}add, {prefix}list, or {prefix}done.")
}

/// Maps inbound commands to task store calls and renders the replies.
///
/// Holds no mutable state; one router is shared by every dispatched command.
pub struct CommandRouter {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    prefix: String,
}

impl CommandRouter {
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[tracing::instrument(skip(self, message), fields(user_id = %message.sender_id, command = %message.command))]
    pub async fn route(&self, message: &InboundMessage) -> Reply {
        let user_id = message.sender_id.to_string();
        let store = self.store.as_ref();
        let result = match Command::parse(&message.command, &message.arguments) {
            Command::Start => Ok(help_text(&self.prefix)),
            Command::Unknown(keyword) => {
                debug!("Unknown command '{keyword}'");
                Ok(unknown_command_text(&self.prefix))
            }
            Command::Add(text) => {
                let now = self.clock.now();
                add::add(store, &user_id, &message.sender_name, &text, now).await
            }
            Command::List => list::list_today(store, &user_id).await,
            Command::ListAll => list::list_all(store, &user_id).await,
            Command::Done(reference) => done::done(store, &user_id, &reference).await,
            Command::Tasks(date) => by_date::tasks_by_date(store, &user_id, &date).await,
        };

        result.unwrap_or_else(|e| {
            if e.is_validation() {
                debug!("Rejected input: {e}");
            } else {
                error!("Command failed: {e:?}");
            }
            e.user_message(&self.prefix)
        })
    }
}
