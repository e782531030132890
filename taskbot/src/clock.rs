use chrono::{DateTime, Local};
use mockall::automock;

/// Format used for a task's calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current time in the server's local time zone.
#[automock]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Today's calendar date on `clock` as `YYYY-MM-DD`.
pub fn today<C: Clock + ?Sized>(clock: &C) -> String {
    clock.now().format(DATE_FORMAT).to_string()
}

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
