#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::sync::{Arc, Mutex};
use taskbot::clock::Clock;
use taskbot::connectors::{ChatConnector, Error};
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::{postgres, testcontainers};

pub fn init_tracing() {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Clock pinned to noon of a single day.
pub struct FixedClock(DateTime<Local>);

impl FixedClock {
    pub fn on(year: i32, month: u32, day: u32) -> Arc<Self> {
        let now = Local
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .expect("unambiguous local time");
        Arc::new(Self(now))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Connector that keeps every reply it is asked to send.
#[derive(Default)]
pub struct RecordingConnector {
    sent: Mutex<Vec<(u64, String)>>,
}

impl RecordingConnector {
    pub fn replies(&self) -> Vec<(u64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatConnector for RecordingConnector {
    async fn send_message(&self, recipient_id: u64, message: &str) -> Result<(), Error> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient_id, message.to_string()));
        Ok(())
    }
}

pub async fn setup_container() -> anyhow::Result<testcontainers::ContainerAsync<postgres::Postgres>>
{
    let container = postgres::Postgres::default().start().await?;
    Ok(container)
}

pub async fn setup_db(
    container: &testcontainers::ContainerAsync<postgres::Postgres>,
) -> anyhow::Result<DatabaseConnection> {
    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;
    let db_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);
    let db = Database::connect(&db_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
