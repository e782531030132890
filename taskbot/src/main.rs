use anyhow::Context;
use migration::MigratorTrait;
use poise::serenity_prelude as serenity;
use poise::serenity_prelude::FullEvent;
use std::sync::Arc;
use taskbot::clock::{Clock, SystemClock};
use taskbot::commands::CommandRouter;
use taskbot::config::{Config, StoreBackend};
use taskbot::connectors::discord::serenity::{Data, SerenityChatConnector, on_message_create};
use taskbot::document::DocumentStore;
use taskbot::document::memory::InMemoryDocumentStore;
use taskbot::document::postgres::SeaOrmDocumentStore;
use taskbot::ingress::Dispatcher;
use taskbot::task_store::{TaskStore, TaskStoreImpl};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

async fn connect_document_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory document store, tasks are lost on restart");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        StoreBackend::Postgres => {
            let db_url = config
                .store
                .db_url
                .as_deref()
                .context("store.db_url is not set")?;
            let db = sea_orm::Database::connect(db_url).await?;
            migration::Migrator::up(&db, None).await?;
            info!("Database migrations applied successfully");
            Ok(Arc::new(SeaOrmDocumentStore::new(Arc::new(db))))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::new()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();
    let token = std::env::var("DISCORD_TOKEN").context("missing DISCORD_TOKEN")?;

    let documents = connect_document_store(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn TaskStore> = Arc::new(TaskStoreImpl::new(documents, clock.clone()));
    let router = Arc::new(CommandRouter::new(
        store.clone(),
        clock,
        config.bot.prefix.clone(),
    ));

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::<Data, anyhow::Error>::builder()
        .options(poise::FrameworkOptions {
            event_handler: |_ctx, event, _framework, data| {
                Box::pin(async move {
                    match event {
                        FullEvent::Message { new_message } => on_message_create(data, new_message),
                        _ => debug!("Unhandled event: {:?}", event),
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                info!("Connected to Discord as {}", ready.user.name);
                let connector = Arc::new(SerenityChatConnector::new(ctx.http.clone()));
                Ok(Data {
                    dispatcher: Dispatcher::new(router, store, connector),
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot...");
    client.start().await?;
    Ok(())
}
