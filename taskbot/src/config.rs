use serde::{Deserialize, Serialize};

pub const DEFAULT_PREFIX: &str = "/";
const CONFIG_FILE: &str = "taskbot/config";
const ENV_PREFIX: &str = "TASKBOT";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub db_url: Option<String>,
}

impl Config {
    /// Loads `taskbot/config.toml` if present, overridden by `TASKBOT__*` environment variables.
    pub fn new() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bot.prefix.trim().is_empty() {
            anyhow::bail!("bot.prefix must not be empty");
        }
        if self.store.backend == StoreBackend::Postgres && self.store.db_url.is_none() {
            anyhow::bail!("store.db_url is required for the postgres backend");
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}
