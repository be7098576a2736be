use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::plugins::traits::ParseMode;

pub const CONFIG_FILE_ENV: &str = "MATCHA_CONFIG_FILE";
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

pub const DEFAULT_USER_AGENT: &str = concat!("matcha-watcher/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_RUN_DURATION_SECS: u64 = 12 * 60 * 60;
pub const MAX_RUN_DURATION_SECS: u64 = 365 * 24 * 60 * 60;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 60 * 60;
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

pub const IPPODO_URL: &str = "https://global.ippodo-tea.co.jp/collections/matcha";
pub const NAKAMURA_URL: &str = "https://global.tokichi.jp/collections/matcha";
pub const MARUKYU_URL: &str =
    "https://www.marukyu-koyamaen.co.jp/english/shop/products/catalog/matcha/principal";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub scheduler: SchedulerConfig,
    pub sites: SitesConfig,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScraperConfig {
    pub user_agent: String,
    /// Transport timeout in seconds for every page fetch.
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulerConfig {
    pub check_interval_secs: u64,
    pub run_duration_secs: u64,
    pub simulate_restock: bool,
}

impl SchedulerConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn run_duration(&self) -> Duration {
        Duration::from_secs(self.run_duration_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SitesConfig {
    pub ippodo_url: String,
    pub nakamura_url: String,
    pub marukyu_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationsConfig {
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotifyMode {
    /// One alert per restocked product.
    #[default]
    PerItem,
    /// Per-product alerts plus one summary per site that restocked.
    PerItemWithSummary,
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base_url: String,
    pub parse_mode: ParseMode,
    pub notify_mode: NotifyMode,
    pub disable_item_preview: bool,
    pub disable_summary_preview: bool,
    pub verify_on_startup: bool,
}

// Hand-written so the bot token never reaches the logs
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("api_base_url", &self.api_base_url)
            .field("parse_mode", &self.parse_mode)
            .field("notify_mode", &self.notify_mode)
            .field("disable_item_preview", &self.disable_item_preview)
            .field("disable_summary_preview", &self.disable_summary_preview)
            .field("verify_on_startup", &self.verify_on_startup)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig {
                user_agent: DEFAULT_USER_AGENT.to_string(),
                request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            },
            scheduler: SchedulerConfig {
                check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
                run_duration_secs: DEFAULT_RUN_DURATION_SECS,
                simulate_restock: false,
            },
            sites: SitesConfig {
                ippodo_url: IPPODO_URL.to_string(),
                nakamura_url: NAKAMURA_URL.to_string(),
                marukyu_url: MARUKYU_URL.to_string(),
            },
            notifications: NotificationsConfig {
                telegram: TelegramConfig {
                    bot_token: None,
                    chat_id: None,
                    api_base_url: DEFAULT_TELEGRAM_API.to_string(),
                    parse_mode: ParseMode::MarkdownV2,
                    notify_mode: NotifyMode::PerItem,
                    disable_item_preview: true,
                    disable_summary_preview: false,
                    verify_on_startup: true,
                },
            },
        }
    }
}

impl AppConfig {
    /// Defaults, then the file named by `MATCHA_CONFIG_FILE`, then `MATCHA__*`
    /// variables, then the Telegram credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config_file = env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        let mut config = Self::load(config_file.as_deref())?;
        config.apply_telegram_env(
            env::var(TELEGRAM_TOKEN_ENV).ok(),
            env::var(TELEGRAM_CHAT_ID_ENV).ok(),
        );

        config.validate()?;
        Ok(config)
    }

    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }

        let s = builder
            // Add environment variables like MATCHA__SCHEDULER__CHECK_INTERVAL_SECS
            .add_source(
                Environment::with_prefix("MATCHA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("scraper.user_agent", DEFAULT_USER_AGENT)?
            .set_default("scraper.request_timeout", DEFAULT_REQUEST_TIMEOUT_SECS as i64)?
            .set_default("scheduler.check_interval_secs", DEFAULT_CHECK_INTERVAL_SECS as i64)?
            .set_default("scheduler.run_duration_secs", DEFAULT_RUN_DURATION_SECS as i64)?
            .set_default("scheduler.simulate_restock", false)?
            .set_default("sites.ippodo_url", IPPODO_URL)?
            .set_default("sites.nakamura_url", NAKAMURA_URL)?
            .set_default("sites.marukyu_url", MARUKYU_URL)?
            .set_default("notifications.telegram.api_base_url", DEFAULT_TELEGRAM_API)?
            .set_default("notifications.telegram.parse_mode", "markdownv2")?
            .set_default("notifications.telegram.notify_mode", "per_item")?
            .set_default("notifications.telegram.disable_item_preview", true)?
            .set_default("notifications.telegram.disable_summary_preview", false)?
            .set_default("notifications.telegram.verify_on_startup", true)
    }

    /// Blank values are treated as unset.
    pub fn apply_telegram_env(&mut self, token: Option<String>, chat_id: Option<String>) {
        let telegram = &mut self.notifications.telegram;

        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            telegram.bot_token = Some(token.trim().to_string());
        }
        if let Some(chat_id) = chat_id.filter(|c| !c.trim().is_empty()) {
            telegram.chat_id = Some(chat_id.trim().to_string());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate scraper configuration
        if self.scraper.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("Scraper user_agent must not be empty".into()));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Scraper request_timeout must be greater than 0".into(),
            ));
        }

        if self.scraper.request_timeout > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::Message(format!(
                "Scraper request_timeout must be at most {}",
                MAX_REQUEST_TIMEOUT_SECS
            )));
        }

        // Validate scheduler configuration
        if self.scheduler.check_interval_secs == 0 {
            return Err(ConfigError::Message(
                "Scheduler check_interval_secs must be greater than 0".into(),
            ));
        }

        if self.scheduler.run_duration_secs == 0 {
            return Err(ConfigError::Message(
                "Scheduler run_duration_secs must be greater than 0".into(),
            ));
        }

        if self.scheduler.run_duration_secs > MAX_RUN_DURATION_SECS {
            return Err(ConfigError::Message(format!(
                "Scheduler run_duration_secs must be at most {}",
                MAX_RUN_DURATION_SECS
            )));
        }

        if self.scheduler.check_interval_secs > self.scheduler.run_duration_secs {
            return Err(ConfigError::Message(
                "Scheduler check_interval_secs must not exceed run_duration_secs".into(),
            ));
        }

        // Validate site URLs
        for (name, url) in [
            ("ippodo_url", &self.sites.ippodo_url),
            ("nakamura_url", &self.sites.nakamura_url),
            ("marukyu_url", &self.sites.marukyu_url),
        ] {
            if Url::parse(url).is_err() {
                return Err(ConfigError::Message(format!("Invalid URL format in sites.{}", name)));
            }
        }

        // Validate notification configuration
        if Url::parse(&self.notifications.telegram.api_base_url).is_err() {
            return Err(ConfigError::Message("Invalid Telegram api_base_url format".into()));
        }

        Ok(())
    }
}
