use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::extractors::Vendor;
use super::notifiers::{TelegramNotifier, format};
use super::traits::{NotificationMessage, NotifierPlugin, ParseMode, SiteExtractor};
use crate::config::{NotifyMode, SitesConfig, TelegramConfig};
use crate::models::RestockEvent;

pub type SiteExtractorRef = Arc<dyn SiteExtractor>;
pub type NotifierPluginBox = Box<dyn NotifierPlugin>;

/// How restock events are turned into chat messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationSettings {
    pub parse_mode: ParseMode,
    pub notify_mode: NotifyMode,
    pub disable_item_preview: bool,
    pub disable_summary_preview: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            parse_mode: ParseMode::MarkdownV2,
            notify_mode: NotifyMode::PerItem,
            disable_item_preview: true,
            disable_summary_preview: false,
        }
    }
}

impl From<&TelegramConfig> for NotificationSettings {
    fn from(config: &TelegramConfig) -> Self {
        Self {
            parse_mode: config.parse_mode,
            notify_mode: config.notify_mode,
            disable_item_preview: config.disable_item_preview,
            disable_summary_preview: config.disable_summary_preview,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
}

impl DispatchSummary {
    fn merge(&mut self, other: DispatchSummary) {
        self.sent += other.sent;
        self.failed += other.failed;
    }
}

/// Site extractors in processing order plus the registered notifiers.
#[derive(Clone)]
pub struct PluginManager {
    sites: Vec<SiteExtractorRef>,
    notifiers: Arc<RwLock<HashMap<String, NotifierPluginBox>>>,
    settings: NotificationSettings,
}

impl PluginManager {
    pub fn new(settings: NotificationSettings) -> Self {
        Self {
            sites: Vec::new(),
            notifiers: Arc::new(RwLock::new(HashMap::new())),
            settings,
        }
    }

    /// Register a site extractor; sites are processed in registration order
    pub fn register_site(&mut self, site: SiteExtractorRef) {
        self.sites.push(site);
    }

    /// Register the built-in vendor extractors
    pub fn initialize_default_sites(&mut self, sites: &SitesConfig) {
        for vendor in Vendor::ALL {
            self.register_site(Arc::new(vendor.extractor(sites)));
        }
    }

    pub fn sites(&self) -> &[SiteExtractorRef] {
        &self.sites
    }

    pub fn list_site_names(&self) -> Vec<String> {
        self.sites.iter().map(|site| site.name().to_string()).collect()
    }

    /// Register a notifier plugin
    pub async fn register_notifier(&self, plugin: NotifierPluginBox) {
        let plugin_type = plugin.plugin_type().to_string();

        let mut notifiers = self.notifiers.write().await;
        notifiers.insert(plugin_type, plugin);
    }

    /// Check if a notifier plugin exists
    pub async fn has_notifier(&self, plugin_type: &str) -> bool {
        let notifiers = self.notifiers.read().await;
        notifiers.contains_key(plugin_type)
    }

    /// List all available notifier types
    pub async fn list_notifier_types(&self) -> Vec<String> {
        let notifiers = self.notifiers.read().await;
        notifiers.keys().cloned().collect()
    }

    /// Set up the Telegram notifier. Problems are logged and leave
    /// notifications disabled; monitoring carries on either way.
    pub async fn initialize_default_notifiers(&self, config: &TelegramConfig) -> bool {
        let notifier = match TelegramNotifier::from_config(config) {
            Ok(notifier) => notifier,
            Err(e) => {
                warn!("{}. Telegram notifications disabled", e);
                return false;
            }
        };

        if config.verify_on_startup {
            match notifier.test_connection().await {
                Ok(true) => {}
                Ok(false) => {
                    error!(
                        "Telegram token does not belong to a bot. Telegram notifications disabled"
                    );
                    return false;
                }
                Err(e) => {
                    error!("Error creating Telegram bot: {}. Telegram notifications disabled", e);
                    return false;
                }
            }
        }

        info!("Telegram notifications enabled for chat {}", notifier.chat_id());
        self.register_notifier(Box::new(notifier)).await;
        true
    }

    /// Send the alerts for one site's restocks. Failures are logged, never retried.
    pub async fn dispatch_restocks(
        &self,
        site: &str,
        site_url: &str,
        events: &[RestockEvent],
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        if events.is_empty() {
            return summary;
        }

        if self.notifiers.read().await.is_empty() {
            debug!("No notifier registered, skipping {} alert(s) for {}", events.len(), site);
            return summary;
        }

        for event in events {
            let message = NotificationMessage {
                text: format::restock_alert(self.settings.parse_mode, event),
                parse_mode: self.settings.parse_mode,
                disable_link_preview: self.settings.disable_item_preview,
            };

            let result = self.send(&message).await;
            if result.sent > 0 {
                info!("Successfully sent restock notification for: {}", event.product_name);
            }
            summary.merge(result);
        }

        if self.settings.notify_mode == NotifyMode::PerItemWithSummary {
            let message = NotificationMessage {
                text: format::summary_alert(self.settings.parse_mode, site, site_url, events.len()),
                parse_mode: self.settings.parse_mode,
                disable_link_preview: self.settings.disable_summary_preview,
            };

            let result = self.send(&message).await;
            if result.sent > 0 {
                info!("Successfully sent restock summary for: {}", site);
            }
            summary.merge(result);
        }

        summary
    }

    async fn send(&self, message: &NotificationMessage) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        let notifiers = self.notifiers.read().await;

        for (plugin_type, notifier) in notifiers.iter() {
            match notifier.notify(message).await {
                Ok(result) if result.success => summary.sent += 1,
                Ok(result) => {
                    warn!(
                        "Notifier {} did not deliver message: {}",
                        plugin_type,
                        result.error.unwrap_or_default()
                    );
                    summary.failed += 1;
                }
                Err(e) => {
                    error!("Error sending {} message: {}", plugin_type, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new(NotificationSettings::default())
    }
}
