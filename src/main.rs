use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use matcha_watcher::config::AppConfig;
use matcha_watcher::plugins::PluginManager;
use matcha_watcher::plugins::manager::NotificationSettings;
use matcha_watcher::scraper::WebScraper;
use matcha_watcher::StockMonitor;

/// Watches matcha vendors and sends a Telegram alert when a product restocks.
#[derive(Debug, Parser)]
#[command(name = "matcha-watcher", version, about)]
struct Cli {
    /// Treat everything seen on the first cycle as out of stock, so the
    /// second cycle alerts on whatever is currently available
    #[arg(long, alias = "simulateRestock")]
    simulate_restock: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("matcha_watcher=info".parse()?),
        )
        .init();

    if dotenv.is_err() {
        info!("No .env file found, relying on environment variables.");
    }

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    if cli.simulate_restock {
        config.scheduler.simulate_restock = true;
    }

    info!("Starting Matcha Watcher...");
    if config.scheduler.simulate_restock {
        info!("Restock simulation enabled, alerts will fire on the second cycle");
    }

    let scraper = WebScraper::new(config.scraper.clone()).context("Failed to build HTTP client")?;

    let telegram = &config.notifications.telegram;
    let mut plugins = PluginManager::new(NotificationSettings::from(telegram));
    plugins.initialize_default_sites(&config.sites);
    plugins.initialize_default_notifiers(telegram).await;

    info!("Watching sites: {}", plugins.list_site_names().join(", "));

    let mut monitor = StockMonitor::new(scraper, plugins, config.scheduler.clone());
    monitor.run().await;

    info!("Shutting down...");

    Ok(())
}
