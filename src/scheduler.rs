use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::SchedulerConfig;
use crate::models::{Product, RestockEvent};
use crate::plugins::PluginManager;
use crate::scraper::{ScrapeResult, WebScraper};
use crate::stock_state::StockState;
use crate::utils::error::AppError;

/// Stand-in for instants too far out to represent.
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteReport {
    pub site: String,
    pub url: String,
    pub products: Vec<Product>,
    pub restocks: Vec<RestockEvent>,
    pub error: Option<String>,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    pub response_time_ms: u64,
}

impl SiteReport {
    fn failed(scrape: ScrapeResult) -> Self {
        Self {
            site: scrape.site,
            url: scrape.url,
            products: Vec::new(),
            restocks: Vec::new(),
            error: scrape.error,
            notifications_sent: 0,
            notifications_failed: 0,
            response_time_ms: scrape.response_time_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub sites: Vec<SiteReport>,
    pub total_time_ms: u64,
}

impl CycleReport {
    pub fn restock_count(&self) -> usize {
        self.sites.iter().map(|s| s.restocks.len()).sum()
    }

    pub fn notifications_sent(&self) -> usize {
        self.sites.iter().map(|s| s.notifications_sent).sum()
    }

    pub fn failed_sites(&self) -> Vec<&str> {
        self.sites
            .iter()
            .filter(|s| s.error.is_some())
            .map(|s| s.site.as_str())
            .collect()
    }
}

/// Totals over a whole monitoring run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub restocks: usize,
    pub notifications_sent: usize,
    pub failed_fetches: usize,
}

impl RunSummary {
    fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.restocks += report.restock_count();
        self.notifications_sent += report.notifications_sent();
        self.failed_fetches += report.failed_sites().len();
    }
}

/// Periodically scrapes every registered site and alerts on restocks.
///
/// Stock state is owned here and only touched between cycles' join points,
/// so the per-site tasks never share anything mutable.
pub struct StockMonitor {
    scraper: WebScraper,
    plugins: PluginManager,
    config: SchedulerConfig,
    state: StockState,
    cycles_run: u64,
}

impl StockMonitor {
    pub fn new(scraper: WebScraper, plugins: PluginManager, config: SchedulerConfig) -> Self {
        Self {
            scraper,
            plugins,
            config,
            state: StockState::new(),
            cycles_run: 0,
        }
    }

    pub fn state(&self) -> &StockState {
        &self.state
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    /// Scrape all sites concurrently, then diff and notify in site order.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycles_run += 1;
        let cycle = self.cycles_run;
        let started_at = Utc::now();
        let start_time = Instant::now();

        debug!("Starting check cycle {}", cycle);

        let targets: Vec<(String, String)> = self
            .plugins
            .sites()
            .iter()
            .map(|site| (site.name().to_string(), site.url().to_string()))
            .collect();

        let handles: Vec<_> = self
            .plugins
            .sites()
            .iter()
            .map(|site| {
                let site = Arc::clone(site);
                let scraper = self.scraper.clone();
                tokio::spawn(async move { scraper.scrape(site.as_ref()).await })
            })
            .collect();

        let results = join_all(handles).await;

        info!("--- Stock Summary ---");

        let mut sites = Vec::with_capacity(results.len());
        for ((name, url), joined) in targets.into_iter().zip(results) {
            let scrape = match joined {
                Ok(scrape) => scrape,
                Err(e) => {
                    let err = AppError::Scraping {
                        site: name.clone(),
                        message: AppError::from(e).to_string(),
                    };
                    ScrapeResult {
                        site: name,
                        url,
                        success: false,
                        products: Vec::new(),
                        error: Some(err.to_string()),
                        response_time_ms: 0,
                    }
                }
            };

            sites.push(self.process_site(cycle, scrape).await);
        }

        let report = CycleReport {
            cycle,
            started_at,
            sites,
            total_time_ms: start_time.elapsed().as_millis() as u64,
        };

        debug!(
            "Cycle {} finished in {}ms: {} restock(s), {} failed site(s)",
            report.cycle,
            report.total_time_ms,
            report.restock_count(),
            report.failed_sites().len()
        );

        report
    }

    async fn process_site(&mut self, cycle: u64, scrape: ScrapeResult) -> SiteReport {
        info!("--- {} ---", scrape.site);

        if let Some(err) = &scrape.error {
            // Earlier observations for this site stay as they were
            error!("Error scraping {}: {}", scrape.site, err);
            return SiteReport::failed(scrape);
        }

        for product in &scrape.products {
            info!(
                "Product: {}, Price: {}, In Stock: {}",
                product.name, product.price, product.in_stock
            );
        }

        let restocks = self.state.observe(&scrape.site, &scrape.url, &scrape.products);
        for event in &restocks {
            info!("🚨 RESTOCK ALERT: {} is back in stock!", event.product_name);
        }

        let dispatch = self
            .plugins
            .dispatch_restocks(&scrape.site, &scrape.url, &restocks)
            .await;

        if self.config.simulate_restock && cycle == 1 {
            info!(
                "Simulating restock: marking {} {} product(s) as out of stock",
                scrape.products.len(),
                scrape.site
            );
            self.state.mark_all_out_of_stock(&scrape.products);
        }

        SiteReport {
            site: scrape.site,
            url: scrape.url,
            products: scrape.products,
            restocks,
            error: None,
            notifications_sent: dispatch.sent,
            notifications_failed: dispatch.failed,
            response_time_ms: scrape.response_time_ms,
        }
    }

    /// Run until the configured duration elapses or Ctrl-C is received.
    pub async fn run(&mut self) -> RunSummary {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Unable to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run one cycle immediately, then one per check interval, until the
    /// run duration elapses or `shutdown` completes. Shutdown is only
    /// observed between cycles, and the deadline wins a tie with a tick.
    pub async fn run_until<F>(&mut self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        let check_interval = self.config.check_interval();
        let run_duration = self.config.run_duration();

        info!(
            "Monitoring {} site(s) every {:?} for {:?}",
            self.plugins.sites().len(),
            check_interval,
            run_duration
        );

        let deadline = time::sleep(run_duration);
        tokio::pin!(deadline);
        tokio::pin!(shutdown);

        let mut summary = RunSummary::default();
        summary.record(&self.run_cycle().await);

        let now = time::Instant::now();
        let first_tick = now
            .checked_add(check_interval)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let mut ticker = time::interval_at(first_tick, check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut deadline => {
                    info!("Run duration elapsed, stopping monitor");
                    break;
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping monitor");
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.run_cycle().await;
                    summary.record(&report);
                }
            }
        }

        info!(
            "Monitor stopped after {} cycle(s), {} restock(s), {} notification(s) sent",
            summary.cycles, summary.restocks, summary.notifications_sent
        );

        summary
    }
}
