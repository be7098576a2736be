use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::ScraperConfig;
use crate::models::Product;
use crate::plugins::traits::SiteExtractor;
use crate::utils::error::AppError;

/// Outcome of fetching and extracting one site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub site: String,
    pub url: String,
    pub success: bool,
    pub products: Vec<Product>,
    pub error: Option<String>,
    pub response_time_ms: u64,
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
}

impl WebScraper {
    pub fn new(config: ScraperConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self { client })
    }

    /// GET a page and return its body. Non-2xx responses are errors.
    pub async fn fetch_page(&self, url: &str) -> Result<String, AppError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Fetch a site's listing page and run its extractor over it.
    ///
    /// Never fails; problems end up in [`ScrapeResult::error`] with no products.
    pub async fn scrape(&self, site: &dyn SiteExtractor) -> ScrapeResult {
        let start_time = Instant::now();

        let outcome = match self.fetch_page(site.url()).await {
            Ok(html) => site.extract(&html),
            Err(e) => Err(e),
        };

        let response_time_ms = start_time.elapsed().as_millis() as u64;

        match outcome {
            Ok(products) => ScrapeResult {
                site: site.name().to_string(),
                url: site.url().to_string(),
                success: true,
                products,
                error: None,
                response_time_ms,
            },
            Err(e) => ScrapeResult {
                site: site.name().to_string(),
                url: site.url().to_string(),
                success: false,
                products: Vec::new(),
                error: Some(e.to_string()),
                response_time_ms,
            },
        }
    }
}
