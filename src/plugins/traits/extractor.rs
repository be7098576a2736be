use crate::models::Product;
use crate::utils::error::AppError;

/// A vendor catalog page that can be turned into products.
///
/// Fetching is done by the caller; implementations only see the page HTML,
/// which keeps them synchronous and testable against fixtures.
pub trait SiteExtractor: Send + Sync {
    /// Display name used in logs and notifications.
    fn name(&self) -> &str;

    /// Catalog page to fetch.
    fn url(&self) -> &str;

    /// Products on the page, blacklisted names already removed.
    fn extract(&self, html: &str) -> Result<Vec<Product>, AppError>;
}
