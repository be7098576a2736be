use serde::{Deserialize, Serialize};

/// One product card scraped from a vendor catalog page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub name: String,
    pub price: String,
    pub in_stock: bool,
    pub url: Option<String>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: impl Into<String>, in_stock: bool) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            in_stock,
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Case-sensitive substring match against the product name.
    pub fn matches_any(&self, blacklist: &[String]) -> bool {
        blacklist.iter().any(|word| self.name.contains(word.as_str()))
    }
}

/// A product observed flipping from out of stock to in stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestockEvent {
    pub site: String,
    pub site_url: String,
    pub product_name: String,
    pub price: String,
    pub product_url: Option<String>,
}

impl RestockEvent {
    pub fn new(site: &str, site_url: &str, product: &Product) -> Self {
        Self {
            site: site.to_string(),
            site_url: site_url.to_string(),
            product_name: product.name.clone(),
            price: product.price.clone(),
            product_url: product.url.clone(),
        }
    }

    /// Product page when the listing exposed one, the catalog page otherwise.
    pub fn link(&self) -> &str {
        self.product_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.site_url)
    }
}
