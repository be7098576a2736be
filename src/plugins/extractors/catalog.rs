use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::models::Product;
use crate::plugins::traits::SiteExtractor;
use crate::utils::error::AppError;

/// How a vendor marks a product card as unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockRule {
    /// Out of stock when the card contains an element matching the selector.
    MarkerElement(String),
    /// Out of stock when an element matching `selector` has `text` in it.
    BadgeText { selector: String, text: String },
    /// Out of stock when the card's own `class` attribute contains the substring.
    ClassContains(String),
}

/// Selector-driven extractor for a product listing page.
#[derive(Debug, Clone)]
pub struct CatalogExtractor {
    pub name: String,
    pub url: String,
    pub product_selector: String,
    pub name_selector: String,
    pub price_selector: String,
    pub stock_rule: StockRule,
    pub link_selector: Option<String>,
    /// Prefixed to relative product links.
    pub link_base: Option<String>,
    pub blacklist: Vec<String>,
}

struct CompiledSelectors {
    product: Selector,
    name: Selector,
    price: Selector,
    link: Option<Selector>,
    stock_marker: Option<Selector>,
}

impl CatalogExtractor {
    fn compile(&self) -> Result<CompiledSelectors, AppError> {
        let stock_marker = match &self.stock_rule {
            StockRule::MarkerElement(selector) => Some(parse_selector(selector)?),
            StockRule::BadgeText { selector, .. } => Some(parse_selector(selector)?),
            StockRule::ClassContains(_) => None,
        };

        Ok(CompiledSelectors {
            product: parse_selector(&self.product_selector)?,
            name: parse_selector(&self.name_selector)?,
            price: parse_selector(&self.price_selector)?,
            link: self.link_selector.as_deref().map(parse_selector).transpose()?,
            stock_marker,
        })
    }

    fn is_out_of_stock(&self, card: ElementRef, marker: Option<&Selector>) -> bool {
        match (&self.stock_rule, marker) {
            (StockRule::MarkerElement(_), Some(marker)) => card.select(marker).next().is_some(),
            (StockRule::BadgeText { text, .. }, Some(marker)) => card
                .select(marker)
                .any(|badge| element_text(badge).contains(text.as_str())),
            (StockRule::ClassContains(needle), _) => card
                .value()
                .attr("class")
                .is_some_and(|classes| classes.contains(needle.as_str())),
            _ => false,
        }
    }

    /// Resolve an href against `link_base`. Without a base, or when the base
    /// does not parse, the href is returned as scraped.
    fn resolve_link(&self, href: &str) -> String {
        let Some(base) = &self.link_base else {
            return href.to_string();
        };

        match Url::parse(base).and_then(|base| base.join(href)) {
            Ok(url) => url.to_string(),
            Err(e) => {
                debug!("{}: could not resolve link {} against {}: {}", self.name, href, base, e);
                href.to_string()
            }
        }
    }
}

impl SiteExtractor for CatalogExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn extract(&self, html: &str) -> Result<Vec<Product>, AppError> {
        let selectors = self.compile()?;
        let document = Html::parse_document(html);

        let mut products = Vec::new();

        for card in document.select(&selectors.product) {
            let name = first_text(card, &selectors.name);
            if name.is_empty() {
                debug!("{}: skipping product card without a name", self.name);
                continue;
            }

            let url = selectors
                .link
                .as_ref()
                .and_then(|link| card.select(link).next())
                .and_then(|anchor| anchor.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty())
                .map(|href| self.resolve_link(href));

            let product = Product {
                name,
                price: joined_text(card, &selectors.price),
                in_stock: !self.is_out_of_stock(card, selectors.stock_marker.as_ref()),
                url,
            };

            if product.matches_any(&self.blacklist) {
                debug!("{}: skipping blacklisted product {}", self.name, product.name);
                continue;
            }

            products.push(product);
        }

        debug!("{}: extracted {} products", self.name, products.len());
        Ok(products)
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, AppError> {
    Selector::parse(selector).map_err(|e| AppError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Concatenated text content with whitespace runs collapsed.
fn element_text(element: ElementRef) -> String {
    let text: String = element.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(card: ElementRef, selector: &Selector) -> String {
    card.select(selector).next().map(element_text).unwrap_or_default()
}

/// Text of every match, space separated. Sale cards carry both the regular
/// and the reduced price.
fn joined_text(card: ElementRef, selector: &Selector) -> String {
    card.select(selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
