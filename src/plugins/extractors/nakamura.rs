use super::catalog::{CatalogExtractor, StockRule};

pub const NAME: &str = "Nakamura";
pub const LINK_BASE: &str = "https://global.tokichi.jp";
pub const BLACKLIST: &[&str] = &["Teaware", "Matcha Starter", "Matcha Standard"];

pub fn extractor(url: &str) -> CatalogExtractor {
    CatalogExtractor {
        name: NAME.to_string(),
        url: url.to_string(),
        product_selector: "li.grid__item".to_string(),
        // The card repeats the title link, only the first one counts
        name_selector: "h3.card__heading a".to_string(),
        price_selector: ".price__regular .price-item--regular".to_string(),
        stock_rule: StockRule::BadgeText {
            selector: "span.badge".to_string(),
            text: "Out of stock".to_string(),
        },
        link_selector: Some("h3.card__heading a".to_string()),
        link_base: Some(LINK_BASE.to_string()),
        blacklist: BLACKLIST.iter().map(|s| s.to_string()).collect(),
    }
}
