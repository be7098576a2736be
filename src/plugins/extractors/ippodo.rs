use super::catalog::{CatalogExtractor, StockRule};

pub const NAME: &str = "Ippodo";
pub const LINK_BASE: &str = "https://global.ippodo-tea.co.jp";
pub const BLACKLIST: &[&str] = &["Uji-Shimizu", "Fumi-no-tomo", "Packets"];

pub fn extractor(url: &str) -> CatalogExtractor {
    CatalogExtractor {
        name: NAME.to_string(),
        url: url.to_string(),
        product_selector: "li.m-product-card".to_string(),
        name_selector: ".m-product-card__name".to_string(),
        price_selector: ".m-product-card__price".to_string(),
        stock_rule: StockRule::MarkerElement(".product-form__submit.out-of-stock".to_string()),
        link_selector: Some(".m-product-card__name a".to_string()),
        link_base: Some(LINK_BASE.to_string()),
        blacklist: BLACKLIST.iter().map(|s| s.to_string()).collect(),
    }
}
