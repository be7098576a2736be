use super::catalog::{CatalogExtractor, StockRule};

pub const NAME: &str = "Marukyu";

pub fn extractor(url: &str) -> CatalogExtractor {
    CatalogExtractor {
        name: NAME.to_string(),
        url: url.to_string(),
        product_selector: "li.product".to_string(),
        name_selector: ".product-name h4".to_string(),
        price_selector: ".product-price .woocs_price_code.woocs_price_USD .woocommerce-Price-amount"
            .to_string(),
        stock_rule: StockRule::ClassContains("outofstock".to_string()),
        // WooCommerce listing links are already absolute
        link_selector: Some("a.woocommerce-loop-product__link".to_string()),
        link_base: None,
        blacklist: Vec::new(),
    }
}
