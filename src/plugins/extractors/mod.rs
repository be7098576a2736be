// Site extractor implementations
pub mod catalog;
pub mod ippodo;
pub mod marukyu;
pub mod nakamura;

pub use catalog::{CatalogExtractor, StockRule};

use crate::config::SitesConfig;

/// Vendors with a built-in extractor, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    Ippodo,
    Nakamura,
    Marukyu,
}

impl Vendor {
    pub const ALL: [Vendor; 3] = [Vendor::Ippodo, Vendor::Nakamura, Vendor::Marukyu];

    pub fn name(&self) -> &'static str {
        match self {
            Vendor::Ippodo => ippodo::NAME,
            Vendor::Nakamura => nakamura::NAME,
            Vendor::Marukyu => marukyu::NAME,
        }
    }

    pub fn extractor(&self, sites: &SitesConfig) -> CatalogExtractor {
        match self {
            Vendor::Ippodo => ippodo::extractor(&sites.ippodo_url),
            Vendor::Nakamura => nakamura::extractor(&sites.nakamura_url),
            Vendor::Marukyu => marukyu::extractor(&sites.marukyu_url),
        }
    }
}
