//! Restock detection.
//!
//! Keeps the last observed availability of every product name and turns each
//! new observation into a [`StockTransition`]. Only [`StockTransition::Restocked`]
//! produces a [`RestockEvent`]; everything else just updates the retained state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Product, RestockEvent};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StockTransition {
    /// No prior observation for this name.
    FirstSeen,
    Restocked,
    StillInStock,
    StillOutOfStock,
    WentOutOfStock,
}

impl StockTransition {
    pub fn between(previous: Option<bool>, current: bool) -> Self {
        match (previous, current) {
            (None, _) => StockTransition::FirstSeen,
            (Some(false), true) => StockTransition::Restocked,
            (Some(true), true) => StockTransition::StillInStock,
            (Some(false), false) => StockTransition::StillOutOfStock,
            (Some(true), false) => StockTransition::WentOutOfStock,
        }
    }

    pub fn should_alert(&self) -> bool {
        matches!(self, StockTransition::Restocked)
    }
}

/// Last known availability per product name.
#[derive(Debug, Clone, Default)]
pub struct StockState {
    last_known: HashMap<String, bool>,
}

impl StockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.last_known.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.last_known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_known.is_empty()
    }

    /// Record one observation and report what kind of change it was.
    pub fn record(&mut self, name: &str, in_stock: bool) -> StockTransition {
        let previous = self.last_known.insert(name.to_string(), in_stock);
        StockTransition::between(previous, in_stock)
    }

    /// Apply a site's scrape results in order, returning the restocks found.
    ///
    /// Performs no I/O; sending notifications for the returned events is up to
    /// the caller.
    pub fn observe(
        &mut self,
        site: &str,
        site_url: &str,
        products: &[Product],
    ) -> Vec<RestockEvent> {
        let mut restocks = Vec::new();

        for product in products {
            let transition = self.record(&product.name, product.in_stock);
            tracing::trace!("{}: {} -> {:?}", site, product.name, transition);

            if transition.should_alert() {
                restocks.push(RestockEvent::new(site, site_url, product));
            }
        }

        restocks
    }

    /// Force every given product to "out of stock" so the next cycle reports
    /// anything currently available as a restock.
    pub fn mark_all_out_of_stock(&mut self, products: &[Product]) {
        for product in products {
            self.last_known.insert(product.name.clone(), false);
        }
    }
}
