use crate::block::Block;
use crate::ledger::Ledger;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const FOUND_MSG: &str = "Product details retrieved.";
const NOT_FOUND_MSG: &str = "Product not found.";
const NOT_AVAILABLE: &str = "NA";

/// What a customer sees about a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ProductView {
    pub temperature: i64,
    pub humidity: i64,
    pub product_id: String,
    pub product_quality: String,
    pub farm_id: String,
    pub is_found: String,
}

impl ProductView {
    fn from_block(block: &Block) -> Self {
        Self {
            temperature: block.temperature,
            humidity: block.humidity,
            product_id: block.product_id.clone(),
            product_quality: block
                .product_quality
                .map(|q| q.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.into()),
            farm_id: block.farm_id.clone(),
            is_found: FOUND_MSG.into(),
        }
    }

    /// Sentinel answer for an unknown product.
    pub fn not_found() -> Self {
        Self {
            temperature: 0,
            humidity: 0,
            product_id: NOT_AVAILABLE.into(),
            product_quality: NOT_AVAILABLE.into(),
            farm_id: NOT_AVAILABLE.into(),
            is_found: NOT_FOUND_MSG.into(),
        }
    }

    pub fn found(&self) -> bool {
        self.is_found == FOUND_MSG
    }
}

/// Read-only lookups over a shared ledger.
#[derive(Clone)]
pub struct QueryService {
    ledger: Arc<Ledger>,
}

impl QueryService {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// The full chain, copied.
    pub fn get_all(&self) -> Vec<Block> {
        self.ledger.snapshot()
    }

    /// Earliest block recorded for `product_id`, if any.
    pub fn find_by_product_id(&self, product_id: &str) -> Option<ProductView> {
        self.ledger.with_blocks(|blocks| {
            blocks
                .iter()
                .find(|b| b.product_id == product_id)
                .map(ProductView::from_block)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Event;

    fn submit(ledger: &Ledger, t: i64, h: i64, product: &str) {
        let p = ledger.propose(&Event {
            temperature: t,
            humidity: h,
            product_id: product.into(),
            farm_id: "farm1".into(),
        });
        assert!(p.appended);
    }

    #[test]
    fn first_match_wins() {
        let ledger = Arc::new(Ledger::new());
        submit(&ledger, 22, 42, "p1");
        submit(&ledger, 25, 45, "p2");
        submit(&ledger, 28, 48, "p1");

        let q = QueryService::new(ledger);
        let view = q.find_by_product_id("p1").unwrap();
        assert!(view.found());
        assert_eq!(view.temperature, 22);
        assert_eq!(view.humidity, 42);
        assert_eq!(view.product_quality, "Very Good");
        assert_eq!(view.farm_id, "farm1");

        let view = q.find_by_product_id("p2").unwrap();
        assert_eq!(view.product_quality, "Excellent");
    }

    #[test]
    fn unknown_product_is_none() {
        let q = QueryService::new(Arc::new(Ledger::new()));
        assert!(q.find_by_product_id("zzz").is_none());
    }

    #[test]
    fn not_found_sentinel_shape() {
        let view = ProductView::not_found();
        assert!(!view.found());
        assert_eq!(view.temperature, 0);
        assert_eq!(view.humidity, 0);
        assert_eq!(view.product_id, "NA");
        assert_eq!(view.product_quality, "NA");
        assert_eq!(view.farm_id, "NA");
    }

    #[test]
    fn get_all_is_a_copy() {
        let ledger = Arc::new(Ledger::new());
        let q = QueryService::new(ledger.clone());
        let mut all = q.get_all();
        all.clear();
        assert_eq!(ledger.len(), 1);
        assert_eq!(q.get_all().len(), 1);
    }

    #[test]
    fn view_serializes_with_pascal_case_fields() {
        let value = serde_json::to_value(ProductView::not_found()).unwrap();
        assert_eq!(value["IsFound"], "Product not found.");
        assert_eq!(value["ProductId"], "NA");
    }
}
