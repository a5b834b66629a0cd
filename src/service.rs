//! The narrow contract between the routing layer and the ledger core.

use crate::block::{Block, Event};
use crate::ledger::Ledger;
use crate::query::{ProductView, QueryService};
use crate::quality::check_announcement;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the caller is told after submitting an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    Accepted(Block),
    Rejected(String),
    /// The payload could not be decoded; produced by the routing layer.
    Malformed(String),
}

impl SubmitResult {
    pub fn status_code(&self) -> u16 {
        match self {
            SubmitResult::Accepted(_) => 201,
            SubmitResult::Rejected(_) => 406,
            SubmitResult::Malformed(_) => 400,
        }
    }
}

/// Answer to a product lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found(ProductView),
    NotFound(ProductView),
}

impl LookupResult {
    pub fn status_code(&self) -> u16 {
        match self {
            LookupResult::Found(_) => 200,
            LookupResult::NotFound(_) => 404,
        }
    }

    pub fn view(&self) -> &ProductView {
        match self {
            LookupResult::Found(v) | LookupResult::NotFound(v) => v,
        }
    }
}

impl From<ProductView> for LookupResult {
    fn from(view: ProductView) -> Self {
        if view.found() {
            LookupResult::Found(view)
        } else {
            LookupResult::NotFound(view)
        }
    }
}

/// Shared handle given to every request handler.
#[derive(Clone)]
pub struct Provenance {
    ledger: Arc<Ledger>,
    query: QueryService,
    dump_chain: bool,
}

impl Provenance {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        let query = QueryService::new(ledger.clone());
        Self {
            ledger,
            query,
            dump_chain: false,
        }
    }

    /// Log the whole chain at debug level after every append.
    pub fn with_chain_dump(mut self, enabled: bool) -> Self {
        self.dump_chain = enabled;
        self
    }

    /// Propose `event` to the ledger and decide what the caller is told.
    ///
    /// The response and the append are decided by different predicates: an
    /// event with an empty farm id is answered `Accepted` but never appended.
    pub fn submit_event(&self, event: Event) -> SubmitResult {
        let proposal = self.ledger.propose(&event);
        let block = proposal.block;

        info!(
            index = block.index,
            product = %block.product_id,
            farm = %block.farm_id,
            quality = block.product_quality.map(|q| q.as_str()).unwrap_or(""),
            appended = proposal.appended,
            "event proposed"
        );
        if proposal.appended && self.dump_chain {
            debug!(chain = ?self.ledger.snapshot(), "ledger after append");
        }

        if block.index == 0 {
            // Genesis is never proposed; nothing to announce.
            return SubmitResult::Accepted(block);
        }
        match check_announcement(block.temperature, block.humidity) {
            Ok(()) => SubmitResult::Accepted(block),
            Err(err) => {
                warn!(index = block.index, product = %block.product_id, "{}", err);
                SubmitResult::Rejected(err.to_string())
            }
        }
    }

    pub fn lookup_product(&self, product_id: &str) -> LookupResult {
        let view = self.query.find_by_product_id(product_id).unwrap_or_else(|| {
            debug!(product = %product_id, "product not found");
            ProductView::not_found()
        });
        LookupResult::from(view)
    }

    pub fn get_all(&self) -> Vec<Block> {
        self.query.get_all()
    }
}
