use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;

use super::{MarketContext, PaymentMethod, ProductSelection};
use crate::api::{AgentId, CreateOfferPayload, OfferLine, Product, ProductId};

/// Field a draft is missing before it can be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Products,
    PaymentMethod,
    DeliveryDate,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Products => "products",
            Self::PaymentMethod => "payment method",
            Self::DeliveryDate => "delivery date",
        })
    }
}

/// The draft can't be submitted yet. Lists every missing field so the user
/// can be prompted for all of them at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("offer is incomplete, missing: {}", join_fields(.missing))]
pub struct IncompleteDraftError {
    pub missing: Vec<DraftField>,
}

fn join_fields(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// How much of the draft has to be filled in before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Products, payment method and delivery date (new offers).
    #[default]
    Strict,
    /// Products only (updates of an existing offer).
    Minimal,
}

/// An offer being composed for one market.
#[derive(Debug, Clone)]
pub struct OfferDraft {
    market: MarketContext,
    selections: Vec<ProductSelection>,
    payment_method: Option<PaymentMethod>,
    delivery_date: Option<NaiveDate>,
    comment: String,
    agent_id: Option<AgentId>,
}

impl OfferDraft {
    pub fn new(market: MarketContext) -> Self {
        Self {
            market,
            selections: Vec::new(),
            payment_method: None,
            delivery_date: None,
            comment: String::new(),
            agent_id: None,
        }
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.selections.iter().position(|s| s.product_id == product_id)
    }

    fn selection_mut(&mut self, product_id: ProductId) -> Option<&mut ProductSelection> {
        self.selections.iter_mut().find(|s| s.product_id == product_id)
    }

    // =========================================================================
    // PRODUCTS
    // =========================================================================

    /// Select a product, or deselect it if it is already in the draft.
    ///
    /// The first product added to a draft without an agent decides the
    /// agent for the whole offer. Products with no agent are skipped, so the
    /// agent comes from the first selected product that carries one.
    pub fn toggle_product(&mut self, product: &Product) -> &[ProductSelection] {
        match self.position(product.id) {
            Some(idx) => {
                self.selections.remove(idx);
            }
            None => {
                self.selections.push(ProductSelection::capture(product));
                if self.agent_id.is_none() {
                    self.agent_id = product.agent_id.clone();
                }
            }
        }
        &self.selections
    }

    /// Drop a product. Unknown ids are ignored.
    pub fn remove_product(&mut self, product_id: ProductId) {
        self.selections.retain(|s| s.product_id != product_id);
    }

    /// Set quantity from raw user input.
    ///
    /// Reads the leading integer, so `"12abc"` is 12 and `"3.5"` is 3.
    /// Input without one, or below 1, is ignored so a half-typed field never
    /// clobbers the stored value.
    pub fn set_quantity(&mut self, product_id: ProductId, raw: &str) {
        if let Some(quantity) = leading_quantity(raw) {
            self.set_quantity_to(product_id, quantity);
        }
    }

    /// Set an already parsed quantity. Returns whether it was applied;
    /// zero and unknown products are rejected.
    pub fn set_quantity_to(&mut self, product_id: ProductId, quantity: u32) -> bool {
        self.selection_mut(product_id)
            .is_some_and(|sel| sel.set_quantity(quantity))
    }

    pub fn increment_quantity(&mut self, product_id: ProductId) {
        if let Some(sel) = self.selection_mut(product_id) {
            sel.increment();
        }
    }

    /// Quantity never drops below 1.
    pub fn decrement_quantity(&mut self, product_id: ProductId) {
        if let Some(sel) = self.selection_mut(product_id) {
            sel.decrement();
        }
    }

    // =========================================================================
    // OFFER FIELDS
    // =========================================================================

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = Some(method);
    }

    pub fn set_delivery_date(&mut self, date: NaiveDate) {
        self.delivery_date = Some(date);
    }

    pub fn set_comment(&mut self, text: impl Into<String>) {
        self.comment = text.into();
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn market(&self) -> &MarketContext {
        &self.market
    }

    /// Selections in the order they were picked.
    pub fn selections(&self) -> &[ProductSelection] {
        &self.selections
    }

    pub fn selection(&self, product_id: ProductId) -> Option<&ProductSelection> {
        self.selections.iter().find(|s| s.product_id == product_id)
    }

    pub fn is_selected(&self, product_id: ProductId) -> bool {
        self.position(product_id).is_some()
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn delivery_date(&self) -> Option<NaiveDate> {
        self.delivery_date
    }

    /// Comment text, `None` when blank.
    pub fn comment(&self) -> Option<&str> {
        let trimmed = self.comment.trim();
        (!trimmed.is_empty()).then_some(self.comment.as_str())
    }

    pub fn agent_id(&self) -> Option<&AgentId> {
        self.agent_id.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Sum of quantity × unit price over all lines. `None` on overflow.
    pub fn compute_total(&self) -> Option<Decimal> {
        self.selections
            .iter()
            .try_fold(Decimal::ZERO, |total, sel| total.checked_add(sel.line_total()?))
    }

    // =========================================================================
    // SUBMISSION
    // =========================================================================

    /// Check the draft is complete enough to send.
    ///
    /// On success the returned handle is the only way to build a payload.
    pub fn validate_for_submission(
        &self,
        mode: ValidationMode,
    ) -> Result<ValidatedDraft<'_>, IncompleteDraftError> {
        let mut missing = Vec::new();
        if self.selections.is_empty() {
            missing.push(DraftField::Products);
        }
        if mode == ValidationMode::Strict {
            if self.payment_method.is_none() {
                missing.push(DraftField::PaymentMethod);
            }
            if self.delivery_date.is_none() {
                missing.push(DraftField::DeliveryDate);
            }
        }

        if missing.is_empty() {
            Ok(ValidatedDraft { draft: self })
        } else {
            Err(IncompleteDraftError { missing })
        }
    }

    /// Validate and build in one go.
    pub fn build_submission_payload(
        &self,
        mode: ValidationMode,
    ) -> Result<CreateOfferPayload, IncompleteDraftError> {
        self.validate_for_submission(mode)
            .map(|valid| valid.build_submission_payload())
    }
}

/// Leading optionally-signed integer of `raw`, if it is a valid quantity.
fn leading_quantity(raw: &str) -> Option<u32> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: u32 = rest[..end].parse().ok()?;
    (!negative && value >= 1).then_some(value)
}

/// A draft that passed validation, borrowed for payload construction.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedDraft<'a> {
    draft: &'a OfferDraft,
}

impl ValidatedDraft<'_> {
    /// Wire payload for `/offer/create`, lines in selection order.
    pub fn build_submission_payload(&self) -> CreateOfferPayload {
        let draft = self.draft;
        CreateOfferPayload {
            items: draft
                .selections
                .iter()
                .map(|s| OfferLine {
                    product_id: s.product_id,
                    amount: s.quantity(),
                })
                .collect(),
            delivery_date: draft.delivery_date,
            payment_method: draft.payment_method,
            agent_id: draft.agent_id.clone(),
            market_id: draft.market.market_id.clone(),
        }
    }
}
