use rust_decimal::Decimal;
use tracing::warn;

use crate::api::{Product, ProductId};

/// One product line in a draft.
///
/// Descriptive fields and price are copied when the product is picked, so
/// later catalog edits don't change a draft in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSelection {
    pub product_id: ProductId,
    pub name: String,
    pub packaging: String,
    pub sale_type: String,
    /// Price per unit at selection time (never negative)
    pub unit_price: Decimal,
    quantity: u32,
}

impl ProductSelection {
    /// Capture a catalog product with quantity 1.
    pub fn capture(product: &Product) -> Self {
        let unit_price = if product.purchase_price < Decimal::ZERO {
            warn!(product_id = %product.id, price = %product.purchase_price, "negative price, clamping to 0");
            Decimal::ZERO
        } else {
            product.purchase_price
        };

        Self {
            product_id: product.id,
            name: product.name.clone(),
            packaging: product.packaging.clone(),
            sale_type: product.sale_type.clone(),
            unit_price,
            quantity: 1,
        }
    }

    /// Always >= 1.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Set quantity. Zero is rejected; returns whether the value was taken.
    pub(crate) fn set_quantity(&mut self, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        self.quantity = quantity;
        true
    }

    pub(crate) fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// No-op at 1.
    pub(crate) fn decrement(&mut self) {
        if self.quantity > 1 {
            self.quantity -= 1;
        }
    }

    /// quantity × unit price, `None` if it doesn't fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(price: Decimal) -> Product {
        Product {
            id: ProductId(3),
            name: "Green tea".to_string(),
            packaging: "20 x 100g".to_string(),
            sale_type: "box".to_string(),
            purchase_price: price,
            barcode: None,
            agent_id: None,
        }
    }

    #[test]
    fn test_capture() {
        let sel = ProductSelection::capture(&product(dec!(1500)));
        assert_eq!(sel.product_id, ProductId(3));
        assert_eq!(sel.packaging, "20 x 100g");
        assert_eq!(sel.quantity(), 1);
        assert_eq!(sel.line_total(), Some(dec!(1500)));
    }

    #[test]
    fn test_capture_clamps_negative_price() {
        let sel = ProductSelection::capture(&product(dec!(-5)));
        assert_eq!(sel.unit_price, Decimal::ZERO);
    }

    #[test]
    fn test_quantity_floor() {
        let mut sel = ProductSelection::capture(&product(dec!(10)));

        sel.decrement();
        assert_eq!(sel.quantity(), 1);

        assert!(!sel.set_quantity(0));
        assert_eq!(sel.quantity(), 1);

        sel.increment();
        sel.increment();
        assert_eq!(sel.quantity(), 3);
        assert_eq!(sel.line_total(), Some(dec!(30)));
    }

    #[test]
    fn test_line_total_overflow() {
        let mut sel = ProductSelection::capture(&product(Decimal::MAX));
        assert_eq!(sel.line_total(), Some(Decimal::MAX));

        sel.increment();
        assert_eq!(sel.line_total(), None);
    }
}
