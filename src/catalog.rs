//! Catalog forms: product lookup and the add-product form.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::api::{NewProduct, ProductSearch};

/// Search results shown in the lookup dropdown.
pub const MAX_SEARCH_RESULTS: usize = 5;

/// Turn free text into a lookup: all digits means a barcode scan,
/// anything else is a name search. Blank input gives `None`.
pub fn search_query(input: &str) -> Option<ProductSearch> {
    let query = input.trim();
    if query.is_empty() {
        return None;
    }

    let is_barcode = query.chars().all(|c| c.is_ascii_digit());
    Some(ProductSearch {
        barcode: is_barcode.then(|| query.to_string()),
        name: (!is_barcode).then(|| query.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductFormError {
    #[error("all fields are required, missing: {0}")]
    Missing(&'static str),
    #[error("invalid purchase price: {0}")]
    InvalidPrice(String),
}

/// Raw text of the add-product form.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub sale_type: String,
    pub packaging: String,
    pub purchase_price: String,
    pub barcode: String,
}

impl ProductForm {
    /// Check every required field and parse the price.
    pub fn validate(&self) -> Result<NewProduct, ProductFormError> {
        let name = required(&self.name, "name")?;
        let sale_type = required(&self.sale_type, "sale type")?;
        let packaging = required(&self.packaging, "packaging")?;
        let raw_price = required(&self.purchase_price, "purchase price")?;

        let purchase_price = Decimal::from_str(&raw_price)
            .ok()
            .filter(|p| !p.is_sign_negative())
            .ok_or(ProductFormError::InvalidPrice(raw_price))?;

        let barcode = self.barcode.trim();
        Ok(NewProduct {
            name,
            sale_type,
            packaging,
            purchase_price,
            barcode: (!barcode.is_empty()).then(|| barcode.to_string()),
        })
    }

    /// Clear all fields after a successful add.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ProductFormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ProductFormError::Missing(field))
    } else {
        Ok(value.to_string())
    }
}
