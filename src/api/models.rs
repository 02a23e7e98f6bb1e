use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::state::PaymentMethod;

/// Product identifier as issued by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// The backend hands out some ids as strings (uuids) and some as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }
    };
}

opaque_id!(
    /// Salesperson the offer is booked under.
    AgentId
);
opaque_id!(
    /// Counterparty an offer is created for.
    MarketId
);
opaque_id!(
    /// Identifier returned by the backend once an offer is accepted.
    OfferId
);
opaque_id!(OfferItemId);

// =========================================================================
// AUTH
// =========================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub phone: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordRequest<'a> {
    pub phone: &'a str,
}

/// Access/refresh token pair issued at login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
}

// =========================================================================
// CATALOG
// =========================================================================

/// Catalog product as listed by `/products/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub packaging: String,
    #[serde(default)]
    pub sale_type: String,
    pub purchase_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
}

/// Body for `/products/add`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub sale_type: String,
    pub packaging: String,
    pub purchase_price: Decimal,
    pub barcode: Option<String>,
}

/// Body for `/products/details`. Exactly one of the fields is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSearch {
    pub barcode: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResults {
    #[serde(default)]
    pub data: Vec<Product>,
}

/// One page of a paginated listing.
///
/// Product listings report `total` (item count), offer listings report
/// `totalPages`; either may be absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl<T> Page<T> {
    /// Number of pages for this listing at the given page size.
    pub fn page_count(&self, limit: u32) -> u32 {
        if let Some(pages) = self.total_pages {
            return pages;
        }
        match self.total {
            Some(total) if limit > 0 => {
                u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
            }
            _ => 0,
        }
    }
}

// =========================================================================
// MARKETS & OFFERS
// =========================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: MarketId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Row of `/offer/all/{marketId}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferSummary {
    pub offer_id: OfferId,
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub refunded: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferItem {
    #[serde(default)]
    pub id: Option<OfferItemId>,
    pub product_name: String,
    #[serde(default)]
    pub packaging: String,
    #[serde(default)]
    pub sale_type: String,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    pub amount: u32,
    #[serde(default)]
    pub refunded: bool,
}

/// Full offer as returned by `/offer/{offerId}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDetails {
    #[serde(default)]
    pub market_name: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub offer_status: Option<String>,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub refunded: bool,
    #[serde(default)]
    pub items: Vec<OfferItem>,
}

// =========================================================================
// SUBMISSION
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferLine {
    pub product_id: ProductId,
    pub amount: u32,
}

/// Body for `/offer/create`. The comment is sent separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferPayload {
    pub items: Vec<OfferLine>,
    #[serde(with = "iso_date", skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(rename = "paymentType", skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    pub agent_id: Option<AgentId>,
    pub market_id: MarketId,
}

/// Body for `/offer/comment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub offer_id: OfferId,
    pub text: String,
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.collect_str(&d.format("%Y-%m-%d")),
            None => s.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let m: Market = serde_json::from_str(r#"{"id": 12, "name": "Chorsu"}"#).unwrap();
        assert_eq!(m.id, MarketId::new("12"));

        let m: Market = serde_json::from_str(r#"{"id": "a-b-c", "name": "Chorsu"}"#).unwrap();
        assert_eq!(m.id.as_str(), "a-b-c");
    }

    #[test]
    fn test_product_page_page_count() {
        let page: Page<Product> = serde_json::from_str(
            r#"{"data": [{"id": 1, "name": "Tea", "packaging": "box",
                "saleType": "piece", "purchasePrice": 12000, "agentId": "ag-1"}],
                "total": 9}"#,
        )
        .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].purchase_price, dec!(12000));
        assert_eq!(page.data[0].agent_id, Some(AgentId::new("ag-1")));
        assert_eq!(page.page_count(4), 3);
    }

    #[test]
    fn test_offer_page_uses_server_page_count() {
        let page: Page<OfferSummary> = serde_json::from_str(
            r#"{"data": [{"offerId": "o-1", "totalPrice": 4000, "status": "NEW"}],
                "totalPages": 7}"#,
        )
        .unwrap();

        assert_eq!(page.page_count(10), 7);
        assert!(!page.data[0].refunded);
    }

    #[test]
    fn test_payload_shape() {
        let payload = CreateOfferPayload {
            items: vec![OfferLine { product_id: ProductId(7), amount: 2 }],
            delivery_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            payment_method: Some(PaymentMethod::BankTransfer),
            agent_id: Some(AgentId::new("ag-1")),
            market_id: MarketId::new("m-3"),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "items": [{"productId": 7, "amount": 2}],
                "deliveryDate": "2024-05-01",
                "paymentType": "bank_transfer",
                "agentId": "ag-1",
                "marketId": "m-3",
            })
        );
    }

    #[test]
    fn test_payload_omits_unset_fields() {
        let payload = CreateOfferPayload {
            items: vec![OfferLine { product_id: ProductId(1), amount: 1 }],
            delivery_date: None,
            payment_method: None,
            agent_id: None,
            market_id: MarketId::new("m"),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("deliveryDate").is_none());
        assert!(json.get("paymentType").is_none());
        assert_eq!(json["agentId"], serde_json::Value::Null);
    }
}
