use crate::api::{Market, MarketId};

/// Which market an offer is being composed for.
/// Set once when the draft is opened and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketContext {
    pub market_id: MarketId,
    /// Display name, when the caller came from the market list
    pub market_name: Option<String>,
}

impl MarketContext {
    pub fn new(market_id: MarketId) -> Self {
        Self {
            market_id,
            market_name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.market_name = Some(name.into());
        self
    }

    /// Name for display, falling back to the id.
    pub fn label(&self) -> &str {
        self.market_name
            .as_deref()
            .unwrap_or_else(|| self.market_id.as_str())
    }
}

impl From<&Market> for MarketContext {
    fn from(market: &Market) -> Self {
        Self::new(market.id.clone()).with_name(market.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_falls_back_to_id() {
        let ctx = MarketContext::new(MarketId::new("m-1"));
        assert_eq!(ctx.label(), "m-1");

        let ctx = ctx.with_name("Chorsu bazaar");
        assert_eq!(ctx.label(), "Chorsu bazaar");
    }

    #[test]
    fn test_from_market() {
        let market = Market {
            id: MarketId::new("9"),
            name: "Alay".to_string(),
            address: None,
            created_at: None,
        };
        let ctx = MarketContext::from(&market);
        assert_eq!(ctx.market_id, MarketId::new("9"));
        assert_eq!(ctx.market_name.as_deref(), Some("Alay"));
    }
}
