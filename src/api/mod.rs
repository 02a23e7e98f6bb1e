mod client;
mod error;
mod models;

pub use client::ApiClient;
pub use error::ApiError;
pub use models::{
    AgentId, CommentPayload, CreateOfferPayload, LoginRequest, Market, MarketId, NewProduct,
    OfferDetails, OfferId, OfferItem, OfferItemId, OfferLine, OfferSummary, Page, Product,
    ProductId, ProductSearch, RefreshRequest, ResetPasswordRequest, Tokens,
};
