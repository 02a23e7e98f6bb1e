mod draft;
mod market;
mod pager;
mod payment;
mod selection;

pub use draft::{DraftField, IncompleteDraftError, OfferDraft, ValidatedDraft, ValidationMode};
pub use market::MarketContext;
pub use pager::Pager;
pub use payment::{PaymentMethod, UnknownPaymentMethod};
pub use selection::ProductSelection;
