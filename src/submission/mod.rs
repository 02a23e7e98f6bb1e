mod outcome;

pub use outcome::{CommentOutcome, SubmissionError, SubmissionReceipt, SubmitError};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError, CommentPayload, CreateOfferPayload, OfferId};
use crate::state::{MarketContext, OfferDraft, ValidationMode};

/// Where finished offers are sent.
#[async_trait]
pub trait OfferSink: Send + Sync {
    async fn create_offer(&self, payload: &CreateOfferPayload) -> Result<OfferId, ApiError>;
    async fn attach_comment(&self, payload: &CommentPayload) -> Result<(), ApiError>;
}

#[async_trait]
impl OfferSink for ApiClient {
    async fn create_offer(&self, payload: &CreateOfferPayload) -> Result<OfferId, ApiError> {
        ApiClient::create_offer(self, payload).await
    }

    async fn attach_comment(&self, payload: &CommentPayload) -> Result<(), ApiError> {
        ApiClient::attach_comment(self, payload).await
    }
}

/// Snapshot of a draft taken when the user hit send.
///
/// Edits made to the draft afterwards don't affect it.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub payload: CreateOfferPayload,
    pub comment: Option<String>,
    ticket: u64,
}

/// Send an offer: create it, then attach the comment if there is one.
///
/// If creation fails nothing else is sent. If only the comment fails the
/// offer stands and the receipt says so.
#[instrument(skip_all, fields(market = %pending.payload.market_id))]
pub async fn submit_offer<S: OfferSink + ?Sized>(
    sink: &S,
    pending: &PendingSubmission,
) -> Result<SubmissionReceipt, SubmissionError> {
    let offer_id = sink
        .create_offer(&pending.payload)
        .await
        .map_err(|source| SubmissionError { source })?;
    info!(offer = %offer_id, "offer created");

    let comment = match &pending.comment {
        None => CommentOutcome::NotRequested,
        Some(text) => {
            let payload = CommentPayload {
                offer_id: offer_id.clone(),
                text: text.clone(),
            };
            match sink.attach_comment(&payload).await {
                Ok(()) => CommentOutcome::Attached,
                Err(e) => {
                    warn!(offer = %offer_id, error = %e, "offer created without its comment");
                    CommentOutcome::Failed(e)
                }
            }
        }
    };

    Ok(SubmissionReceipt { offer_id, comment })
}

/// Owns the one offer being composed and guards against double sends.
#[derive(Debug, Default)]
pub struct OfferDraftManager {
    draft: Option<OfferDraft>,
    tickets: u64,
    /// Ticket of the send currently awaited
    in_flight: Option<u64>,
}

impl OfferDraftManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh draft for a market, dropping any previous one.
    ///
    /// A send still running for the old draft is abandoned: its outcome no
    /// longer blocks or discards anything.
    pub fn open(&mut self, market: MarketContext) -> &mut OfferDraft {
        self.in_flight = None;
        self.draft.insert(OfferDraft::new(market))
    }

    pub fn draft(&self) -> Option<&OfferDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut OfferDraft> {
        self.draft.as_mut()
    }

    /// Throw the draft away (user navigated off). Abandons any send in
    /// progress.
    pub fn discard(&mut self) {
        self.in_flight = None;
        self.draft = None;
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Stop waiting for the current send and keep the draft as it is.
    ///
    /// For callers that drop the request future or give up on the response.
    /// A later `finish_submission` for the abandoned send leaves the guard
    /// alone.
    pub fn abandon_submission(&mut self) {
        if self.in_flight.take().is_some() {
            warn!("submission abandoned before it settled");
        }
    }

    /// Validate and snapshot the draft. Only one submission at a time.
    pub fn begin_submission(&mut self, mode: ValidationMode) -> Result<PendingSubmission, SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::InFlight);
        }
        let draft = self.draft.as_ref().ok_or(SubmitError::NoDraft)?;
        let payload = draft.validate_for_submission(mode)?.build_submission_payload();

        self.tickets += 1;
        self.in_flight = Some(self.tickets);
        Ok(PendingSubmission {
            payload,
            comment: draft.comment().map(str::to_string),
            ticket: self.tickets,
        })
    }

    /// Record how a submission ended.
    ///
    /// Success discards the draft it was taken from; failure keeps it as is
    /// so the user can retry. Outcomes of abandoned sends are ignored.
    pub fn finish_submission(
        &mut self,
        pending: &PendingSubmission,
        result: &Result<SubmissionReceipt, SubmissionError>,
    ) {
        if self.in_flight != Some(pending.ticket) {
            debug!(ticket = pending.ticket, "ignoring outcome of abandoned submission");
            return;
        }
        self.in_flight = None;
        if result.is_ok() {
            self.draft = None;
        }
    }

    /// Validate, send and settle in one call.
    ///
    /// If this future is dropped before it completes the manager stays busy
    /// until [`abandon_submission`](Self::abandon_submission), `open` or
    /// `discard` is called.
    pub async fn submit<S: OfferSink + ?Sized>(
        &mut self,
        sink: &S,
        mode: ValidationMode,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let pending = self.begin_submission(mode)?;
        let result = submit_offer(sink, &pending).await;
        self.finish_submission(&pending, &result);
        Ok(result?)
    }
}
