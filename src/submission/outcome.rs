use crate::api::{ApiError, OfferId};
use crate::state::IncompleteDraftError;

/// The backend didn't accept the offer. Nothing was created and the draft
/// is left as it was, so the same submission can be retried.
#[derive(Debug, thiserror::Error)]
#[error("failed to send offer: {source}")]
pub struct SubmissionError {
    pub source: ApiError,
}

impl SubmissionError {
    pub fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }
}

/// Why a submission could not be started or completed.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Incomplete(#[from] IncompleteDraftError),

    #[error("an offer is already being sent")]
    InFlight,

    #[error("no offer is being composed")]
    NoDraft,

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// What happened to the comment after the offer itself was created.
#[derive(Debug)]
pub enum CommentOutcome {
    /// Draft had no comment.
    NotRequested,
    Attached,
    /// The offer exists but without its comment. Not retried.
    Failed(ApiError),
}

/// Result of a submission whose first step succeeded.
#[derive(Debug)]
pub struct SubmissionReceipt {
    pub offer_id: OfferId,
    pub comment: CommentOutcome,
}

impl SubmissionReceipt {
    /// True unless the comment was lost.
    pub fn is_complete(&self) -> bool {
        !matches!(self.comment, CommentOutcome::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DraftField;

    #[test]
    fn test_receipt_completeness() {
        let receipt = SubmissionReceipt {
            offer_id: OfferId::new("o-1"),
            comment: CommentOutcome::NotRequested,
        };
        assert!(receipt.is_complete());

        let receipt = SubmissionReceipt {
            offer_id: OfferId::new("o-1"),
            comment: CommentOutcome::Failed(ApiError::NotFound),
        };
        assert!(!receipt.is_complete());
    }

    #[test]
    fn test_submit_error_messages() {
        let err = SubmitError::from(IncompleteDraftError {
            missing: vec![DraftField::PaymentMethod],
        });
        assert_eq!(err.to_string(), "offer is incomplete, missing: payment method");

        let err = SubmitError::from(SubmissionError {
            source: ApiError::SessionExpired,
        });
        assert_eq!(err.to_string(), "failed to send offer: session expired, log in again");
    }
}
