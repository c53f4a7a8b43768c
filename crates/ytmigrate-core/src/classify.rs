//! Classification of raw remote errors into transfer outcomes.
//!
//! The classifier prefers the structured reason code attached to the
//! error; message-substring inspection is only a fallback for errors
//! that arrive without one. Anything it cannot place defaults to
//! [`TransferOutcome::Failed`] (continue), never
//! [`TransferOutcome::RateLimited`] (halt), so a transient error cannot
//! spuriously abort a whole run.

use crate::api::{ApiError, ApiResult};
use crate::model::TransferOutcome;

/// Reason codes indicating the target relation already exists.
const DUPLICATE_REASONS: &[&str] = &[
    "subscriptionDuplicate",
    "videoAlreadyInPlaylist",
    "playlistItemDuplicate",
];

/// Reason codes indicating the caller's rate/quota budget is exhausted.
const RATE_LIMIT_REASONS: &[&str] = &[
    "quotaExceeded",
    "dailyLimitExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
];

/// Classify a raw remote error into a transfer outcome.
#[must_use]
pub fn classify(error: &ApiError) -> TransferOutcome {
    if let Some(reason) = &error.reason {
        if DUPLICATE_REASONS.contains(&reason.as_str()) {
            return TransferOutcome::AlreadyExists {
                message: error.message.clone(),
            };
        }
        if RATE_LIMIT_REASONS.contains(&reason.as_str()) {
            return TransferOutcome::RateLimited {
                message: error.message.clone(),
            };
        }
        // A known-structured but unrecognized reason is not ambiguous
        // enough to halt on.
        return TransferOutcome::Failed {
            message: error.message.clone(),
        };
    }

    // Last resort: inspect the message text.
    if DUPLICATE_REASONS.iter().any(|r| error.message.contains(r)) {
        return TransferOutcome::AlreadyExists {
            message: error.message.clone(),
        };
    }
    if RATE_LIMIT_REASONS.iter().any(|r| error.message.contains(r)) {
        return TransferOutcome::RateLimited {
            message: error.message.clone(),
        };
    }

    TransferOutcome::Failed {
        message: error.message.clone(),
    }
}

/// Classify the result of one mutating remote call.
#[must_use]
pub fn classify_mutation(result: ApiResult<()>) -> TransferOutcome {
    match result {
        Ok(()) => TransferOutcome::Applied,
        Err(e) => classify(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structured(reason: &str, message: &str) -> ApiError {
        ApiError {
            status: Some(403),
            reason: Some(reason.to_string()),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_duplicate_reason_codes() {
        for reason in ["subscriptionDuplicate", "videoAlreadyInPlaylist"] {
            let outcome = classify(&structured(reason, "already there"));
            assert!(
                matches!(outcome, TransferOutcome::AlreadyExists { .. }),
                "reason {reason} should classify as duplicate"
            );
        }
    }

    #[test]
    fn test_rate_limit_reason_codes() {
        for reason in ["quotaExceeded", "rateLimitExceeded"] {
            let outcome = classify(&structured(reason, "budget exhausted"));
            assert!(
                matches!(outcome, TransferOutcome::RateLimited { .. }),
                "reason {reason} should classify as rate-limited"
            );
        }
    }

    #[test]
    fn test_unknown_reason_is_failure_not_halt() {
        let outcome = classify(&structured("backendError", "transient backend error"));
        assert!(matches!(outcome, TransferOutcome::Failed { .. }));
    }

    #[test]
    fn test_message_fallback_duplicate() {
        let err = ApiError::transport("HttpError 400: subscriptionDuplicate");
        assert!(matches!(
            classify(&err),
            TransferOutcome::AlreadyExists { .. }
        ));
    }

    #[test]
    fn test_message_fallback_quota() {
        let err = ApiError::transport("HttpError 403: quotaExceeded for this project");
        assert!(matches!(classify(&err), TransferOutcome::RateLimited { .. }));
    }

    #[test]
    fn test_ambiguous_message_defaults_to_failure() {
        let err = ApiError::transport("connection timed out");
        assert!(matches!(classify(&err), TransferOutcome::Failed { .. }));
    }

    #[test]
    fn test_structured_reason_wins_over_message() {
        // A message mentioning quota must not halt the run when the
        // structured reason says otherwise.
        let err = structured("videoNotFound", "video removed; quotaExceeded text in body");
        assert!(matches!(classify(&err), TransferOutcome::Failed { .. }));
    }

    #[test]
    fn test_classify_mutation_success() {
        assert_eq!(classify_mutation(Ok(())), TransferOutcome::Applied);
    }

    #[test]
    fn test_raw_message_is_preserved() {
        let err = structured("subscriptionDuplicate", "the exact server text");
        match classify(&err) {
            TransferOutcome::AlreadyExists { message } => {
                assert_eq!(message, "the exact server text");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
