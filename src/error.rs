//! Error taxonomy shared by every entry point.
//!
//! Each variant is terminal for the call that produced it. Entry points
//! validate before writing, so an error never leaves partial state behind.

use crate::disclosure::RequestId;
use crate::types::UserId;

#[derive(Debug, thiserror::Error)]
pub enum BubbleError {
    /// Referenced user record is absent
    #[error("no {what} record for user {user}")]
    NotFound { what: &'static str, user: UserId },

    /// A per-category vector disagrees with the registry size
    #[error("{field} has {actual} entries, expected {expected}")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("category {0:?} already registered")]
    DuplicateCategory(String),

    /// Reveal requested before an analysis was stored
    #[error("no completed analysis for user {0}")]
    NotComplete(UserId),

    #[error("result for user {0} already revealed")]
    AlreadyRevealed(UserId),

    /// A disclosure for this user is still outstanding
    #[error("disclosure {request_id} still pending for user {user}")]
    DisclosurePending { user: UserId, request_id: RequestId },

    #[error("no pending disclosure for request {0}")]
    UnknownRequest(RequestId),

    /// Cleartexts failed authentication. Never carries the cleartexts.
    #[error("disclosure proof rejected for request {0}")]
    InvalidProof(RequestId),

    /// The disclosure capability could not take the request
    #[error("disclosure capability unavailable: {0}")]
    DisclosureUnavailable(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BubbleError>;
