//! The remote resource API boundary.
//!
//! The core never talks HTTP directly; it drives this trait. The
//! production implementation lives in [`crate::youtube`], and tests
//! substitute a mock or an in-memory fake.

use thiserror::Error;

use crate::model::{Collection, CollectionItem, Page};

/// Raw error signal from the remote API.
///
/// Carries the structured reason code when the remote system provides
/// one, plus the full message for diagnostics and for last-resort
/// classification (see [`crate::classify`]).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status, if the request reached the server.
    pub status: Option<u16>,
    /// Structured error reason code (e.g. "quotaExceeded"), if present.
    pub reason: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// A transport-level error with no structured information.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            reason: None,
            message: message.into(),
        }
    }
}

/// Result type for individual remote calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Remote resource collection provider.
///
/// Paged listings take an opaque continuation cursor; `None` starts at
/// the beginning, and a page without a `next_cursor` ends the listing.
#[cfg_attr(test, mockall::automock)]
pub trait ResourceApi {
    /// List one page of collections owned by the authenticated identity.
    fn list_collections<'a>(&self, cursor: Option<&'a str>) -> ApiResult<Page<Collection>>;

    /// List one page of items within the named collection.
    fn list_collection_items<'a>(
        &self,
        collection_id: &str,
        cursor: Option<&'a str>,
    ) -> ApiResult<Page<CollectionItem>>;

    /// Create a new collection and return its identifier.
    fn create_collection(&self, title: &str, description: &str) -> ApiResult<String>;

    /// Add one item to a collection.
    fn add_item_to_collection(&self, collection_id: &str, item_id: &str) -> ApiResult<()>;

    /// Subscribe the authenticated identity to a channel.
    fn subscribe(&self, channel_id: &str) -> ApiResult<()>;
}
