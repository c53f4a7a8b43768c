//! Read-only projections of remote state and per-item transfer outcomes.
//!
//! `Collection` and `CollectionItem` are refreshed fully on each run;
//! nothing here is cached across runs. The only state that survives a
//! run is the progress ledger (see [`crate::ledger`]).

use serde::{Deserialize, Serialize};

/// A user-owned collection on the remote system (a playlist).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Remote identifier.
    pub id: String,
    /// Collection title.
    pub title: String,
    /// Collection description.
    pub description: String,
    /// Number of items reported by the remote system.
    pub item_count: u64,
}

/// A single item inside a collection (a video), or a flat-list entry
/// (a channel) when `collection_id` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionItem {
    /// Remote identifier. Identity of the item; uniqueness is enforced
    /// by the remote system, not re-validated locally.
    pub id: String,
    /// Human-readable title, used only for reporting.
    pub title: String,
    /// Identifier of the source collection this item belongs to.
    /// Empty for flat-list items (subscriptions).
    pub collection_id: String,
}

impl CollectionItem {
    /// Key under which this item is recorded in the progress ledger.
    ///
    /// Items that belong to a collection are scoped by their source
    /// collection so the same video appearing in two playlists is
    /// transferred into both. Flat-list items use the bare identifier.
    #[must_use]
    pub fn ledger_key(&self) -> String {
        if self.collection_id.is_empty() {
            self.id.clone()
        } else {
            format!("{}/{}", self.collection_id, self.id)
        }
    }
}

/// One page of a remote listing.
///
/// The continuation cursor is opaque; its absence signals that the
/// listing is exhausted.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on this page, in remote order.
    pub items: Vec<T>,
    /// Cursor for the next page, if any.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// A page with no items and no continuation.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }
}

/// Classified outcome of one mutating remote call.
///
/// Drives both the ledger update and the control flow of the run:
/// `Applied` and `AlreadyExists` record the item and continue,
/// `RateLimited` halts the remainder of the run, `Failed` skips the
/// item and continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The mutation was applied.
    Applied,
    /// The target relation already exists; treated as success.
    AlreadyExists {
        /// Raw remote message, kept for diagnostics.
        message: String,
    },
    /// The caller's rate/quota budget is exhausted.
    RateLimited {
        /// Raw remote message, kept for diagnostics.
        message: String,
    },
    /// Any other failure; the item stays pending for a future run.
    Failed {
        /// Raw remote message, kept for diagnostics.
        message: String,
    },
}

impl TransferOutcome {
    /// Whether this outcome records a ledger entry.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Applied | Self::AlreadyExists { .. })
    }
}
