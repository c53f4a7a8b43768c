//! Error types for Ytmigrate core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Ytmigrate core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Credential acquisition failed. The run does not start.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// A listing page request failed.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The progress ledger could not be read or written.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The subscription input list could not be consumed.
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the credential provider boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The client configuration artifact is missing.
    #[error("client secrets file not found: {path}")]
    MissingClientSecrets {
        /// Expected location of the client secrets file.
        path: PathBuf,
    },

    /// No usable token exists in the token cache for this identity.
    #[error("no usable token for {label}: {reason}")]
    TokenUnavailable {
        /// Human-readable identity label (e.g. "Source Account").
        label: String,
        /// Why the token is unusable.
        reason: String,
    },

    /// An expired token could not be refreshed.
    #[error("token refresh failed for {label}: {reason}")]
    RefreshFailed {
        /// Human-readable identity label.
        label: String,
        /// Why the refresh failed.
        reason: String,
    },
}

/// Errors raised by the paginated fetcher.
///
/// A page failure is fatal for the fetch it belongs to; it is never
/// silently truncated into a partial listing.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A single page request failed while walking a listing.
    #[error("page request failed while listing {selector}: {message}")]
    PageRequestFailed {
        /// Which listing was being walked (for diagnostics).
        selector: String,
        /// The underlying remote error message.
        message: String,
    },
}

/// Errors raised by the progress ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger file could not be opened for appending.
    #[error("failed to open ledger at {path}: {reason}")]
    OpenFailed {
        /// Ledger file path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// The ledger file exists but could not be read.
    #[error("failed to read ledger at {path}: {reason}")]
    ReadFailed {
        /// Ledger file path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// An identifier could not be durably appended.
    #[error("failed to append to ledger at {path}: {reason}")]
    AppendFailed {
        /// Ledger file path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },
}

/// Errors raised while consuming the tabular subscription input.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input file does not exist.
    #[error("subscription list not found: {path}")]
    FileNotFound {
        /// Input file path.
        path: PathBuf,
    },

    /// The input file could not be opened or read.
    #[error("failed to read subscription list at {path}: {reason}")]
    ReadFailed {
        /// Input file path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// A row is missing required columns or is otherwise malformed.
    #[error("malformed row {row} in {path}: {reason}")]
    MalformedRow {
        /// Input file path.
        path: PathBuf,
        /// 1-based row number, counting the header as row 1.
        row: u64,
        /// Underlying reason.
        reason: String,
    },
}
