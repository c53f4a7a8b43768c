//! `Ytmigrate` Core Library
//!
//! This crate provides the core functionality for the `Ytmigrate` tool:
//! - Paginated fetching of remote playlist and item listings
//! - A durable, append-only progress ledger for resumable runs
//! - A per-item transfer executor with outcome classification
//! - Run orchestration for playlist and subscription migrations
//! - `YouTube` Data API v3 client and OAuth credential handling
//! - Application configuration management
//!
//! # Error Handling
//!
//! This crate uses typed errors for each domain. See the [`error`]
//! module for details.
//!
//! ```rust,ignore
//! use ytmigrate_core::{Error, Result};
//!
//! fn do_something() -> Result<()> {
//!     // Your code here
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod classify;
pub mod config;
pub mod error;
pub mod executor;
pub mod fetch;
pub mod ledger;
pub mod model;
pub mod orchestrator;
pub mod subscriptions;
pub mod youtube;

pub use api::{ApiError, ApiResult, ResourceApi};
pub use auth::{Credential, CredentialProvider, OauthTokenProvider};
pub use classify::{classify, classify_mutation};
pub use config::{ConfigManager, MigrationConfig};
pub use error::{Error, Result};
pub use executor::{ExecutorReport, ItemFailure, TransferExecutor};
pub use fetch::{MAX_PAGE_SIZE, fetch_all};
pub use ledger::ProgressLedger;
pub use model::{Collection, CollectionItem, Page, TransferOutcome};
pub use orchestrator::{
    CollectionOutcome, CollectionSelection, MIGRATED_TITLE_SUFFIX, MigrationOrchestrator,
    RunReport,
};
pub use subscriptions::{SubscriptionEntry, read_subscriptions};
pub use youtube::{API_BASE_URL, YouTubeApi};
