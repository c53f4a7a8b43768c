//! End-to-end migration runs.
//!
//! The orchestrator composes the pagination driver, the executor, and
//! the ledger into the two supported migrations: playlists (source
//! account to destination account) and subscriptions (exported CSV to
//! destination account). A rate-limit halt anywhere stops the whole
//! run; a fetch or creation failure on one collection abandons only
//! that collection.

use tracing::{error, info, warn};

use crate::api::ResourceApi;
use crate::classify::classify;
use crate::error::Result;
use crate::executor::{ExecutorReport, TransferExecutor};
use crate::fetch::fetch_all;
use crate::ledger::ProgressLedger;
use crate::model::{Collection, CollectionItem, TransferOutcome};
use crate::subscriptions::SubscriptionEntry;

/// Suffix appended to migrated collection titles.
pub const MIGRATED_TITLE_SUFFIX: &str = " (Migrated)";

/// Which source collections a playlist run covers.
#[derive(Debug, Clone)]
pub enum CollectionSelection {
    /// Every collection the source account owns.
    All,
    /// Only the named collection identifiers.
    Ids(Vec<String>),
}

impl CollectionSelection {
    fn includes(&self, collection: &Collection) -> bool {
        match self {
            Self::All => true,
            Self::Ids(ids) => ids.iter().any(|id| id == &collection.id),
        }
    }
}

/// Result of migrating one source collection.
#[derive(Debug)]
pub struct CollectionOutcome {
    /// The source collection.
    pub source: Collection,
    /// Identifier of the created destination collection, if creation
    /// got that far.
    pub destination_id: Option<String>,
    /// Executor tally for the collection's items.
    pub report: ExecutorReport,
    /// Collection-level error that abandoned this collection, if any.
    pub error: Option<String>,
}

/// Aggregate result of one migration run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Per-collection outcomes, in source order.
    pub collections: Vec<CollectionOutcome>,
    /// Whether the run halted on a rate-limit.
    pub halted: bool,
    /// Raw remote message of the halting error, if any.
    pub halt_message: Option<String>,
}

impl RunReport {
    /// Sum of items applied across all collections.
    #[must_use]
    pub fn total_applied(&self) -> usize {
        self.collections.iter().map(|c| c.report.applied).sum()
    }

    /// Sum of items skipped across all collections.
    #[must_use]
    pub fn total_skipped(&self) -> usize {
        self.collections.iter().map(|c| c.report.skipped).sum()
    }

    /// Sum of items failed across all collections.
    #[must_use]
    pub fn total_failed(&self) -> usize {
        self.collections.iter().map(|c| c.report.failed.len()).sum()
    }

    /// Multi-line human summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for outcome in &self.collections {
            let status = match (&outcome.error, outcome.report.halted) {
                (Some(e), _) => format!("abandoned: {e}"),
                (None, true) => "halted".to_string(),
                (None, false) => "done".to_string(),
            };
            lines.push(format!(
                "  {}: {} [{}]",
                outcome.source.title,
                outcome.report.summary(),
                status
            ));
        }
        lines.push(format!(
            "total: {} applied, {} skipped, {} failed",
            self.total_applied(),
            self.total_skipped(),
            self.total_failed()
        ));
        if self.halted {
            lines.push(
                "run halted on a rate limit; re-run later to resume where it left off".to_string(),
            );
        }
        lines.join("\n")
    }
}

/// Drives full migration runs against a source and a destination API.
pub struct MigrationOrchestrator<'a, S, D>
where
    S: ResourceApi,
    D: ResourceApi,
{
    source: &'a S,
    destination: &'a D,
}

impl<'a, S, D> MigrationOrchestrator<'a, S, D>
where
    S: ResourceApi,
    D: ResourceApi,
{
    /// Build an orchestrator over the two API handles.
    pub fn new(source: &'a S, destination: &'a D) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Migrate the selected playlists from source to destination.
    ///
    /// For each selected collection: create a destination collection
    /// named `"{title} (Migrated)"` carrying the source description
    /// verbatim, fetch the full ordered item listing, and run the
    /// executor over it. A failure to create or to fetch abandons that
    /// collection only; a rate-limit anywhere halts the run.
    ///
    /// # Errors
    ///
    /// Fails if the top-level collection listing cannot be fetched or
    /// on ledger errors. Per-collection failures are folded into the
    /// report.
    pub fn migrate_playlists(
        &self,
        ledger: &mut ProgressLedger,
        selection: &CollectionSelection,
    ) -> Result<RunReport> {
        let collections = fetch_all("playlists", |cursor| self.source.list_collections(cursor))?;
        info!(count = collections.len(), "listed source playlists");

        let mut executor = TransferExecutor::new(ledger)?;
        let mut run = RunReport::default();

        for collection in collections {
            if !selection.includes(&collection) {
                continue;
            }
            if run.halted {
                // Remaining collections stay untouched for the resumed run.
                break;
            }

            info!(
                id = %collection.id,
                title = %collection.title,
                items = collection.item_count,
                "migrating playlist"
            );

            let title = format!("{}{MIGRATED_TITLE_SUFFIX}", collection.title);
            let destination_id =
                match self.destination.create_collection(&title, &collection.description) {
                    Ok(id) => id,
                    Err(e) => match classify(&e) {
                        TransferOutcome::RateLimited { message } => {
                            warn!(message, "rate limit creating playlist, halting run");
                            run.halted = true;
                            run.halt_message = Some(message.clone());
                            run.collections.push(CollectionOutcome {
                                source: collection,
                                destination_id: None,
                                report: ExecutorReport::default(),
                                error: Some(message),
                            });
                            break;
                        }
                        _ => {
                            error!(title = %collection.title, error = %e, "playlist creation failed");
                            run.collections.push(CollectionOutcome {
                                source: collection,
                                destination_id: None,
                                report: ExecutorReport::default(),
                                error: Some(e.to_string()),
                            });
                            continue;
                        }
                    },
                };

            let selector = format!("playlist {}", collection.id);
            let items = match fetch_all(&selector, |cursor| {
                self.source.list_collection_items(&collection.id, cursor)
            }) {
                Ok(items) => items,
                Err(e) => {
                    error!(title = %collection.title, error = %e, "playlist listing failed");
                    run.collections.push(CollectionOutcome {
                        source: collection,
                        destination_id: Some(destination_id),
                        report: ExecutorReport::default(),
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };

            let report = executor.run(&items, |item| {
                self.destination.add_item_to_collection(&destination_id, &item.id)
            })?;

            if report.halted {
                run.halted = true;
                run.halt_message.clone_from(&report.halt_message);
            }
            run.collections.push(CollectionOutcome {
                source: collection,
                destination_id: Some(destination_id),
                report,
                error: None,
            });
        }

        info!(halted = run.halted, "playlist migration run complete");
        Ok(run)
    }

    /// Subscribe the destination account to every channel in `entries`.
    ///
    /// The entries come from an exported CSV, not from the source API,
    /// so the whole run is a single flat batch sharing one ledger.
    ///
    /// # Errors
    ///
    /// Fails only on ledger errors; remote failures are folded into
    /// the report.
    pub fn migrate_subscriptions(
        &self,
        ledger: &mut ProgressLedger,
        entries: &[SubscriptionEntry],
    ) -> Result<RunReport> {
        let items: Vec<CollectionItem> = entries
            .iter()
            .map(|entry| CollectionItem {
                id: entry.channel_id.clone(),
                title: entry.channel_title.clone(),
                collection_id: String::new(),
            })
            .collect();
        info!(count = items.len(), "migrating subscriptions");

        let mut executor = TransferExecutor::new(ledger)?;
        let report = executor.run(&items, |item| self.destination.subscribe(&item.id))?;

        let halted = report.halted;
        let halt_message = report.halt_message.clone();
        Ok(RunReport {
            collections: vec![CollectionOutcome {
                source: Collection {
                    id: String::new(),
                    title: "subscriptions".to_string(),
                    description: String::new(),
                    item_count: items.len() as u64,
                },
                destination_id: None,
                report,
                error: None,
            }],
            halted,
            halt_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockResourceApi};
    use crate::model::Page;
    use tempfile::TempDir;

    fn collection(id: &str, title: &str, description: &str) -> Collection {
        Collection {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            item_count: 1,
        }
    }

    fn one_page_of_collections(collections: Vec<Collection>) -> MockResourceApi {
        let mut source = MockResourceApi::new();
        source
            .expect_list_collections()
            .returning(move |_| Ok(Page {
                items: collections.clone(),
                next_cursor: None,
            }));
        source
    }

    #[test]
    fn test_destination_title_and_description() {
        let mut source =
            one_page_of_collections(vec![collection("PL1", "Road Trips", "songs for driving")]);
        source.expect_list_collection_items().returning(|_, _| {
            Ok(Page {
                items: vec![CollectionItem {
                    id: "vid1".to_string(),
                    title: "a song".to_string(),
                    collection_id: "PL1".to_string(),
                }],
                next_cursor: None,
            })
        });

        let mut destination = MockResourceApi::new();
        destination
            .expect_create_collection()
            .withf(|title, description| {
                title == "Road Trips (Migrated)" && description == "songs for driving"
            })
            .times(1)
            .returning(|_, _| Ok("PLnew".to_string()));
        destination
            .expect_add_item_to_collection()
            .withf(|collection_id, item_id| collection_id == "PLnew" && item_id == "vid1")
            .times(1)
            .returning(|_, _| Ok(()));

        let dir = TempDir::new().expect("temp dir");
        let mut ledger = ProgressLedger::open(dir.path().join("ledger.log")).expect("open");
        let orchestrator = MigrationOrchestrator::new(&source, &destination);
        let run = orchestrator
            .migrate_playlists(&mut ledger, &CollectionSelection::All)
            .expect("run");

        assert_eq!(run.total_applied(), 1);
        assert!(!run.halted);
        assert_eq!(run.collections[0].destination_id.as_deref(), Some("PLnew"));
    }

    #[test]
    fn test_selection_filters_collections() {
        let mut source = one_page_of_collections(vec![
            collection("PL1", "Keep", ""),
            collection("PL2", "Skip", ""),
        ]);
        source
            .expect_list_collection_items()
            .returning(|_, _| Ok(Page::empty()));

        let mut destination = MockResourceApi::new();
        destination
            .expect_create_collection()
            .withf(|title, _| title == "Keep (Migrated)")
            .times(1)
            .returning(|_, _| Ok("PLnew".to_string()));

        let dir = TempDir::new().expect("temp dir");
        let mut ledger = ProgressLedger::open(dir.path().join("ledger.log")).expect("open");
        let orchestrator = MigrationOrchestrator::new(&source, &destination);
        let run = orchestrator
            .migrate_playlists(
                &mut ledger,
                &CollectionSelection::Ids(vec!["PL1".to_string()]),
            )
            .expect("run");

        assert_eq!(run.collections.len(), 1);
        assert_eq!(run.collections[0].source.id, "PL1");
    }

    #[test]
    fn test_collection_fetch_failure_abandons_only_that_collection() {
        let mut source = one_page_of_collections(vec![
            collection("PL1", "Broken", ""),
            collection("PL2", "Fine", ""),
        ]);
        source
            .expect_list_collection_items()
            .returning(|collection_id, _| {
                if collection_id == "PL1" {
                    Err(ApiError::transport("backend unavailable"))
                } else {
                    Ok(Page {
                        items: vec![CollectionItem {
                            id: "vid1".to_string(),
                            title: "a song".to_string(),
                            collection_id: "PL2".to_string(),
                        }],
                        next_cursor: None,
                    })
                }
            });

        let mut destination = MockResourceApi::new();
        destination
            .expect_create_collection()
            .returning(|title, _| Ok(format!("new-{title}")));
        destination
            .expect_add_item_to_collection()
            .times(1)
            .returning(|_, _| Ok(()));

        let dir = TempDir::new().expect("temp dir");
        let mut ledger = ProgressLedger::open(dir.path().join("ledger.log")).expect("open");
        let orchestrator = MigrationOrchestrator::new(&source, &destination);
        let run = orchestrator
            .migrate_playlists(&mut ledger, &CollectionSelection::All)
            .expect("run");

        assert_eq!(run.collections.len(), 2);
        assert!(run.collections[0].error.is_some());
        assert!(run.collections[1].error.is_none());
        assert_eq!(run.total_applied(), 1);
        assert!(!run.halted);
    }

    #[test]
    fn test_rate_limit_on_creation_halts_run() {
        let source = one_page_of_collections(vec![
            collection("PL1", "First", ""),
            collection("PL2", "Second", ""),
        ]);

        let mut destination = MockResourceApi::new();
        destination.expect_create_collection().times(1).returning(|_, _| {
            Err(ApiError {
                status: Some(403),
                reason: Some("quotaExceeded".to_string()),
                message: "quota exhausted".to_string(),
            })
        });

        let dir = TempDir::new().expect("temp dir");
        let mut ledger = ProgressLedger::open(dir.path().join("ledger.log")).expect("open");
        let orchestrator = MigrationOrchestrator::new(&source, &destination);
        let run = orchestrator
            .migrate_playlists(&mut ledger, &CollectionSelection::All)
            .expect("run");

        assert!(run.halted);
        // The second collection was never reached.
        assert_eq!(run.collections.len(), 1);
    }

    #[test]
    fn test_rate_limit_mid_items_stops_later_collections() {
        let mut source = one_page_of_collections(vec![
            collection("PL1", "First", ""),
            collection("PL2", "Second", ""),
        ]);
        source
            .expect_list_collection_items()
            .returning(|collection_id, _| {
                Ok(Page {
                    items: vec![CollectionItem {
                        id: "vid1".to_string(),
                        title: "a song".to_string(),
                        collection_id: collection_id.to_string(),
                    }],
                    next_cursor: None,
                })
            });

        let mut destination = MockResourceApi::new();
        destination
            .expect_create_collection()
            .times(1)
            .returning(|_, _| Ok("PLnew".to_string()));
        destination
            .expect_add_item_to_collection()
            .times(1)
            .returning(|_, _| {
                Err(ApiError {
                    status: Some(403),
                    reason: Some("quotaExceeded".to_string()),
                    message: "quota exhausted".to_string(),
                })
            });

        let dir = TempDir::new().expect("temp dir");
        let mut ledger = ProgressLedger::open(dir.path().join("ledger.log")).expect("open");
        let orchestrator = MigrationOrchestrator::new(&source, &destination);
        let run = orchestrator
            .migrate_playlists(&mut ledger, &CollectionSelection::All)
            .expect("run");

        assert!(run.halted);
        assert_eq!(run.collections.len(), 1);
        assert_eq!(run.halt_message.as_deref(), Some("quota exhausted"));
    }

    #[test]
    fn test_subscription_run_shares_one_ledger_batch() {
        let source = MockResourceApi::new();
        let mut destination = MockResourceApi::new();
        destination
            .expect_subscribe()
            .times(2)
            .returning(|_| Ok(()));

        let entries = vec![
            SubscriptionEntry {
                channel_id: "chA".to_string(),
                channel_title: "Channel A".to_string(),
            },
            SubscriptionEntry {
                channel_id: "chB".to_string(),
                channel_title: "Channel B".to_string(),
            },
        ];

        let dir = TempDir::new().expect("temp dir");
        let mut ledger = ProgressLedger::open(dir.path().join("subs.log")).expect("open");
        let orchestrator = MigrationOrchestrator::new(&source, &destination);
        let run = orchestrator
            .migrate_subscriptions(&mut ledger, &entries)
            .expect("run");

        assert_eq!(run.total_applied(), 2);

        // Second run over the same ledger subscribes to nothing.
        let run = orchestrator
            .migrate_subscriptions(&mut ledger, &entries)
            .expect("second run");
        assert_eq!(run.total_applied(), 0);
        assert_eq!(run.total_skipped(), 2);
    }
}
