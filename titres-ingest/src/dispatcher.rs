//! Reconciliation dispatch
//!
//! Given a reduced batch outcome, updates every dependent view exactly
//! once, posts the user-facing summary, and signals unrelated observers
//! through the event bus. `dispatch` consumes the job: ownership is what
//! enforces one dispatch per import attempt.

use crate::job::{ImportJob, JobState};
use crate::notify::{NotificationCenter, NotificationKind};
use crate::reducer::{BatchOutcome, OutcomeKind};
use crate::views::ViewRegistry;
use std::sync::Arc;
use titres_common::events::{EventBus, TitreEvent, UpdateSource};
use tracing::{info, warn};

/// Applies one batch outcome to the rendering surfaces
pub struct ReconciliationDispatcher {
    bus: EventBus,
    center: Arc<NotificationCenter>,
}

impl ReconciliationDispatcher {
    pub fn new(bus: EventBus, center: Arc<NotificationCenter>) -> Self {
        Self { bus, center }
    }

    /// Reconcile all dependent state with a terminal batch outcome
    ///
    /// Emits exactly one summary notification; a non-empty error list
    /// additionally becomes one itemized listing that never suppresses the
    /// summary. A failed batch refreshes nothing and signals no data
    /// change. Per-view refresh failures are logged, surfaced as warnings,
    /// and do not abort the remaining views.
    ///
    /// Returns the job in its terminal state; the caller discards it.
    pub async fn dispatch(
        &self,
        mut job: ImportJob,
        outcome: &BatchOutcome,
        registry: &ViewRegistry,
    ) -> ImportJob {
        info!(
            job_id = %job.job_id,
            kind = ?outcome.kind,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "Dispatching batch outcome"
        );

        self.post_summary(outcome);

        if !outcome.errors.is_empty() {
            self.center.post_details(outcome.errors.clone());
        }

        match outcome.kind {
            OutcomeKind::Failed => {
                job.finish(JobState::Failed);
            }
            OutcomeKind::Success | OutcomeKind::Partial => {
                self.refresh_views(registry).await;

                self.bus.emit_lossy(TitreEvent::DataUpdated {
                    source: UpdateSource::ExcelImport,
                    timestamp: chrono::Utc::now(),
                });

                job.finish(match outcome.kind {
                    OutcomeKind::Partial => JobState::Partial,
                    _ => JobState::Succeeded,
                });
            }
        }

        job
    }

    /// The single summary toast for this outcome
    ///
    /// Partial success keeps success styling with the failure count
    /// embedded; it is a warning about rows, not a failed import.
    fn post_summary(&self, outcome: &BatchOutcome) {
        match outcome.kind {
            OutcomeKind::Success => {
                self.center.notify(
                    NotificationKind::Success,
                    format!("Import terminé : {} lignes importées", outcome.succeeded),
                );
            }
            OutcomeKind::Partial => {
                self.center.notify(
                    NotificationKind::Success,
                    format!(
                        "Import terminé : {} lignes importées, {} en erreur",
                        outcome.succeeded, outcome.failed
                    ),
                );
            }
            OutcomeKind::Failed => {
                let reason = outcome
                    .failure_message
                    .as_deref()
                    .unwrap_or("le serveur a rejeté le fichier");
                self.center.notify(
                    NotificationKind::Error,
                    format!("Import échoué : {}", reason),
                );
            }
        }
    }

    async fn refresh_views(&self, registry: &ViewRegistry) {
        for view in registry.import_interested() {
            if let Err(e) = view.refresh().await {
                warn!(view = %view.name(), error = %e, "View refresh failed");
                self.center.notify(
                    NotificationKind::Warning,
                    format!("Actualisation de la vue {} impossible", view.name()),
                );
            }
        }
    }
}
