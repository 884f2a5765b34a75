//! Import pipeline
//!
//! Strict sequential flow per job: Validator → Transport → Reducer →
//! Dispatcher. Every exit path clears the progress indicator and lands a
//! user-visible message; no error escapes unhandled and none is swallowed
//! without a logged diagnostic.

use crate::dispatcher::ReconciliationDispatcher;
use crate::error::{IngestError, IngestResult};
use crate::job::{ImportJob, SpreadsheetFile};
use crate::notify::{NotificationCenter, NotificationKind, ProgressTicker};
use crate::reducer::{self, BatchOutcome, OutcomeKind};
use crate::transport::IngestTransport;
use crate::validator::FileValidator;
use crate::views::ViewRegistry;
use std::sync::Arc;
use std::time::Duration;
use titres_common::events::{EventBus, ImportResultKind, TitreEvent};
use tracing::{error, info};
use uuid::Uuid;

/// Default interval of the cosmetic progress estimate
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// One-job-at-a-time ingestion pipeline
///
/// Explicitly constructed with its collaborators; nothing here is global.
pub struct IngestPipeline {
    validator: FileValidator,
    transport: Arc<dyn IngestTransport>,
    dispatcher: ReconciliationDispatcher,
    center: Arc<NotificationCenter>,
    bus: EventBus,
    tick_interval: Duration,
}

impl IngestPipeline {
    pub fn new(
        validator: FileValidator,
        transport: Arc<dyn IngestTransport>,
        bus: EventBus,
        center: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            validator,
            transport,
            dispatcher: ReconciliationDispatcher::new(bus.clone(), Arc::clone(&center)),
            center,
            bus,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Override the progress estimate interval (tests use a long one)
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Run one import attempt end to end
    ///
    /// Returns the reduced outcome once reconciliation has run, or the
    /// error that stopped the pipeline. Either way the user has already
    /// been notified and the progress indicator is hidden.
    pub async fn run(
        &self,
        file: SpreadsheetFile,
        actor: &str,
        registry: &ViewRegistry,
    ) -> IngestResult<BatchOutcome> {
        // Validation rejects before any network transfer; no job exists yet.
        if let Err(e) = self.validator.validate(&file) {
            error!(file = %file.file_name, error = %e, "File rejected before upload");
            self.center.notify(NotificationKind::Error, e.to_string());
            return Err(IngestError::Validation(e));
        }

        let job = ImportJob::new(file, actor);
        info!(
            job_id = %job.job_id,
            file = %job.file.file_name,
            actor = %job.actor,
            "Import job accepted"
        );
        self.bus.emit_lossy(TitreEvent::ImportStarted {
            job_id: job.job_id,
            file_name: job.file.file_name.clone(),
            actor: job.actor.clone(),
            timestamp: chrono::Utc::now(),
        });

        self.center.show_progress();
        let ticker = ProgressTicker::start(
            Arc::clone(&self.center),
            self.bus.clone(),
            job.job_id,
            self.tick_interval,
        );

        let upload_result = self.transport.upload(&job.file, &job.actor).await;

        // The estimate reconciles to 100 only when a response arrived;
        // the indicator is hidden on every path.
        ticker.finish(upload_result.is_ok());
        self.center.hide_progress();

        let raw = match upload_result {
            Ok(raw) => raw,
            Err(e) => {
                error!(job_id = %job.job_id, error = %e, "Upload failed");
                self.center.notify(NotificationKind::Error, e.to_string());
                self.emit_completed(job.job_id, ImportResultKind::Failed, None);
                return Err(IngestError::Transport(e));
            }
        };

        let outcome = match reducer::reduce(&raw) {
            Ok(outcome) => outcome,
            Err(e) => {
                // A malformed success response is an import failure, not a
                // zero-error success.
                error!(job_id = %job.job_id, error = %e, "Batch response unusable");
                self.center.notify(
                    NotificationKind::Error,
                    "Import échoué : réponse du serveur illisible",
                );
                self.emit_completed(job.job_id, ImportResultKind::Failed, None);
                return Err(IngestError::Reduce(e));
            }
        };

        let job_id = job.job_id;
        self.dispatcher.dispatch(job, &outcome, registry).await;
        self.emit_completed(job_id, result_kind(outcome.kind), Some(&outcome));

        Ok(outcome)
    }

    fn emit_completed(
        &self,
        job_id: Uuid,
        result: ImportResultKind,
        outcome: Option<&BatchOutcome>,
    ) {
        self.bus.emit_lossy(TitreEvent::ImportCompleted {
            job_id,
            result,
            rows_processed: outcome.map(|o| o.total_rows).unwrap_or(0),
            rows_succeeded: outcome.map(|o| o.succeeded).unwrap_or(0),
            rows_failed: outcome.map(|o| o.failed).unwrap_or(0),
            timestamp: chrono::Utc::now(),
        });
    }
}

fn result_kind(kind: OutcomeKind) -> ImportResultKind {
    match kind {
        OutcomeKind::Success => ImportResultKind::Success,
        OutcomeKind::Partial => ImportResultKind::Partial,
        OutcomeKind::Failed => ImportResultKind::Failed,
    }
}
