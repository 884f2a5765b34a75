//! titres-ingest - Excel batch ingestion pipeline
//!
//! Uploads regulator spreadsheets to the titles backend, interprets the
//! per-row tally, and reconciles every dependent view on partial as well
//! as full success. The flow per job is strictly sequential:
//!
//! Validator → Transport → Reducer → Dispatcher → Notification surface
//!
//! with the notification surface also invoked directly on early failure.

pub mod api_client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod job;
pub mod notify;
pub mod pipeline;
pub mod reducer;
pub mod transport;
pub mod validator;
pub mod views;

pub use crate::error::{IngestError, IngestResult, ReduceError, TransportError, ValidationError};
pub use crate::job::{ImportJob, JobState, SpreadsheetFile};
pub use crate::pipeline::IngestPipeline;
pub use crate::reducer::{BatchOutcome, OutcomeKind};
