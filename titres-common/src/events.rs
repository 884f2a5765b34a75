//! Event types for the titres ingestion tooling
//!
//! Provides the shared event enum and the EventBus used to decouple the
//! ingestion pipeline from whatever rendering or observer modules exist.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Identifies the subsystem that caused a data change.
///
/// Carried by [`TitreEvent::DataUpdated`] so observers can tell an Excel
/// import apart from other future write paths without subscribing to the
/// pipeline itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    /// The Excel batch import pipeline
    ExcelImport,
}

impl std::fmt::Display for UpdateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateSource::ExcelImport => write!(f, "excel_import"),
        }
    }
}

/// Terminal state of one import job, as carried on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportResultKind {
    /// All rows imported
    Success,
    /// Transport succeeded but one or more rows were rejected
    Partial,
    /// The batch failed as a whole
    Failed,
}

/// Titres event types
///
/// Events are broadcast via [`EventBus`]. All events use this central enum
/// for type safety and exhaustive matching; the serde tag keeps the wire
/// form self-describing for any observer that serializes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TitreEvent {
    /// An import job passed validation and is about to upload
    ///
    /// Triggers:
    /// - Progress surface: show indicator
    /// - Observers: mark tables as pending refresh
    ImportStarted {
        /// Import job UUID
        job_id: Uuid,
        /// File name as selected by the user
        file_name: String,
        /// Actor label attached to the upload
        actor: String,
        /// When the job started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Cosmetic progress estimate for a running upload
    ///
    /// NOTE: The wire protocol provides no real progress events; this is an
    /// estimate and reaches 100 only on actual completion. Emitted lossy.
    ImportProgress {
        /// Import job UUID
        job_id: Uuid,
        /// Estimated percent complete (0-100)
        percent: u8,
        /// Estimate timestamp
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An import job reached a terminal state
    ImportCompleted {
        /// Import job UUID
        job_id: Uuid,
        /// Terminal outcome of the job
        result: ImportResultKind,
        /// Rows the server reported processing
        rows_processed: u64,
        /// Rows imported successfully
        rows_succeeded: u64,
        /// Rows rejected
        rows_failed: u64,
        /// When the job completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Backend data changed and dependent views should consider refreshing
    ///
    /// Carries no payload beyond the source tag; observers re-fetch what
    /// they display rather than patching state from the event.
    DataUpdated {
        /// Which subsystem performed the update
        source: UpdateSource,
        /// When the update was dispatched
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl TitreEvent {
    /// Get event type name for logging and observer filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            TitreEvent::ImportStarted { .. } => "ImportStarted",
            TitreEvent::ImportProgress { .. } => "ImportProgress",
            TitreEvent::ImportCompleted { .. } => "ImportCompleted",
            TitreEvent::DataUpdated { .. } => "DataUpdated",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TitreEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<TitreEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: TitreEvent,
    ) -> Result<usize, broadcast::error::SendError<TitreEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Used for cosmetic events (progress estimates) where it is acceptable
    /// if no component is currently listening.
    pub fn emit_lossy(&self, event: TitreEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_eventbus_subscribe() {
        let bus = EventBus::new(10);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_eventbus_emit() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        let event = TitreEvent::DataUpdated {
            source: UpdateSource::ExcelImport,
            timestamp: chrono::Utc::now(),
        };

        bus.emit(event).expect("emit should succeed");

        let received = rx.try_recv().expect("Should receive event");
        assert_eq!(received.event_type(), "DataUpdated");
    }

    #[test]
    fn test_eventbus_emit_without_subscribers() {
        let bus = EventBus::new(10);
        let event = TitreEvent::DataUpdated {
            source: UpdateSource::ExcelImport,
            timestamp: chrono::Utc::now(),
        };
        assert!(bus.emit(event).is_err());
    }

    #[test]
    fn test_eventbus_emit_lossy_full_channel() {
        let bus = EventBus::new(2); // Small capacity
        let mut _rx = bus.subscribe(); // Subscribe but don't receive

        // Fill the channel well past capacity; must not panic
        for i in 0..10 {
            bus.emit_lossy(TitreEvent::ImportProgress {
                job_id: Uuid::new_v4(),
                percent: i * 10,
                timestamp: chrono::Utc::now(),
            });
        }

        assert_eq!(bus.capacity(), 2);
    }

    #[test]
    fn test_eventbus_multiple_subscribers() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(TitreEvent::ImportCompleted {
            job_id: Uuid::new_v4(),
            result: ImportResultKind::Partial,
            rows_processed: 10,
            rows_succeeded: 7,
            rows_failed: 3,
            timestamp: chrono::Utc::now(),
        })
        .expect("emit should succeed");

        assert_eq!(rx1.try_recv().expect("rx1").event_type(), "ImportCompleted");
        assert_eq!(rx2.try_recv().expect("rx2").event_type(), "ImportCompleted");
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = TitreEvent::DataUpdated {
            source: UpdateSource::ExcelImport,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("\"type\":\"DataUpdated\""));
        assert!(json.contains("\"source\":\"excel_import\""));

        let back: TitreEvent = serde_json::from_str(&json).expect("deserialize");
        match back {
            TitreEvent::DataUpdated { source, .. } => {
                assert_eq!(source, UpdateSource::ExcelImport);
            }
            _ => panic!("Wrong event type deserialized"),
        }
    }

    #[test]
    fn test_event_type_method() {
        let events = vec![
            (
                TitreEvent::ImportStarted {
                    job_id: Uuid::new_v4(),
                    file_name: "titres.xlsx".to_string(),
                    actor: "agent@example.org".to_string(),
                    timestamp: chrono::Utc::now(),
                },
                "ImportStarted",
            ),
            (
                TitreEvent::ImportProgress {
                    job_id: Uuid::new_v4(),
                    percent: 42,
                    timestamp: chrono::Utc::now(),
                },
                "ImportProgress",
            ),
            (
                TitreEvent::DataUpdated {
                    source: UpdateSource::ExcelImport,
                    timestamp: chrono::Utc::now(),
                },
                "DataUpdated",
            ),
        ];

        for (event, expected_type) in events {
            assert_eq!(event.event_type(), expected_type);
        }
    }
}
