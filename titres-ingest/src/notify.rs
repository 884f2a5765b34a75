//! Notification and progress surface
//!
//! Gives the user asynchronous feedback decoupled from the pipeline:
//! stacking toast notifications with auto-dismiss, itemized error listings,
//! and a cosmetic upload progress estimate. The pipeline only ever calls
//! show/hide and post; the estimate's timer state stays private to this
//! module.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use titres_common::events::{EventBus, TitreEvent};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Severity of a toast notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// One stacked toast
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    posted_at: Instant,
}

/// Itemized, dismissible error listing (separate from the summary toast)
#[derive(Debug, Clone)]
pub struct ErrorListing {
    pub id: Uuid,
    pub entries: Vec<String>,
}

/// Stateful notification surface
///
/// Notifications stack without replacing one another and auto-dismiss
/// after the configured duration unless dismissed earlier. Error listings
/// stay until dismissed.
pub struct NotificationCenter {
    notifications: Mutex<Vec<Notification>>,
    listings: Mutex<Vec<ErrorListing>>,
    progress_visible: AtomicBool,
    progress_percent: AtomicU8,
    auto_dismiss: Duration,
}

impl NotificationCenter {
    /// Create a center with the given auto-dismiss duration
    pub fn new(auto_dismiss: Duration) -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
            listings: Mutex::new(Vec::new()),
            progress_visible: AtomicBool::new(false),
            progress_percent: AtomicU8::new(0),
            auto_dismiss,
        }
    }

    /// Post one toast; also logs it so nothing user-visible goes unlogged
    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) -> Uuid {
        let message = message.into();
        match kind {
            NotificationKind::Success => info!(notification = %message, "notify"),
            NotificationKind::Error => error!(notification = %message, "notify"),
            NotificationKind::Warning => warn!(notification = %message, "notify"),
            NotificationKind::Info => info!(notification = %message, "notify"),
        }

        let id = Uuid::new_v4();
        self.notifications
            .lock()
            .expect("notification lock poisoned")
            .push(Notification {
                id,
                kind,
                message,
                posted_at: Instant::now(),
            });
        id
    }

    /// Post an itemized error listing
    pub fn post_details(&self, entries: Vec<String>) -> Uuid {
        warn!(entries = entries.len(), "Posting itemized import errors");
        let id = Uuid::new_v4();
        self.listings
            .lock()
            .expect("listing lock poisoned")
            .push(ErrorListing { id, entries });
        id
    }

    /// User-initiated dismissal of a toast or listing
    pub fn dismiss(&self, id: Uuid) {
        self.notifications
            .lock()
            .expect("notification lock poisoned")
            .retain(|n| n.id != id);
        self.listings
            .lock()
            .expect("listing lock poisoned")
            .retain(|l| l.id != id);
    }

    /// Currently visible toasts; expired ones are pruned on the way out
    pub fn active(&self) -> Vec<Notification> {
        let mut guard = self.notifications.lock().expect("notification lock poisoned");
        guard.retain(|n| n.posted_at.elapsed() < self.auto_dismiss);
        guard.clone()
    }

    /// Currently visible error listings (no auto-dismiss)
    pub fn active_listings(&self) -> Vec<ErrorListing> {
        self.listings.lock().expect("listing lock poisoned").clone()
    }

    /// Show the progress indicator (estimate starts at zero)
    pub fn show_progress(&self) {
        self.progress_percent.store(0, Ordering::SeqCst);
        self.progress_visible.store(true, Ordering::SeqCst);
    }

    /// Hide the progress indicator, whatever state it was in
    pub fn hide_progress(&self) {
        self.progress_visible.store(false, Ordering::SeqCst);
    }

    pub fn progress_visible(&self) -> bool {
        self.progress_visible.load(Ordering::SeqCst)
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress_percent.load(Ordering::SeqCst)
    }

    fn set_progress_percent(&self, percent: u8) {
        self.progress_percent.store(percent.min(100), Ordering::SeqCst);
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_secs(6))
    }
}

// ========================================
// Cosmetic progress estimate
// ========================================

/// Estimate ceiling before the response arrives
const ESTIMATE_CAP: u8 = 95;

/// Timed cosmetic progress estimate
///
/// The wire protocol provides no real progress events, so this eases the
/// estimate toward [`ESTIMATE_CAP`] and only ever reports 100 when told
/// the response actually arrived. Emits lossy [`TitreEvent::ImportProgress`]
/// so observers can mirror the indicator.
pub struct ProgressTicker {
    handle: tokio::task::JoinHandle<()>,
    center: Arc<NotificationCenter>,
    bus: EventBus,
    job_id: Uuid,
}

impl ProgressTicker {
    /// Start ticking for a job; the center must already show progress
    pub fn start(
        center: Arc<NotificationCenter>,
        bus: EventBus,
        job_id: Uuid,
        interval: Duration,
    ) -> Self {
        let tick_center = Arc::clone(&center);
        let tick_bus = bus.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately, skip it
            loop {
                ticker.tick().await;
                let current = tick_center.progress_percent();
                if current >= ESTIMATE_CAP {
                    continue;
                }
                // Ease out: large early steps, slower near the cap
                let step = ((ESTIMATE_CAP - current) / 8).max(1);
                let next = (current + step).min(ESTIMATE_CAP);
                tick_center.set_progress_percent(next);
                tick_bus.emit_lossy(TitreEvent::ImportProgress {
                    job_id,
                    percent: next,
                    timestamp: chrono::Utc::now(),
                });
            }
        });

        Self {
            handle,
            center,
            bus,
            job_id,
        }
    }

    /// Stop the estimate
    ///
    /// `completed` is true only when the response actually arrived; then
    /// the indicator reconciles to 100 before being hidden. On abandonment
    /// the estimate freezes where it was.
    pub fn finish(self, completed: bool) {
        self.handle.abort();
        if completed {
            self.center.set_progress_percent(100);
            self.bus.emit_lossy(TitreEvent::ImportProgress {
                job_id: self.job_id,
                percent: 100,
                timestamp: chrono::Utc::now(),
            });
        }
        debug!(job_id = %self.job_id, completed, "Progress ticker stopped");
    }
}
