//! Refreshable views
//!
//! The rendering surfaces that depend on backend data register here; the
//! dispatcher refreshes them after a batch lands. Views re-fetch what they
//! display: visible counters are SET from a freshly fetched source value,
//! never incremented in place, so a repeated refresh cannot drift them.

use crate::api_client::TitleApiClient;
use crate::error::TransportError;
use async_trait::async_trait;
use std::sync::Arc;
use titres_common::api::{TitreQuery, TitreStatistics, TitreSummary};
use tokio::sync::RwLock;
use tracing::debug;

/// A rendering surface that can re-fetch its own state
#[async_trait]
pub trait RefreshableView: Send + Sync {
    /// Stable name for logging and registry diagnostics
    fn name(&self) -> &str;

    /// Whether this view cares about post-import updates
    fn wants_import_refresh(&self) -> bool {
        true
    }

    /// Re-fetch and re-render
    async fn refresh(&self) -> Result<(), TransportError>;
}

/// Registry of views interested in reconciliation
///
/// Mutated only at composition time; the dispatcher reads it after a job
/// fully completes, so no view ever renders a half-applied batch.
#[derive(Default)]
pub struct ViewRegistry {
    views: Vec<Arc<dyn RefreshableView>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view for post-import refresh
    pub fn register(&mut self, view: Arc<dyn RefreshableView>) {
        debug!(view = %view.name(), "View registered");
        self.views.push(view);
    }

    /// Views that declared interest in import updates
    pub fn import_interested(&self) -> impl Iterator<Item = &Arc<dyn RefreshableView>> {
        self.views.iter().filter(|v| v.wants_import_refresh())
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

// ========================================
// Concrete views
// ========================================

/// Dashboard aggregate statistics card
pub struct DashboardStatsView {
    client: TitleApiClient,
    stats: RwLock<Option<TitreStatistics>>,
}

impl DashboardStatsView {
    pub fn new(client: TitleApiClient) -> Self {
        Self {
            client,
            stats: RwLock::new(None),
        }
    }

    /// Latest fetched statistics, if any render has happened
    pub async fn latest(&self) -> Option<TitreStatistics> {
        self.stats.read().await.clone()
    }
}

#[async_trait]
impl RefreshableView for DashboardStatsView {
    fn name(&self) -> &str {
        "dashboard_stats"
    }

    async fn refresh(&self) -> Result<(), TransportError> {
        let stats = self.client.statistics().await?;
        debug!(
            total = stats.total_titres,
            actifs = stats.titres_actifs,
            "Dashboard statistics refreshed"
        );
        *self.stats.write().await = Some(stats);
        Ok(())
    }
}

/// Currently displayed title listing
///
/// Remembers the active filter so a refresh re-fetches the same page the
/// user is looking at.
pub struct TitleTableView {
    client: TitleApiClient,
    query: RwLock<TitreQuery>,
    rows: RwLock<Vec<TitreSummary>>,
}

impl TitleTableView {
    pub fn new(client: TitleApiClient) -> Self {
        Self {
            client,
            query: RwLock::new(TitreQuery::default()),
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Change the active filter; takes effect on the next refresh
    pub async fn set_query(&self, query: TitreQuery) {
        *self.query.write().await = query;
    }

    /// Rows currently rendered
    pub async fn rows(&self) -> Vec<TitreSummary> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl RefreshableView for TitleTableView {
    fn name(&self) -> &str {
        "title_table"
    }

    async fn refresh(&self) -> Result<(), TransportError> {
        let query = self.query.read().await.clone();
        let rows = self.client.list_titres(&query).await?;
        debug!(rows = rows.len(), "Title table refreshed");
        *self.rows.write().await = rows;
        Ok(())
    }
}

/// Visible "total titles" count indicator
pub struct TitleCountView {
    client: TitleApiClient,
    count: RwLock<Option<u64>>,
}

impl TitleCountView {
    pub fn new(client: TitleApiClient) -> Self {
        Self {
            client,
            count: RwLock::new(None),
        }
    }

    /// Current indicator value
    pub async fn current(&self) -> Option<u64> {
        *self.count.read().await
    }
}

#[async_trait]
impl RefreshableView for TitleCountView {
    fn name(&self) -> &str {
        "title_count"
    }

    async fn refresh(&self) -> Result<(), TransportError> {
        // Set from the source value; never add the batch tally to the
        // previous number.
        let stats = self.client.statistics().await?;
        *self.count.write().await = Some(stats.total_titres);
        Ok(())
    }
}
