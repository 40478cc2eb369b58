//! Source resolution and per-source capabilities.
//!
//! Each configured source is paired with a [`TimeSeries`] handle. Handlers
//! reach it through the [`SourceSeries`] extractor and probe it for role
//! support with [`SourceSeries::roles`].

mod extractor;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::models::Source;
use crate::store::{MemoryRolesStore, RolesStore};

pub use extractor::SourceSeries;

/// Capabilities of the backend behind a source.
pub trait TimeSeries: Send + Sync {
    /// Role store of the source, or `None` when the backend has no roles.
    fn roles(&self) -> Option<Arc<dyn RolesStore>>;
}

/// Backend without role management.
#[derive(Debug, Default)]
pub struct InfluxSeries;

impl TimeSeries for InfluxSeries {
    fn roles(&self) -> Option<Arc<dyn RolesStore>> {
        None
    }
}

/// Backend that manages roles.
pub struct EnterpriseSeries {
    roles: Arc<dyn RolesStore>,
}

impl EnterpriseSeries {
    pub fn new(roles: Arc<dyn RolesStore>) -> Self {
        Self { roles }
    }
}

impl TimeSeries for EnterpriseSeries {
    fn roles(&self) -> Option<Arc<dyn RolesStore>> {
        Some(self.roles.clone())
    }
}

/// Series handle matching the kind of `source`.
pub fn series_for(source: &Source) -> Arc<dyn TimeSeries> {
    if source.kind.supports_roles() {
        Arc::new(EnterpriseSeries::new(Arc::new(MemoryRolesStore::new())))
    } else {
        Arc::new(InfluxSeries)
    }
}

struct SourceEntry {
    source: Source,
    series: Arc<dyn TimeSeries>,
}

/// All sources served by this instance, keyed by ID.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: Arc<HashMap<i64, SourceEntry>>,
}

impl SourceRegistry {
    /// Build the registry, giving every source a fresh series handle.
    pub fn new(sources: impl IntoIterator<Item = Source>) -> Self {
        Self::with_series(sources.into_iter().map(|s| {
            let series = series_for(&s);
            (s, series)
        }))
    }

    /// Build the registry from explicit source/series pairs.
    pub fn with_series(entries: impl IntoIterator<Item = (Source, Arc<dyn TimeSeries>)>) -> Self {
        let sources: HashMap<i64, SourceEntry> = entries
            .into_iter()
            .map(|(source, series)| {
                info!(
                    source_id = source.id,
                    name = %source.name,
                    kind = ?source.kind,
                    "source registered"
                );
                (source.id, SourceEntry { source, series })
            })
            .collect();
        Self {
            sources: Arc::new(sources),
        }
    }

    pub fn get(&self, id: i64) -> Option<(Source, Arc<dyn TimeSeries>)> {
        self.sources
            .get(&id)
            .map(|e| (e.source.clone(), e.series.clone()))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
