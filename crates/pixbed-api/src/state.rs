//! Application state
//!
//! AppState wires the pipelines to concrete store/storage/audit
//! implementations behind their traits, so the HTTP layer (and its tests)
//! can run against PostgreSQL + local disk or fully in memory.

use std::sync::Arc;
use std::time::Duration;

use pixbed_core::models::{StoreStats, UploadProfile};
use pixbed_core::{Config, TtlCache};
use pixbed_db::{AssetStore, AuditSink};
use pixbed_processing::{AssetLifecycle, DeliveryPipeline, IngestPipeline};
use pixbed_storage::Storage;

/// Validation profiles, resolved once at startup.
#[derive(Clone)]
pub struct Profiles {
    pub authenticated: UploadProfile,
    pub guest: UploadProfile,
}

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn AssetStore>,
    pub storage: Arc<dyn Storage>,
    pub audit: Arc<dyn AuditSink>,
    pub ingest: IngestPipeline,
    pub deliver: DeliveryPipeline,
    pub lifecycle: AssetLifecycle,
    pub profiles: Profiles,
    /// Cached statistics response. Purely a latency optimization - the
    /// statistics endpoint works identically with this cache disabled.
    pub stats_cache: TtlCache<&'static str, StoreStats>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn AssetStore>,
        storage: Arc<dyn Storage>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let profiles = Profiles {
            authenticated: config.authenticated_profile(),
            guest: config.guest_profile(),
        };
        let stats_cache = TtlCache::new(4, Duration::from_secs(config.stats_cache_ttl_seconds));

        AppState {
            ingest: IngestPipeline::new(store.clone(), storage.clone(), audit.clone()),
            deliver: DeliveryPipeline::new(store.clone(), storage.clone(), config.default_quality),
            lifecycle: AssetLifecycle::new(store.clone(), storage.clone(), audit.clone()),
            config,
            store,
            storage,
            audit,
            profiles,
            stats_cache,
        }
    }
}
