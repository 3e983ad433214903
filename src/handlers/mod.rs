use std::sync::Arc;

use crate::{
    config::Config,
    kv::{KvClient, KvStore},
    services::{FabricCatalog, GalleryStore, MetricsService, RateLimiter},
    utils::Clock,
};

pub mod fabrics;
pub mod gallery;
pub mod health;
pub mod metrics;
pub mod rate_limit;

#[derive(Clone)]
pub struct AppState {
    pub kv: KvClient,
    pub rate_limiter: RateLimiter,
    pub gallery: GalleryStore,
    pub fabrics: FabricCatalog,
    pub config: Config,
    pub metrics: Arc<MetricsService>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> anyhow::Result<Self> {
        let kv = KvClient::new(store);

        Ok(Self {
            rate_limiter: RateLimiter::new(kv.clone(), clock.clone(), config.daily_limit),
            gallery: GalleryStore::new(kv.clone(), clock.clone()),
            fabrics: FabricCatalog::new(kv.clone(), clock),
            metrics: Arc::new(MetricsService::new()?),
            kv,
            config,
        })
    }
}
