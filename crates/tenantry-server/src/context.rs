//! Composition root: builds every long-lived component once at startup
//! and hands them to the router.

use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use surrealdb::engine::any::Any;
use tenantry_auth::{Argon2PasswordHasher, AuthService};
use tenantry_cache::{CacheAside, CacheBackend, CachedRegistrationRepository, CachedUserRepository};
use tenantry_core::error::TenantryResult;
use tenantry_core::telemetry::TelemetryService;
use tenantry_db::DbManager;
use tenantry_db::repository::{SurrealRegistrationRepository, SurrealUserRepository};
use tracing::info;

use crate::config::Config;
use crate::state::AppState;
use crate::token::{PlaceholderTokenIssuer, TokenIssuer};

/// How often expired entries are swept from the memory cache.
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// The production authentication stack: SurrealDB behind the shared
/// cache, Argon2id for credentials.
pub type SurrealAuthService = AuthService<
    CachedUserRepository<SurrealUserRepository<Any>, CacheBackend>,
    CachedRegistrationRepository<SurrealRegistrationRepository<Any>, CacheBackend>,
    Argon2PasswordHasher,
>;

pub struct AppContext {
    pub db: DbManager,
    pub cache: Arc<CacheBackend>,
    pub telemetry: Arc<dyn TelemetryService>,
    pub auth: Arc<SurrealAuthService>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppContext {
    pub async fn build(config: &Config) -> TenantryResult<Self> {
        let telemetry = tenantry_telemetry::from_config(&config.telemetry_config());
        let metrics = if telemetry.is_enabled() {
            crate::metrics::install_recorder()
        } else {
            None
        };

        let db = DbManager::connect(&config.db_config()).await?;
        tenantry_db::init_schema(db.client()).await?;

        let cache = Arc::new(CacheBackend::from_enabled(config.cache_enabled));
        info!(mode = cache.mode(), "Cache backend selected");
        let aside = CacheAside::new(
            Arc::clone(&cache),
            Arc::clone(&telemetry),
            config.cache_policy(),
        );

        let hasher = Argon2PasswordHasher::new(&config.auth_config())?;
        let auth = AuthService::new(
            CachedUserRepository::new(SurrealUserRepository::new(db.client().clone()), aside.clone()),
            CachedRegistrationRepository::new(
                SurrealRegistrationRepository::new(db.client().clone()),
                aside,
            ),
            hasher,
            Arc::clone(&telemetry),
        );

        Ok(Self {
            db,
            cache,
            telemetry,
            auth: Arc::new(auth),
            tokens: Arc::new(PlaceholderTokenIssuer),
            metrics,
        })
    }

    pub fn state(&self) -> AppState<SurrealAuthService> {
        AppState {
            auth: Arc::clone(&self.auth),
            telemetry: Arc::clone(&self.telemetry),
            tokens: Arc::clone(&self.tokens),
            metrics: self.metrics.clone(),
        }
    }

    /// Periodically drop expired entries from the memory cache. Must be
    /// called from within a tokio runtime; does nothing when caching is
    /// disabled.
    pub fn spawn_cache_purge(&self) {
        let CacheBackend::Memory(memory) = self.cache.as_ref() else {
            return;
        };
        let memory = memory.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CACHE_PURGE_INTERVAL);
            loop {
                interval.tick().await;
                let purged = memory.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, remaining = memory.len(), "purged expired cache entries");
                }
            }
        });
    }
}
