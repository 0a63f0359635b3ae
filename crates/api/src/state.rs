use std::sync::Arc;
use std::time::Duration;

use absensi_core::attendance::{AttendanceEngine, EngineConfig};
use absensi_core::clock::SystemClock;
use absensi_core::rbac::RolePermissions;
use absensi_db::PgAttendanceRepository;

use crate::cache::ResultCacheBackend;
use crate::config::ServerConfig;

/// The engine as wired in production: Postgres records, the configured
/// result cache, the static role table, and the wall clock.
pub type Engine =
    AttendanceEngine<PgAttendanceRepository, ResultCacheBackend, RolePermissions, SystemClock>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the engine and config sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: absensi_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub engine: Arc<Engine>,
}

impl AppState {
    /// Wire the engine onto `pool` with the cache backend named in `config`.
    pub fn new(pool: absensi_db::DbPool, config: ServerConfig) -> Self {
        let cache = ResultCacheBackend::from_config(&config, pool.clone());
        let engine = AttendanceEngine::new(
            PgAttendanceRepository::new(pool.clone()),
            cache,
            RolePermissions,
            SystemClock,
            EngineConfig {
                result_ttl: Duration::from_secs(config.result_cache_ttl_secs),
            },
        );

        Self {
            pool,
            config: Arc::new(config),
            engine: Arc::new(engine),
        }
    }
}
