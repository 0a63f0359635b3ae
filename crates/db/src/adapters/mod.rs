//! Postgres implementations of the `absensi-core` ports.

mod attendance;
mod result_cache;

pub use attendance::{map_sqlx_error, PgAttendanceRepository};
pub use result_cache::PgResultCache;
