//! Attendance forms, records, and their aggregated result.
//!
//! - [`model`] -- forms, records, participants, and the aggregated read-model.
//! - [`ports`] -- repository and result-cache traits.
//! - [`engine`] -- business rules over the ports.

pub mod engine;
pub mod model;
pub mod ports;

pub use engine::{AttendanceEngine, EngineConfig};
pub use model::{AggregatedResult, AttendanceForm, AttendanceRecord, FormInput, Participant};
pub use ports::{AttendanceRepository, CacheError, RepositoryError, ResultCache};
