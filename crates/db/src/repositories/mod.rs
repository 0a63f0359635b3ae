//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod attendance_form_repo;
pub mod attendance_record_repo;
pub mod participant_group_repo;
pub mod result_cache_repo;
pub mod user_repo;

pub use attendance_form_repo::AttendanceFormRepo;
pub use attendance_record_repo::AttendanceRecordRepo;
pub use participant_group_repo::ParticipantGroupRepo;
pub use result_cache_repo::ResultCacheRepo;
pub use user_repo::UserRepo;
