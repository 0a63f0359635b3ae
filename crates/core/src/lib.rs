//! Domain layer for attendance forms.
//!
//! Holds the pure policy pieces (window, status codec, capability table),
//! the persistence and cache ports, and the [`attendance::AttendanceEngine`]
//! that orchestrates them. Nothing in this crate talks to a database or the
//! network directly.

pub mod attendance;
pub mod cache;
pub mod clock;
pub mod datetime;
pub mod error;
pub mod rbac;
pub mod status;
pub mod types;
pub mod window;
