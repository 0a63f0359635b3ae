//! Request handlers.
//!
//! Attendance handlers translate HTTP payloads into engine calls and hand the
//! caller's [`crate::middleware::auth::AuthUser`] down as the principal.
//! Errors map through [`crate::error::AppError`].

pub mod attendance;
pub mod auth;
pub mod participant_group;
