//! Row models and DTOs for every table.

pub mod attendance_form;
pub mod attendance_record;
pub mod participant_group;
pub mod user;
