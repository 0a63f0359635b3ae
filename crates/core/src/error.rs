use crate::types::DbId;

/// Closed error taxonomy returned by every engine operation.
///
/// Cache failures never show up here; they are absorbed where they happen.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Capability denied, form not open, or caller is not the owner.
    /// The three causes share one kind so callers cannot tell them apart.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
