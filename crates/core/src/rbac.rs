//! Roles, principals, and the capability table consulted by the engine.
//!
//! Role names must match the `users.role` check constraint in
//! `20240301000001_create_users_table.sql`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MEMBER: &str = "member";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Member => ROLE_MEMBER,
        }
    }

    /// Parse a stored or token-embedded role name.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw {
            ROLE_ADMIN => Ok(Self::Admin),
            ROLE_MEMBER => Ok(Self::Member),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

/// The authenticated caller of an engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: DbId,
    pub role: Role,
}

impl Principal {
    pub fn new(id: DbId, role: Role) -> Self {
        Self { id, role }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    AbsentForm,
    AbsentList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateAny,
    ReadAny,
    ReadAll,
    UpdateAny,
}

/// Policy lookup answering whether a principal may perform `action` on `resource`.
///
/// Implementations must be pure: no I/O, no side effects.
pub trait AuthorizationGate: Send + Sync {
    fn has_capability(&self, principal: &Principal, resource: Resource, action: Action) -> bool;
}

/// Static role table used in production.
///
/// | Resource     | Action    | Roles          |
/// |--------------|-----------|----------------|
/// | `AbsentForm` | CreateAny | admin          |
/// | `AbsentForm` | UpdateAny | admin          |
/// | `AbsentForm` | ReadAll   | admin          |
/// | `AbsentForm` | ReadAny   | admin, member  |
/// | `AbsentList` | CreateAny | admin, member  |
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePermissions;

const PERMISSIONS: &[(Resource, Action, &[Role])] = &[
    (Resource::AbsentForm, Action::CreateAny, &[Role::Admin]),
    (Resource::AbsentForm, Action::UpdateAny, &[Role::Admin]),
    (Resource::AbsentForm, Action::ReadAll, &[Role::Admin]),
    (Resource::AbsentForm, Action::ReadAny, &[Role::Admin, Role::Member]),
    (Resource::AbsentList, Action::CreateAny, &[Role::Admin, Role::Member]),
];

impl AuthorizationGate for RolePermissions {
    fn has_capability(&self, principal: &Principal, resource: Resource, action: Action) -> bool {
        PERMISSIONS
            .iter()
            .find(|(r, a, _)| *r == resource && *a == action)
            .is_some_and(|(_, _, roles)| roles.contains(&principal.role))
    }
}
