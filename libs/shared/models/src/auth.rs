use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role claims supplied by the external identity layer. This service never
/// resolves identities itself; it only consumes the claims as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "patient" => Some(Role::Patient),
            "doctor" => Some(Role::Doctor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Opaque caller identity attached to every request by the identity
/// middleware. The id is whatever the upstream auth service issued; no
/// cross-service mapping to patient or doctor records is attempted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub id: Uuid,
    pub roles: HashSet<Role>,
}

impl CallerIdentity {
    pub fn new(id: Uuid, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            id,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}
