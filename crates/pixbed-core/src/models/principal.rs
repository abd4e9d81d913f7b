use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use crate::constants::GUEST_PRINCIPAL_ID;
use crate::models::asset::Asset;

/// Role of a request principal, as supplied by the authentication
/// collaborator in front of this service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// An authenticated (or guest) request principal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    /// The synthetic principal that owns unauthenticated uploads. Provisioned
    /// deterministically, never lazily created.
    pub fn guest() -> Self {
        Principal {
            id: GUEST_PRINCIPAL_ID,
            role: Role::User,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.id == GUEST_PRINCIPAL_ID
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this principal may delete or mutate the given asset.
    /// Admins may touch anything; owners may touch their own uploads. The
    /// guest principal never counts as an owner - guest uploads can only be
    /// removed by an admin.
    pub fn can_modify(&self, asset: &Asset) -> bool {
        if self.is_admin() {
            return true;
        }
        !self.is_guest() && asset.owner_id == self.id
    }
}
