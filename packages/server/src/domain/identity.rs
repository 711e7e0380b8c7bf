//! Authenticated identity attached to a connection.

use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// Coarse role issued by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
    Guest,
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            "guest" => Ok(Role::Guest),
            _ => Err(()),
        }
    }
}

/// Verified identity. A connection is unauthenticated until one of these
/// is attached to its registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, display_name: String, role: Role) -> Self {
        Self {
            user_id,
            display_name,
            role,
        }
    }
}
