//! Authenticated actors acting on orders.
//!
//! The identity context outside this crate resolves a request to an
//! `(actor_id, role)` pair. The domain treats that pair as opaque input and
//! never looks up credentials itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::orders::Stage;

/// Stable actor identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = "uuid")]
pub struct ActorId(Uuid);

impl ActorId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ActorId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {value}")]
pub struct RoleParseError {
    value: String,
}

/// Functional role of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Back-office administrator with override rights.
    Admin,
    /// Customer placing label orders for their company.
    BusinessOwner,
    /// Operator of the printing stage.
    Printing,
    /// Operator of the plant (fulfilment) stage.
    Plant,
}

impl Role {
    /// Stable string form used in sessions and storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::BusinessOwner => "business_owner",
            Self::Printing => "printing",
            Self::Plant => "plant",
        }
    }

    /// Pipeline stage operated by this role, if any.
    pub const fn stage(self) -> Option<Stage> {
        match self {
            Self::Printing => Some(Stage::Printing),
            Self::Plant => Some(Stage::Plant),
            Self::Admin | Self::BusinessOwner => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "business_owner" => Ok(Self::BusinessOwner),
            "printing" => Ok(Self::Printing),
            "plant" => Ok(Self::Plant),
            other => Err(RoleParseError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Authenticated caller of an order operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    id: ActorId,
    role: Role,
}

impl Actor {
    /// Pair an identifier with its role.
    pub const fn new(id: ActorId, role: Role) -> Self {
        Self { id, role }
    }

    /// Identifier of the actor.
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Role the actor is acting under.
    pub const fn role(&self) -> Role {
        self.role
    }
}
