// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use innsync_audit::Actor;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AuthError;

/// Actor roles for authorization.
///
/// Roles determine what actions an authenticated actor may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Revenue manager: edits rates and availability and drives channel sync.
    Manager,
    /// Front desk: reads calendars and checks room and parking availability.
    FrontDesk,
}

impl Role {
    /// Returns the string form used in audit labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::FrontDesk => "front_desk",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Self::Manager),
            "front_desk" => Ok(Self::FrontDesk),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Unknown role '{s}'"),
            }),
        }
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Converts this authenticated actor into an audit Actor.
    ///
    /// Used to attribute sync logs to the operator who triggered them.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), String::from(self.role.as_str()))
    }
}

/// Authorization checks per action.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require_manager(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Manager => Ok(()),
            Role::FrontDesk => Err(AuthError::Unauthorized {
                action: String::from(action),
                required_role: String::from("Manager"),
            }),
        }
    }

    /// Checks if an actor may run a bulk edit.
    ///
    /// Dry runs are open to every role; commits require Manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a Manager and the edit commits.
    pub fn authorize_bulk_edit(actor: &AuthenticatedActor, dry_run: bool) -> Result<(), AuthError> {
        if dry_run {
            return Ok(());
        }
        Self::require_manager(actor, "bulk_edit")
    }

    /// Checks if an actor may trigger a channel sync.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a Manager.
    pub fn authorize_sync(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_manager(actor, "channel_sync")
    }
}

/// Stub authentication function.
///
/// Accepts any non-empty actor id with the supplied role. Credential
/// checking belongs to the identity provider in front of this service.
///
/// # Errors
///
/// Returns an error if the actor id is empty.
pub fn authenticate_stub(actor_id: String, role: Role) -> Result<AuthenticatedActor, AuthError> {
    if actor_id.trim().is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    Ok(AuthenticatedActor::new(actor_id, role))
}
