//! Authorization Policy
//! Mission: Decide who may act on what, before anything is written
//!
//! Two rules cover every protected action:
//! - `OwnerOrAdmin`: the actor owns the resource, or is an admin.
//! - `AdminOnly`: the actor is an admin, ownership is irrelevant.

use crate::auth::models::User;
use crate::error::ApiError;
use tracing::warn;
use uuid::Uuid;

/// Anything that records the user who created it.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    OwnerOrAdmin,
    AdminOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Pure decision function. `owner_id` is ignored for `AdminOnly`.
pub fn evaluate(actor: &User, owner_id: Option<Uuid>, requirement: Requirement) -> Decision {
    let allowed = match requirement {
        Requirement::AdminOnly => actor.is_admin,
        Requirement::OwnerOrAdmin => actor.is_admin || owner_id == Some(actor.id),
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Owner-or-admin check against a raw owner id.
pub fn authorize(actor: &User, owner_id: Uuid, action: &str) -> Result<(), ApiError> {
    match evaluate(actor, Some(owner_id), Requirement::OwnerOrAdmin) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            warn!(actor = %actor.id, owner = %owner_id, action, "Forbidden: not owner or admin");
            Err(ApiError::Forbidden(action.to_string()))
        }
    }
}

/// Owner-or-admin check against a loaded resource.
pub fn authorize_resource<R: Owned>(actor: &User, resource: &R, action: &str) -> Result<(), ApiError> {
    authorize(actor, resource.owner_id(), action)
}

/// Admin-only check.
pub fn require_admin(actor: &User) -> Result<(), ApiError> {
    match evaluate(actor, None, Requirement::AdminOnly) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            warn!(actor = %actor.id, "Forbidden: admin required");
            Err(ApiError::Forbidden("perform this action, admin only".to_string()))
        }
    }
}
