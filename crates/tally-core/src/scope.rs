//! Request-scoped tenant and actor context.
//!
//! A [`Scope`] is built once per inbound request and passed by reference into
//! every store operation. Nothing in the workspace keeps a "current tenant" in
//! shared state.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// What an authenticated user may do within a tenant.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  #[default]
  Visitor,
  Collaborator,
  Administrator,
}

impl Role {
  /// Staff may respond to ideas, manage tags, and see private tags.
  pub fn is_staff(self) -> bool {
    matches!(self, Self::Collaborator | Self::Administrator)
  }
}

/// A resolved, authenticated user acting on behalf of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub user_id: Uuid,
  pub role:    Role,
}

impl Actor {
  pub fn new(user_id: Uuid, role: Role) -> Self { Self { user_id, role } }
}

/// The tenant every query is filtered by, plus the optional acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
  pub tenant_id: Uuid,
  pub actor:     Option<Actor>,
}

impl Scope {
  /// A scope with no signed-in user.
  pub fn anonymous(tenant_id: Uuid) -> Self { Self { tenant_id, actor: None } }

  pub fn acting(tenant_id: Uuid, actor: Actor) -> Self {
    Self { tenant_id, actor: Some(actor) }
  }

  pub fn viewer_id(&self) -> Option<Uuid> { self.actor.map(|a| a.user_id) }

  /// Whether private tags are visible to this viewer.
  pub fn is_staff(&self) -> bool {
    self.actor.is_some_and(|a| a.role.is_staff())
  }

  /// The acting user, for operations that stamp an author, responder or
  /// editor.
  pub fn require_actor(&self) -> Result<Actor> {
    self
      .actor
      .ok_or_else(|| Error::validation("an acting user is required"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn staff_roles() {
    assert!(!Role::Visitor.is_staff());
    assert!(Role::Collaborator.is_staff());
    assert!(Role::Administrator.is_staff());
  }

  #[test]
  fn role_parses_from_lowercase() {
    assert_eq!("administrator".parse::<Role>().unwrap(), Role::Administrator);
    assert_eq!(Role::Collaborator.to_string(), "collaborator");
    assert!("owner".parse::<Role>().is_err());
  }

  #[test]
  fn anonymous_scope_has_no_actor() {
    let scope = Scope::anonymous(Uuid::new_v4());
    assert!(scope.viewer_id().is_none());
    assert!(!scope.is_staff());
    assert!(matches!(scope.require_actor(), Err(Error::Validation(_))));
  }

  #[test]
  fn acting_scope_exposes_actor() {
    let user = Uuid::new_v4();
    let scope =
      Scope::acting(Uuid::new_v4(), Actor::new(user, Role::Collaborator));
    assert_eq!(scope.viewer_id(), Some(user));
    assert!(scope.is_staff());
    assert_eq!(scope.require_actor().unwrap().user_id, user);
  }
}
