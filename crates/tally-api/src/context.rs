//! Request context extraction.
//!
//! Every request names its tenant and, optionally, the acting user through
//! headers set by whatever sits in front of this API (session middleware, a
//! gateway). Nothing here authenticates; the headers are trusted.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use tally_core::scope::{Actor, Role, Scope};
use uuid::Uuid;

use crate::error::ApiError;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const USER_HEADER: &str = "x-user-id";
pub const ROLE_HEADER: &str = "x-user-role";

/// The [`Scope`] of the current request.
#[derive(Debug, Clone, Copy)]
pub struct RequestScope(pub Scope);

impl RequestScope {
  /// The acting user, or 400 when the request is anonymous.
  pub fn actor(&self) -> Result<Actor, ApiError> {
    self.0.actor.ok_or_else(|| {
      ApiError::BadRequest(format!("the {USER_HEADER} header is required"))
    })
  }

  /// The acting user if they are staff, or 403.
  pub fn staff(&self) -> Result<Actor, ApiError> {
    let actor = self.actor()?;
    if !actor.role.is_staff() {
      return Err(ApiError::Forbidden("staff only".into()));
    }
    Ok(actor)
  }

  /// The acting user if they are `owner` or staff, or 403.
  pub fn owner_or_staff(&self, owner: Uuid) -> Result<Actor, ApiError> {
    let actor = self.actor()?;
    if actor.user_id != owner && !actor.role.is_staff() {
      return Err(ApiError::Forbidden("only the author or staff may edit".into()));
    }
    Ok(actor)
  }
}

fn header<'h>(headers: &'h HeaderMap, name: &str) -> Result<Option<&'h str>, ApiError> {
  headers
    .get(name)
    .map(|v| {
      v.to_str()
        .map(str::trim)
        .map_err(|_| ApiError::BadRequest(format!("{name} is not valid text")))
    })
    .transpose()
}

fn uuid_header(headers: &HeaderMap, name: &str) -> Result<Option<Uuid>, ApiError> {
  header(headers, name)?
    .map(|v| {
      v.parse::<Uuid>()
        .map_err(|_| ApiError::BadRequest(format!("{name} must be a UUID")))
    })
    .transpose()
}

/// Build a scope from request headers.
pub fn scope_from_headers(headers: &HeaderMap) -> Result<Scope, ApiError> {
  let tenant_id = uuid_header(headers, TENANT_HEADER)?.ok_or_else(|| {
    ApiError::BadRequest(format!("the {TENANT_HEADER} header is required"))
  })?;

  let Some(user_id) = uuid_header(headers, USER_HEADER)? else {
    return Ok(Scope::anonymous(tenant_id));
  };

  let role = match header(headers, ROLE_HEADER)? {
    Some(raw) => raw
      .to_ascii_lowercase()
      .parse::<Role>()
      .map_err(|_| ApiError::BadRequest(format!("unknown role {raw:?}")))?,
    None => Role::default(),
  };

  Ok(Scope::acting(tenant_id, Actor::new(user_id, role)))
}

impl<S> FromRequestParts<S> for RequestScope
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    scope_from_headers(&parts.headers).map(Self)
  }
}
