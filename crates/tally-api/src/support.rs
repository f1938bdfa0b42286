//! Handlers for supporting ideas.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/ideas/{number}/support` | Acting user; no-op on closed ideas |
//! | `DELETE` | `/ideas/{number}/support` | Acting user |
//! | `GET`    | `/supported` | Idea ids the acting user supports |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use tally_core::store::FeedbackStore;
use uuid::Uuid;

use crate::{context::RequestScope, error::ApiError, ideas::resolve};

/// `POST /ideas/{number}/support`
pub async fn add<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
  Path(number): Path<i64>,
) -> Result<StatusCode, ApiError> {
  let actor = scope.actor()?;
  let view = resolve(store.as_ref(), &scope.0, number).await?;
  store
    .add_supporter(&scope.0, view.idea.idea_id, actor.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /ideas/{number}/support`
pub async fn remove<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
  Path(number): Path<i64>,
) -> Result<StatusCode, ApiError> {
  let actor = scope.actor()?;
  let view = resolve(store.as_ref(), &scope.0, number).await?;
  store
    .remove_supporter(&scope.0, view.idea.idea_id, actor.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /supported`
pub async fn supported<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
) -> Result<Json<Vec<Uuid>>, ApiError> {
  let actor = scope.actor()?;
  let ids = store
    .supported_by(&scope.0, actor.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ids))
}
