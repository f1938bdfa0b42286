//! Handlers for comment endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/ideas/{number}/comments` | Oldest first |
//! | `POST` | `/ideas/{number}/comments` | Body: `{"content":"…"}` |
//! | `PUT`  | `/comments/{id}` | Author or staff |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tally_core::{comment::Comment, store::FeedbackStore};
use uuid::Uuid;

use crate::{context::RequestScope, error::ApiError, ideas::resolve};

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub content: String,
}

/// `GET /ideas/{number}/comments`
pub async fn list<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  RequestScope(scope): RequestScope,
  Path(number): Path<i64>,
) -> Result<Json<Vec<Comment>>, ApiError> {
  let view = resolve(store.as_ref(), &scope, number).await?;
  let comments = store
    .get_comments_by_idea(&scope, view.idea.idea_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(comments))
}

/// `POST /ideas/{number}/comments`
pub async fn create<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
  Path(number): Path<i64>,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError> {
  scope.actor()?;
  let view = resolve(store.as_ref(), &scope.0, number).await?;
  let comment_id = store
    .add_comment(&scope.0, view.idea.idea_id, &body.content)
    .await
    .map_err(ApiError::store)?;
  let comment = store
    .get_comment_by_id(&scope.0, comment_id)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `PUT /comments/{id}`
pub async fn update<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
  Path(comment_id): Path<Uuid>,
  Json(body): Json<CommentBody>,
) -> Result<Json<Comment>, ApiError> {
  let existing = store
    .get_comment_by_id(&scope.0, comment_id)
    .await
    .map_err(ApiError::store)?;
  scope.owner_or_staff(existing.author_id)?;

  store
    .update_comment(&scope.0, comment_id, &body.content)
    .await
    .map_err(ApiError::store)?;
  let comment = store
    .get_comment_by_id(&scope.0, comment_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(comment))
}
