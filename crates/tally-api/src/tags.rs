//! Handlers for tag endpoints. Everything except listing is staff only.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/tags` | Private tags only for staff |
//! | `POST`   | `/tags` | Body: `{"name":"Bug","color":"FF0000","is_public":true}` |
//! | `PUT`    | `/tags/{slug}` | Same body |
//! | `DELETE` | `/tags/{slug}` | Also drops assignments |
//! | `POST`   | `/ideas/{number}/tags/{slug}` | Assign |
//! | `DELETE` | `/ideas/{number}/tags/{slug}` | Unassign |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use tally_core::{
  store::FeedbackStore,
  tag::{Tag, TagInput},
};

use crate::{context::RequestScope, error::ApiError, ideas::resolve};

/// `GET /tags`
pub async fn list<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  RequestScope(scope): RequestScope,
) -> Result<Json<Vec<Tag>>, ApiError> {
  let tags = store.list_tags(&scope).await.map_err(ApiError::store)?;
  Ok(Json(tags))
}

/// `POST /tags`
pub async fn create<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
  Json(body): Json<TagInput>,
) -> Result<impl IntoResponse, ApiError> {
  scope.staff()?;
  let tag = store.add_tag(&scope.0, body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(tag)))
}

/// `PUT /tags/{slug}`
pub async fn update<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
  Path(slug): Path<String>,
  Json(body): Json<TagInput>,
) -> Result<Json<Tag>, ApiError> {
  scope.staff()?;
  let tag = store
    .get_tag_by_slug(&scope.0, &slug)
    .await
    .map_err(ApiError::store)?;
  let tag = store
    .update_tag(&scope.0, tag.tag_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(tag))
}

/// `DELETE /tags/{slug}`
pub async fn delete<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
  Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
  scope.staff()?;
  let tag = store
    .get_tag_by_slug(&scope.0, &slug)
    .await
    .map_err(ApiError::store)?;
  store
    .delete_tag(&scope.0, tag.tag_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /ideas/{number}/tags/{slug}`
pub async fn assign<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
  Path((number, slug)): Path<(i64, String)>,
) -> Result<StatusCode, ApiError> {
  scope.staff()?;
  let view = resolve(store.as_ref(), &scope.0, number).await?;
  let tag = store
    .get_tag_by_slug(&scope.0, &slug)
    .await
    .map_err(ApiError::store)?;
  store
    .assign_tag(&scope.0, tag.tag_id, view.idea.idea_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /ideas/{number}/tags/{slug}`
pub async fn unassign<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
  Path((number, slug)): Path<(i64, String)>,
) -> Result<StatusCode, ApiError> {
  scope.staff()?;
  let view = resolve(store.as_ref(), &scope.0, number).await?;
  let tag = store
    .get_tag_by_slug(&scope.0, &slug)
    .await
    .map_err(ApiError::store)?;
  store
    .unassign_tag(&scope.0, tag.tag_id, view.idea.idea_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
