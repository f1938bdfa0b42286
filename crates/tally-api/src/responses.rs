//! Handler for `POST /ideas/{number}/respond` (staff only).
//!
//! Body: `{"status":"started","text":"…"}`. A `duplicate` status merges the
//! idea into `original_number` instead of taking text. Deleting an idea that a
//! duplicate still points at is rejected by the store with 400.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Deserialize;
use tally_core::{idea::IdeaStatus, store::FeedbackStore};

use crate::{context::RequestScope, error::ApiError, ideas::resolve};

#[derive(Debug, Deserialize)]
pub struct RespondBody {
  pub status:          IdeaStatus,
  #[serde(default)]
  pub text:            String,
  pub original_number: Option<i64>,
}

/// `POST /ideas/{number}/respond`
pub async fn respond<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
  Path(number): Path<i64>,
  Json(body): Json<RespondBody>,
) -> Result<StatusCode, ApiError> {
  scope.staff()?;
  let view = resolve(store.as_ref(), &scope.0, number).await?;
  let idea_id = view.idea.idea_id;

  match body.status {
    IdeaStatus::Duplicate => {
      let original_number = body.original_number.ok_or_else(|| {
        ApiError::BadRequest("original_number is required for duplicates".into())
      })?;
      let original = resolve(store.as_ref(), &scope.0, original_number).await?;
      store
        .mark_as_duplicate(&scope.0, idea_id, original.idea.idea_id)
        .await
        .map_err(ApiError::store)?;
    }
    status => {
      store
        .set_response(&scope.0, idea_id, body.text, status)
        .await
        .map_err(ApiError::store)?;
    }
  }

  Ok(StatusCode::NO_CONTENT)
}
