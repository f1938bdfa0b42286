//! Handlers for `/ideas` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/ideas` | `?q=&sort=&tags=a,b&status=open,started&limit=` |
//! | `POST` | `/ideas` | Body: `{"title":"…","description":"…"}` |
//! | `GET`  | `/ideas/{number}` | 404 if missing or deleted |
//! | `PUT`  | `/ideas/{number}` | Author or staff |
//! | `GET`  | `/ideas/by-slug/{slug}` | |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tally_core::{
  idea::{Idea, IdeaInput, IdeaStatus, IdeaView},
  ranking::SortMode,
  scope::Scope,
  store::{FeedbackStore, IdeaQuery},
};

use crate::{context::RequestScope, error::ApiError};

/// Look an idea up by its per-tenant number.
pub(crate) async fn resolve<S: FeedbackStore>(
  store: &S,
  scope: &Scope,
  number: i64,
) -> Result<IdeaView, ApiError> {
  store
    .get_idea_by_number(scope, number)
    .await
    .map_err(ApiError::store)
}

// ─── List / search ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Substring of title or description.
  pub q:      Option<String>,
  pub sort:   Option<SortMode>,
  /// Comma-separated tag slugs; all must be present.
  pub tags:   Option<String>,
  /// Comma-separated statuses.
  pub status: Option<String>,
  pub limit:  Option<usize>,
}

impl SearchParams {
  fn is_empty(&self) -> bool {
    self.q.is_none()
      && self.sort.is_none()
      && self.tags.is_none()
      && self.status.is_none()
      && self.limit.is_none()
  }
}

fn split_list(raw: Option<String>) -> Vec<String> {
  raw
    .map(|s| {
      s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
    })
    .unwrap_or_default()
}

/// `GET /ideas`
pub async fn list<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  RequestScope(scope): RequestScope,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<IdeaView>>, ApiError> {
  if params.is_empty() {
    let ideas = store.list_ideas(&scope).await.map_err(ApiError::store)?;
    return Ok(Json(ideas));
  }

  let statuses = split_list(params.status)
    .iter()
    .map(|s| {
      s.parse::<IdeaStatus>()
        .map_err(|_| ApiError::BadRequest(format!("unknown status {s:?}")))
    })
    .collect::<Result<Vec<_>, _>>()?;

  let query = IdeaQuery {
    text: params.q,
    sort: params.sort.unwrap_or_default(),
    tags: split_list(params.tags),
    statuses,
    limit: params.limit,
  };
  let ideas = store.search(&scope, &query).await.map_err(ApiError::store)?;
  Ok(Json(ideas))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /ideas`
pub async fn create<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
  Json(body): Json<IdeaInput>,
) -> Result<impl IntoResponse, ApiError> {
  scope.actor()?;
  let idea = store
    .create_idea(&scope.0, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(idea)))
}

// ─── Get ─────────────────────────────────────────────────────────────────────

/// `GET /ideas/{number}`
pub async fn get_one<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  RequestScope(scope): RequestScope,
  Path(number): Path<i64>,
) -> Result<Json<IdeaView>, ApiError> {
  Ok(Json(resolve(store.as_ref(), &scope, number).await?))
}

/// `GET /ideas/by-slug/{slug}`
pub async fn get_by_slug<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  RequestScope(scope): RequestScope,
  Path(slug): Path<String>,
) -> Result<Json<IdeaView>, ApiError> {
  let view = store
    .get_idea_by_slug(&scope, &slug)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(view))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /ideas/{number}`
pub async fn update<S: FeedbackStore>(
  State(store): State<Arc<S>>,
  scope: RequestScope,
  Path(number): Path<i64>,
  Json(body): Json<IdeaInput>,
) -> Result<Json<Idea>, ApiError> {
  let view = resolve(store.as_ref(), &scope.0, number).await?;
  scope.owner_or_staff(view.idea.author_id)?;
  let idea = store
    .update_idea(&scope.0, view.idea.idea_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(idea))
}
