//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::store::FeedbackStore`].
//! Authentication, TLS, and transport concerns are the caller's
//! responsibility; the tenant and acting user arrive as headers (see
//! [`context`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(store.clone()))
//! ```

pub mod comments;
pub mod context;
pub mod error;
pub mod ideas;
pub mod responses;
pub mod support;
pub mod tags;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use tally_core::store::FeedbackStore;

pub use context::RequestScope;
pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: FeedbackStore + 'static,
{
  Router::new()
    // Ideas
    .route("/ideas", get(ideas::list::<S>).post(ideas::create::<S>))
    .route("/ideas/by-slug/{slug}", get(ideas::get_by_slug::<S>))
    .route(
      "/ideas/{number}",
      get(ideas::get_one::<S>).put(ideas::update::<S>),
    )
    // Support
    .route(
      "/ideas/{number}/support",
      post(support::add::<S>).delete(support::remove::<S>),
    )
    .route("/supported", get(support::supported::<S>))
    // Responses
    .route("/ideas/{number}/respond", post(responses::respond::<S>))
    // Comments
    .route(
      "/ideas/{number}/comments",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route("/comments/{id}", put(comments::update::<S>))
    // Tags
    .route("/tags", get(tags::list::<S>).post(tags::create::<S>))
    .route("/tags/{slug}", put(tags::update::<S>).delete(tags::delete::<S>))
    .route(
      "/ideas/{number}/tags/{slug}",
      post(tags::assign::<S>).delete(tags::unassign::<S>),
    )
    .with_state(store)
}
