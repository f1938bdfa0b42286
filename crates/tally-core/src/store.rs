//! Storage traits and supporting query types.
//!
//! Each component of the ledger is its own trait so that callers can state
//! exactly what they need. All of them share one [`Backend`] error type.
//! Backends (e.g. `tally-store-sqlite`) implement every trait and therefore
//! [`FeedbackStore`].
//!
//! Every method takes the request [`Scope`]. Backends must filter every read
//! and write by `scope.tenant_id` themselves; callers are never trusted to do
//! so.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Classify,
  comment::Comment,
  idea::{Idea, IdeaInput, IdeaStatus, IdeaView},
  ranking::SortMode,
  scope::Scope,
  tag::{Tag, TagInput},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`IdeaLedger::search`].
#[derive(Debug, Clone, Default)]
pub struct IdeaQuery {
  /// Case-insensitive substring matched against title and description.
  pub text:     Option<String>,
  pub sort:     SortMode,
  /// Tag slugs; returned ideas must hold every one of them.
  pub tags:     Vec<String>,
  /// If non-empty, only ideas in one of these statuses are returned.
  /// `Deleted` is never returned regardless.
  pub statuses: Vec<IdeaStatus>,
  pub limit:    Option<usize>,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// The error type shared by every component trait of a backend.
pub trait Backend: Send + Sync {
  type Error: std::error::Error
    + Classify
    + From<crate::Error>
    + Send
    + Sync
    + 'static;
}

/// Idea creation, lookup, listing and edits.
///
/// Every lookup fails with a not-found error when the idea is missing, belongs
/// to another tenant, or has been deleted.
pub trait IdeaLedger: Backend {
  /// Create an idea authored by the scope's actor, allocating the tenant's
  /// next number.
  fn create_idea<'a>(
    &'a self,
    scope: &'a Scope,
    input: IdeaInput,
  ) -> impl Future<Output = Result<Idea, Self::Error>> + Send + 'a;

  fn get_idea_by_id<'a>(
    &'a self,
    scope: &'a Scope,
    idea_id: Uuid,
  ) -> impl Future<Output = Result<IdeaView, Self::Error>> + Send + 'a;

  fn get_idea_by_number<'a>(
    &'a self,
    scope: &'a Scope,
    number: i64,
  ) -> impl Future<Output = Result<IdeaView, Self::Error>> + Send + 'a;

  fn get_idea_by_slug<'a>(
    &'a self,
    scope: &'a Scope,
    slug: &'a str,
  ) -> impl Future<Output = Result<IdeaView, Self::Error>> + Send + 'a;

  /// All visible ideas, most recently created first.
  fn list_ideas<'a>(
    &'a self,
    scope: &'a Scope,
  ) -> impl Future<Output = Result<Vec<IdeaView>, Self::Error>> + Send + 'a;

  fn search<'a>(
    &'a self,
    scope: &'a Scope,
    query: &'a IdeaQuery,
  ) -> impl Future<Output = Result<Vec<IdeaView>, Self::Error>> + Send + 'a;

  /// Replace title and description, regenerating the slug.
  fn update_idea<'a>(
    &'a self,
    scope: &'a Scope,
    idea_id: Uuid,
    input: IdeaInput,
  ) -> impl Future<Output = Result<Idea, Self::Error>> + Send + 'a;

  /// Whether another non-deleted idea is a duplicate pointing at this one.
  fn is_referenced<'a>(
    &'a self,
    scope: &'a Scope,
    idea_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

/// Who supports which idea.
pub trait SupporterLedger: Backend {
  /// Idempotent. Silently ignored when the idea is closed.
  fn add_supporter<'a>(
    &'a self,
    scope: &'a Scope,
    idea_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Idempotent, and allowed regardless of the idea's status.
  fn remove_supporter<'a>(
    &'a self,
    scope: &'a Scope,
    idea_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn count_supporters<'a>(
    &'a self,
    scope: &'a Scope,
    idea_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  fn viewer_supports<'a>(
    &'a self,
    scope: &'a Scope,
    idea_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Ideas `user_id` currently supports, in idea creation order.
  fn supported_by<'a>(
    &'a self,
    scope: &'a Scope,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + 'a;
}

/// Staff responses and duplicate merges. Each call is a single transaction.
pub trait ResponseLedger: Backend {
  /// Apply [`crate::lifecycle::respond`]. Responding with
  /// [`IdeaStatus::Deleted`] soft-deletes the idea and drops its supporters.
  fn set_response<'a>(
    &'a self,
    scope: &'a Scope,
    idea_id: Uuid,
    text: String,
    status: IdeaStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Mark `duplicate_id` as a duplicate of `original_id` and give the original
  /// every supporter of the duplicate it did not already have.
  fn mark_as_duplicate<'a>(
    &'a self,
    scope: &'a Scope,
    duplicate_id: Uuid,
    original_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Per-idea comment log.
pub trait CommentLog: Backend {
  /// Append a comment by the scope's actor and return its identifier.
  fn add_comment<'a>(
    &'a self,
    scope: &'a Scope,
    idea_id: Uuid,
    text: &'a str,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + 'a;

  fn get_comment_by_id<'a>(
    &'a self,
    scope: &'a Scope,
    comment_id: Uuid,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + 'a;

  /// Comments on an idea, oldest first.
  fn get_comments_by_idea<'a>(
    &'a self,
    scope: &'a Scope,
    idea_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + 'a;

  /// Replace the content and stamp the scope's actor as editor.
  fn update_comment<'a>(
    &'a self,
    scope: &'a Scope,
    comment_id: Uuid,
    text: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Tag definitions and their assignment to ideas.
pub trait TagDirectory: Backend {
  fn add_tag<'a>(
    &'a self,
    scope: &'a Scope,
    input: TagInput,
  ) -> impl Future<Output = Result<Tag, Self::Error>> + Send + 'a;

  fn update_tag<'a>(
    &'a self,
    scope: &'a Scope,
    tag_id: Uuid,
    input: TagInput,
  ) -> impl Future<Output = Result<Tag, Self::Error>> + Send + 'a;

  /// Delete a tag together with its assignments.
  fn delete_tag<'a>(
    &'a self,
    scope: &'a Scope,
    tag_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_tag_by_slug<'a>(
    &'a self,
    scope: &'a Scope,
    slug: &'a str,
  ) -> impl Future<Output = Result<Tag, Self::Error>> + Send + 'a;

  /// Tags visible to the scope's viewer, in creation order.
  fn list_tags<'a>(
    &'a self,
    scope: &'a Scope,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + 'a;

  /// Idempotent.
  fn assign_tag<'a>(
    &'a self,
    scope: &'a Scope,
    tag_id: Uuid,
    idea_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Idempotent.
  fn unassign_tag<'a>(
    &'a self,
    scope: &'a Scope,
    tag_id: Uuid,
    idea_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Every tag assigned to an idea, in creation order, regardless of viewer.
  fn assigned_tags<'a>(
    &'a self,
    scope: &'a Scope,
    idea_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + 'a;
}

/// Everything the HTTP layer needs from a backend.
pub trait FeedbackStore:
  IdeaLedger + SupporterLedger + ResponseLedger + CommentLog + TagDirectory
{
}

impl<T> FeedbackStore for T where
  T: IdeaLedger + SupporterLedger + ResponseLedger + CommentLog + TagDirectory
{
}
