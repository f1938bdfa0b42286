//! The idea response state machine.
//!
//! These functions decide what state an idea moves into; backends persist the
//! result inside a transaction. Keeping the rules here means every backend
//! applies them identically.
//!
//! ```text
//!          ┌──────────── respond(Open) clears ─────────────┐
//!          ▼                                               │
//!        Open ──respond──▶ Started / Completed / Declined ──┘
//!          │                        │
//!          ├── mark_duplicate ──────┴──▶ Duplicate
//!          └── respond(Deleted) ──────▶ Deleted   (hidden from reads)
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  idea::{DuplicateOf, Idea, IdeaState, IdeaStatus, Response},
};

/// Whether a new supporter may be added in `status`.
///
/// Removal is always permitted so that support given before an idea closed can
/// still be withdrawn.
pub fn accepts_support(status: IdeaStatus) -> bool { !status.is_closed() }

/// Compute the state after a staff response of `status` with `text`.
///
/// - A duplicate only accepts `Deleted`; it is not reopened once merged.
/// - `Open` clears any response.
/// - A first response is stamped with `responder` and `now`.
/// - A later response keeps the original responder. It keeps the original
///   timestamp while the status is unchanged and takes `now` when the status
///   changes. The text is always replaced.
pub fn respond(
  current: &IdeaState,
  status: IdeaStatus,
  text: String,
  responder: Uuid,
  now: DateTime<Utc>,
) -> Result<IdeaState> {
  if current.status() == IdeaStatus::Duplicate && status != IdeaStatus::Deleted {
    return Err(Error::validation(
      "a duplicate cannot be reopened or responded to; delete it instead",
    ));
  }
  if status == IdeaStatus::Open {
    return Ok(IdeaState::Open);
  }

  let response = match current.response() {
    None => Response { text, responder_id: responder, responded_at: now },
    Some(prev) => Response {
      text,
      responder_id: prev.responder_id,
      responded_at: if current.status() == status {
        prev.responded_at
      } else {
        now
      },
    },
  };

  IdeaState::with_response(status, response)
}

/// Compute the state of `duplicate` once it is merged into `original`.
///
/// Chained merges are rejected: the original must not itself be a duplicate.
pub fn mark_duplicate(
  duplicate: &Idea,
  original: &Idea,
  responder: Uuid,
  now: DateTime<Utc>,
) -> Result<IdeaState> {
  if duplicate.idea_id == original.idea_id {
    return Err(Error::validation("an idea cannot duplicate itself"));
  }
  if duplicate.tenant_id != original.tenant_id {
    return Err(Error::not_found(format!("idea #{}", original.number)));
  }
  match original.status() {
    IdeaStatus::Duplicate => {
      return Err(Error::validation(format!(
        "idea #{} is itself a duplicate; merge into its original instead",
        original.number
      )));
    }
    IdeaStatus::Deleted => {
      return Err(Error::not_found(format!("idea #{}", original.number)));
    }
    _ => {}
  }

  Ok(IdeaState::Duplicate(DuplicateOf {
    response: Response {
      text:         String::new(),
      responder_id: responder,
      responded_at: now,
    },
    original: original.as_original(),
  }))
}
