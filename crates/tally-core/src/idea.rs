//! Ideas: the feedback items users submit, support, and staff respond to.
//!
//! An idea row is never physically removed. "Deleting" an idea moves it into
//! [`IdeaState::Deleted`], which hides it from every read path while keeping
//! its per-tenant number reserved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// Longest accepted idea title, in characters.
pub const MAX_TITLE_LEN: usize = 100;

// ─── Status ──────────────────────────────────────────────────────────────────

/// The flat status discriminant of an idea, as stored and as filtered on.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IdeaStatus {
  Open,
  Started,
  Completed,
  Declined,
  Duplicate,
  Deleted,
}

impl IdeaStatus {
  /// Closed ideas accept no new supporters.
  pub fn is_closed(self) -> bool {
    matches!(
      self,
      Self::Completed | Self::Declined | Self::Duplicate | Self::Deleted
    )
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

/// A staff response attached to an idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
  pub text:         String,
  pub responder_id: Uuid,
  pub responded_at: DateTime<Utc>,
}

/// Summary of the canonical idea a duplicate points at, resolved on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalIdea {
  pub idea_id: Uuid,
  pub number:  i64,
  pub title:   String,
  pub slug:    String,
  pub status:  IdeaStatus,
}

/// Response payload of an idea merged into another one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateOf {
  #[serde(flatten)]
  pub response: Response,
  pub original: OriginalIdea,
}

/// Status paired with the response payload that status carries.
///
/// Open ideas have no response at all; only duplicates reference an original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "response", rename_all = "snake_case")]
pub enum IdeaState {
  Open,
  Started(Response),
  Completed(Response),
  Declined(Response),
  Duplicate(DuplicateOf),
  Deleted(Response),
}

impl IdeaState {
  pub fn status(&self) -> IdeaStatus {
    match self {
      Self::Open => IdeaStatus::Open,
      Self::Started(_) => IdeaStatus::Started,
      Self::Completed(_) => IdeaStatus::Completed,
      Self::Declined(_) => IdeaStatus::Declined,
      Self::Duplicate(_) => IdeaStatus::Duplicate,
      Self::Deleted(_) => IdeaStatus::Deleted,
    }
  }

  pub fn response(&self) -> Option<&Response> {
    match self {
      Self::Open => None,
      Self::Started(r)
      | Self::Completed(r)
      | Self::Declined(r)
      | Self::Deleted(r) => Some(r),
      Self::Duplicate(d) => Some(&d.response),
    }
  }

  pub fn original(&self) -> Option<&OriginalIdea> {
    match self {
      Self::Duplicate(d) => Some(&d.original),
      _ => None,
    }
  }

  /// Pair `status` with a response.
  ///
  /// `Open` discards the response. `Duplicate` cannot be built here because it
  /// also needs an original; use [`IdeaState::Duplicate`] directly.
  pub fn with_response(status: IdeaStatus, response: Response) -> Result<Self> {
    Ok(match status {
      IdeaStatus::Open => Self::Open,
      IdeaStatus::Started => Self::Started(response),
      IdeaStatus::Completed => Self::Completed(response),
      IdeaStatus::Declined => Self::Declined(response),
      IdeaStatus::Deleted => Self::Deleted(response),
      IdeaStatus::Duplicate => {
        return Err(Error::validation(
          "a duplicate needs an original idea; mark it as a duplicate instead",
        ));
      }
    })
  }
}

// ─── Idea ────────────────────────────────────────────────────────────────────

/// A persisted idea, without derived counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idea {
  /// Globally unique; never changes.
  pub idea_id:     Uuid,
  pub tenant_id:   Uuid,
  /// Per-tenant sequence number, starting at 1 and never reused.
  pub number:      i64,
  pub slug:        String,
  pub title:       String,
  pub description: String,
  pub author_id:   Uuid,
  pub created_at:  DateTime<Utc>,
  pub state:       IdeaState,
}

impl Idea {
  pub fn status(&self) -> IdeaStatus { self.state.status() }

  /// Summary used when another idea is merged into this one.
  pub fn as_original(&self) -> OriginalIdea {
    OriginalIdea {
      idea_id: self.idea_id,
      number:  self.number,
      title:   self.title.clone(),
      slug:    self.slug.clone(),
      status:  self.status(),
    }
  }
}

/// The read model for an idea: the row joined with its supporters, comments,
/// and the tags the viewer may see. Never stored, always assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaView {
  pub idea:             Idea,
  pub total_supporters: u64,
  pub total_comments:   u64,
  /// Whether the scope's actor supports this idea; `false` when anonymous.
  pub viewer_supports:  bool,
  /// Slugs of assigned tags visible to the viewer, in tag creation order.
  pub tags:             Vec<String>,
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Title and description as supplied by a user, for creation and edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaInput {
  pub title:       String,
  #[serde(default)]
  pub description: String,
}

impl IdeaInput {
  pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self { title: title.into(), description: description.into() }
  }

  /// Trim both fields and check the title.
  pub fn validate(self) -> Result<Self> {
    let title = self.title.trim().to_owned();
    if title.is_empty() {
      return Err(Error::validation("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
      return Err(Error::validation(format!(
        "title must be at most {MAX_TITLE_LEN} characters"
      )));
    }
    Ok(Self { title, description: self.description.trim().to_owned() })
  }
}
