//! Comments attached to ideas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Who last edited a comment, and when. Both are set together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEdit {
  pub editor_id: Uuid,
  pub edited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub idea_id:    Uuid,
  /// The original author; an edit by someone else never changes it.
  pub author_id:  Uuid,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  /// `None` until the comment has been edited at least once.
  pub edit:       Option<CommentEdit>,
}

/// Trim comment text and reject it if nothing is left.
pub fn validate_content(text: &str) -> Result<String> {
  let content = text.trim();
  if content.is_empty() {
    return Err(Error::validation("comment text is required"));
  }
  Ok(content.to_owned())
}
