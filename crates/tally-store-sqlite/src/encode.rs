//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! precision so that lexical order equals chronological order. UUIDs are
//! stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use tally_core::{
  comment::{Comment, CommentEdit},
  idea::{DuplicateOf, Idea, IdeaState, IdeaStatus, IdeaView, OriginalIdea, Response},
  tag::Tag,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── IdeaStatus ───────────────────────────────────────────────────────────────

pub fn encode_status(s: IdeaStatus) -> &'static str {
  match s {
    IdeaStatus::Open => "open",
    IdeaStatus::Started => "started",
    IdeaStatus::Completed => "completed",
    IdeaStatus::Declined => "declined",
    IdeaStatus::Duplicate => "duplicate",
    IdeaStatus::Deleted => "deleted",
  }
}

pub fn decode_status(s: &str) -> Result<IdeaStatus> {
  s.parse()
    .map_err(|_| Error::Corrupt(format!("unknown idea status: {s:?}")))
}

// ─── IdeaState ────────────────────────────────────────────────────────────────

/// The `ideas` columns an [`IdeaState`] is flattened into.
pub struct StateColumns {
  pub status:        &'static str,
  pub response_text: Option<String>,
  pub responder_id:  Option<String>,
  pub responded_at:  Option<String>,
  pub original_id:   Option<String>,
}

pub fn encode_state(state: &IdeaState) -> StateColumns {
  let response = state.response();
  StateColumns {
    status:        encode_status(state.status()),
    response_text: response.map(|r| r.text.clone()),
    responder_id:  response.map(|r| encode_uuid(r.responder_id)),
    responded_at:  response.map(|r| encode_dt(r.responded_at)),
    original_id:   state.original().map(|o| encode_uuid(o.idea_id)),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawIdea::from_row`]. Expects `ideas i` left-joined
/// to its original as `ideas o`.
pub const IDEA_COLUMNS: &str = "
  i.idea_id, i.tenant_id, i.number, i.slug, i.title, i.description,
  i.author_id, i.created_at, i.status,
  i.response_text, i.responder_id, i.responded_at,
  o.idea_id, o.number, o.title, o.slug, o.status";

/// Raw values read from an `ideas` row plus its joined original.
pub struct RawIdea {
  pub idea_id:       String,
  pub tenant_id:     String,
  pub number:        i64,
  pub slug:          String,
  pub title:         String,
  pub description:   String,
  pub author_id:     String,
  pub created_at:    String,
  pub status:        String,
  pub response_text: Option<String>,
  pub responder_id:  Option<String>,
  pub responded_at:  Option<String>,
  pub original:      Option<RawOriginal>,
}

/// The joined original of a duplicate.
pub struct RawOriginal {
  pub idea_id: String,
  pub number:  i64,
  pub title:   String,
  pub slug:    String,
  pub status:  String,
}

impl RawIdea {
  /// Read the [`IDEA_COLUMNS`] starting at column 0.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    let original_id: Option<String> = row.get(12)?;
    let original = match original_id {
      Some(idea_id) => Some(RawOriginal {
        idea_id,
        number: row.get(13)?,
        title:  row.get(14)?,
        slug:   row.get(15)?,
        status: row.get(16)?,
      }),
      None => None,
    };

    Ok(Self {
      idea_id: row.get(0)?,
      tenant_id: row.get(1)?,
      number: row.get(2)?,
      slug: row.get(3)?,
      title: row.get(4)?,
      description: row.get(5)?,
      author_id: row.get(6)?,
      created_at: row.get(7)?,
      status: row.get(8)?,
      response_text: row.get(9)?,
      responder_id: row.get(10)?,
      responded_at: row.get(11)?,
      original,
    })
  }

  pub fn into_idea(self) -> Result<Idea> {
    let status = decode_status(&self.status)?;

    let response =
      match (self.response_text, self.responder_id, self.responded_at) {
        (Some(text), Some(by), Some(at)) => Some(Response {
          text,
          responder_id: decode_uuid(&by)?,
          responded_at: decode_dt(&at)?,
        }),
        _ => None,
      };

    let state = match (status, response) {
      (IdeaStatus::Open, _) => IdeaState::Open,
      (IdeaStatus::Duplicate, Some(response)) => {
        let original = self
          .original
          .ok_or_else(|| {
            Error::Corrupt(format!("duplicate idea {} has no original", self.idea_id))
          })?
          .into_original()?;
        IdeaState::Duplicate(DuplicateOf { response, original })
      }
      (status, Some(response)) => IdeaState::with_response(status, response)?,
      (status, None) => {
        return Err(Error::Corrupt(format!(
          "{status} idea {} has no response",
          self.idea_id
        )));
      }
    };

    Ok(Idea {
      idea_id: decode_uuid(&self.idea_id)?,
      tenant_id: decode_uuid(&self.tenant_id)?,
      number: self.number,
      slug: self.slug,
      title: self.title,
      description: self.description,
      author_id: decode_uuid(&self.author_id)?,
      created_at: decode_dt(&self.created_at)?,
      state,
    })
  }
}

impl RawOriginal {
  fn into_original(self) -> Result<OriginalIdea> {
    Ok(OriginalIdea {
      idea_id: decode_uuid(&self.idea_id)?,
      number:  self.number,
      title:   self.title,
      slug:    self.slug,
      status:  decode_status(&self.status)?,
    })
  }
}

/// An idea row with its derived counters; tags are attached afterwards.
pub struct RawIdeaView {
  pub idea:             RawIdea,
  pub total_supporters: i64,
  pub total_comments:   i64,
  pub viewer_supports:  bool,
  pub tags:             Vec<String>,
}

impl RawIdeaView {
  pub fn into_view(self) -> Result<IdeaView> {
    Ok(IdeaView {
      idea:             self.idea.into_idea()?,
      total_supporters: self.total_supporters.max(0) as u64,
      total_comments:   self.total_comments.max(0) as u64,
      viewer_supports:  self.viewer_supports,
      tags:             self.tags,
    })
  }
}

/// Raw values read from a `comments` row.
pub struct RawComment {
  pub comment_id: String,
  pub idea_id:    String,
  pub author_id:  String,
  pub content:    String,
  pub created_at: String,
  pub editor_id:  Option<String>,
  pub edited_at:  Option<String>,
}

impl RawComment {
  pub const COLUMNS: &'static str = "c.comment_id, c.idea_id, c.author_id, \
                                     c.content, c.created_at, c.editor_id, \
                                     c.edited_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id: row.get(0)?,
      idea_id:    row.get(1)?,
      author_id:  row.get(2)?,
      content:    row.get(3)?,
      created_at: row.get(4)?,
      editor_id:  row.get(5)?,
      edited_at:  row.get(6)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    let edit = match (self.editor_id, self.edited_at) {
      (Some(by), Some(at)) => Some(CommentEdit {
        editor_id: decode_uuid(&by)?,
        edited_at: decode_dt(&at)?,
      }),
      _ => None,
    };

    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      idea_id: decode_uuid(&self.idea_id)?,
      author_id: decode_uuid(&self.author_id)?,
      content: self.content,
      created_at: decode_dt(&self.created_at)?,
      edit,
    })
  }
}

/// Raw values read from a `tags` row.
pub struct RawTag {
  pub tag_id:     String,
  pub tenant_id:  String,
  pub name:       String,
  pub slug:       String,
  pub color:      String,
  pub is_public:  bool,
  pub created_at: String,
}

impl RawTag {
  pub const COLUMNS: &'static str =
    "t.tag_id, t.tenant_id, t.name, t.slug, t.color, t.is_public, t.created_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      tag_id:     row.get(0)?,
      tenant_id:  row.get(1)?,
      name:       row.get(2)?,
      slug:       row.get(3)?,
      color:      row.get(4)?,
      is_public:  row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_tag(self) -> Result<Tag> {
    Ok(Tag {
      tag_id:     decode_uuid(&self.tag_id)?,
      tenant_id:  decode_uuid(&self.tenant_id)?,
      name:       self.name,
      slug:       self.slug,
      color:      self.color,
      is_public:  self.is_public,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
