//! Organisation-defined labels that staff attach to ideas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, scope::Scope, slug::slugify};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  pub tag_id:     Uuid,
  pub tenant_id:  Uuid,
  pub name:       String,
  pub slug:       String,
  /// Six hex digits, without a leading `#`.
  pub color:      String,
  /// Private tags are only visible to staff.
  pub is_public:  bool,
  pub created_at: DateTime<Utc>,
}

impl Tag {
  pub fn is_visible_to(&self, scope: &Scope) -> bool {
    self.is_public || scope.is_staff()
  }
}

/// Fields of a tag as supplied by staff, for creation and edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInput {
  pub name:      String,
  pub color:     String,
  pub is_public: bool,
}

impl TagInput {
  pub fn new(
    name: impl Into<String>,
    color: impl Into<String>,
    is_public: bool,
  ) -> Self {
    Self { name: name.into(), color: color.into(), is_public }
  }

  /// Trim the name, normalise the color to uppercase, and check both.
  pub fn validate(self) -> Result<Self> {
    let name = self.name.trim().to_owned();
    if slugify(&name).is_empty() {
      return Err(Error::validation("tag name is required"));
    }
    let color = self.color.trim().trim_start_matches('#').to_ascii_uppercase();
    if color.len() != 6 || !color.chars().all(|c| c.is_ascii_hexdigit()) {
      return Err(Error::validation(format!(
        "tag color must be six hex digits, got {:?}",
        self.color
      )));
    }
    Ok(Self { name, color, is_public: self.is_public })
  }

  pub fn slug(&self) -> String { slugify(&self.name) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scope::{Actor, Role};

  fn tag(is_public: bool) -> Tag {
    Tag {
      tag_id: Uuid::new_v4(),
      tenant_id: Uuid::nil(),
      name: "Bug".into(),
      slug: "bug".into(),
      color: "FF0000".into(),
      is_public,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn private_tags_need_staff() {
    let tenant = Uuid::nil();
    let visitor =
      Scope::acting(tenant, Actor::new(Uuid::new_v4(), Role::Visitor));
    let staff =
      Scope::acting(tenant, Actor::new(Uuid::new_v4(), Role::Administrator));

    assert!(tag(true).is_visible_to(&Scope::anonymous(tenant)));
    assert!(!tag(false).is_visible_to(&Scope::anonymous(tenant)));
    assert!(!tag(false).is_visible_to(&visitor));
    assert!(tag(false).is_visible_to(&staff));
  }

  #[test]
  fn input_normalises_color() {
    let input = TagInput::new(" Feature Request ", "#00ff00", true)
      .validate()
      .unwrap();
    assert_eq!(input.name, "Feature Request");
    assert_eq!(input.color, "00FF00");
    assert_eq!(input.slug(), "feature-request");
  }

  #[test]
  fn input_rejects_bad_color_and_blank_name() {
    assert!(TagInput::new("Bug", "red", true).validate().is_err());
    assert!(TagInput::new("Bug", "FFFFFFF", true).validate().is_err());
    assert!(TagInput::new("  ", "FFFFFF", true).validate().is_err());
  }
}
