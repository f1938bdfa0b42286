//! [`SqliteStore`] and the query helpers shared by every component module.

use std::{collections::HashMap, path::Path};

use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, named_params, types::Value};
use tally_core::{Error as CoreError, idea::Idea, scope::Scope, store::Backend};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{IDEA_COLUMNS, RawIdea, RawIdeaView, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` against the connection outside any explicit transaction.
  pub(crate) async fn read<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }

  /// Run `f` inside an `IMMEDIATE` transaction.
  ///
  /// The transaction commits only if `f` succeeds; on any error it is dropped,
  /// which rolls every write back before the error is returned.
  pub(crate) async fn transact<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = match f(&tx) {
          Ok(out) => out,
          Err(e) => return Ok(Err(e)),
        };
        tx.commit()?;
        Ok(Ok(out))
      })
      .await?
  }
}

impl Backend for SqliteStore {
  type Error = Error;
}

// ─── Scope encoding ──────────────────────────────────────────────────────────

/// A [`Scope`] flattened into the owned values queries bind.
#[derive(Clone)]
pub(crate) struct BoundScope {
  pub tenant: String,
  pub viewer: Option<String>,
  pub staff:  bool,
}

impl From<&Scope> for BoundScope {
  fn from(scope: &Scope) -> Self {
    Self {
      tenant: encode_uuid(scope.tenant_id),
      viewer: scope.viewer_id().map(encode_uuid),
      staff:  scope.is_staff(),
    }
  }
}

// ─── Idea lookups ────────────────────────────────────────────────────────────

/// Which visible ideas a view query selects.
pub(crate) enum IdeaKey {
  Id(Uuid),
  Number(i64),
  Slug(String),
  /// Every idea, optionally restricted to a title/description substring.
  Matching(Option<String>),
}

impl IdeaKey {
  fn describe(&self) -> String {
    match self {
      Self::Id(id) => format!("idea {id}"),
      Self::Number(n) => format!("idea #{n}"),
      Self::Slug(s) => format!("idea {s:?}"),
      Self::Matching(_) => "idea".to_owned(),
    }
  }

  fn condition(&self) -> &'static str {
    match self {
      Self::Id(_) => "i.idea_id = :key",
      Self::Number(_) => "i.number = :key",
      Self::Slug(_) => "i.slug = :key",
      Self::Matching(_) => {
        "(:key IS NULL
          OR i.title       LIKE :key ESCAPE '\\'
          OR i.description LIKE :key ESCAPE '\\')"
      }
    }
  }

  fn value(&self) -> Value {
    match self {
      Self::Id(id) => Value::Text(encode_uuid(*id)),
      Self::Number(n) => Value::Integer(*n),
      Self::Slug(s) => Value::Text(s.clone()),
      Self::Matching(text) => match text {
        Some(t) => Value::Text(format!("%{}%", escape_like(t))),
        None => Value::Null,
      },
    }
  }
}

fn escape_like(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    if matches!(ch, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(ch);
  }
  out
}

/// Load the visible idea row identified by `idea_id`, or fail with not-found.
pub(crate) fn load_idea(
  conn: &Connection,
  tenant: &str,
  idea_id: Uuid,
) -> Result<Idea> {
  let sql = format!(
    "SELECT {IDEA_COLUMNS}
     FROM ideas i
     LEFT JOIN ideas o ON o.idea_id = i.original_id
     WHERE i.tenant_id = :tenant
       AND i.idea_id   = :idea
       AND i.status   != 'deleted'"
  );
  let raw = conn
    .query_row(
      &sql,
      named_params! { ":tenant": tenant, ":idea": encode_uuid(idea_id) },
      RawIdea::from_row,
    )
    .optional()?;

  match raw {
    Some(raw) => raw.into_idea(),
    None => Err(CoreError::not_found(format!("idea {idea_id}")).into()),
  }
}

/// Assemble the read model for every visible idea matching `key`, newest
/// first. Fails with not-found when a single-idea key matches nothing.
pub(crate) fn select_views(
  conn: &Connection,
  scope: &BoundScope,
  key: &IdeaKey,
) -> Result<Vec<RawIdeaView>> {
  let sql = format!(
    "SELECT {IDEA_COLUMNS},
       (SELECT COUNT(*) FROM supporters s WHERE s.idea_id = i.idea_id),
       (SELECT COUNT(*) FROM comments   c WHERE c.idea_id = i.idea_id),
       EXISTS (SELECT 1 FROM supporters s
               WHERE s.idea_id = i.idea_id AND s.user_id = :viewer)
     FROM ideas i
     LEFT JOIN ideas o ON o.idea_id = i.original_id
     WHERE i.tenant_id = :tenant
       AND i.status   != 'deleted'
       AND {}
     ORDER BY i.number DESC",
    key.condition()
  );

  let mut stmt = conn.prepare(&sql)?;
  let mut views = stmt
    .query_map(
      named_params! {
        ":tenant": scope.tenant,
        ":viewer": scope.viewer,
        ":key":    key.value(),
      },
      |row| {
        Ok(RawIdeaView {
          idea:             RawIdea::from_row(row)?,
          total_supporters: row.get(17)?,
          total_comments:   row.get(18)?,
          viewer_supports:  row.get(19)?,
          tags:             Vec::new(),
        })
      },
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  if views.is_empty() && !matches!(key, IdeaKey::Matching(_)) {
    return Err(CoreError::not_found(key.describe()).into());
  }

  let only = match views.as_slice() {
    [single] => Some(single.idea.idea_id.clone()),
    _ => None,
  };
  let mut tags = visible_tags(conn, scope, only)?;
  for view in &mut views {
    if let Some(slugs) = tags.remove(&view.idea.idea_id) {
      view.tags = slugs;
    }
  }

  Ok(views)
}

/// Slugs of tags visible to the viewer, keyed by encoded idea id, in tag
/// creation order. Restricted to one idea when `idea_id` is set.
fn visible_tags(
  conn: &Connection,
  scope: &BoundScope,
  idea_id: Option<String>,
) -> Result<HashMap<String, Vec<String>>> {
  let mut stmt = conn.prepare(
    "SELECT it.idea_id, t.slug
     FROM idea_tags it
     JOIN tags t ON t.tag_id = it.tag_id
     WHERE it.tenant_id = :tenant
       AND (t.is_public = 1 OR :staff)
       AND (:idea IS NULL OR it.idea_id = :idea)
     ORDER BY t.created_at, t.rowid",
  )?;

  let rows = stmt
    .query_map(
      named_params! {
        ":tenant": scope.tenant,
        ":staff":  scope.staff,
        ":idea":   idea_id,
      },
      |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut by_idea: HashMap<String, Vec<String>> = HashMap::new();
  for (idea, slug) in rows {
    by_idea.entry(idea).or_default().push(slug);
  }
  Ok(by_idea)
}

/// Convert an optional single row into a not-found error when absent.
pub(crate) fn found<T>(value: Option<T>, what: impl Into<String>) -> Result<T> {
  value.ok_or_else(|| Error::Core(CoreError::not_found(what)))
}
