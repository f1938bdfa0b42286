//! [`TagDirectory`] for [`SqliteStore`].

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params};
use tally_core::{
  Error as CoreError,
  idea::IdeaStatus,
  scope::Scope,
  store::TagDirectory,
  tag::{Tag, TagInput},
};
use uuid::Uuid;

use crate::{
  Result, SqliteStore,
  encode::{RawTag, encode_dt, encode_uuid},
  store::found,
  supporters::idea_status,
};

/// Fail when another tag in the tenant already uses `slug`.
fn ensure_slug_free(
  conn: &Connection,
  tenant: &str,
  slug: &str,
  exclude: Option<&str>,
) -> Result<()> {
  let taken: bool = conn.query_row(
    "SELECT EXISTS (
       SELECT 1 FROM tags
       WHERE tenant_id = ?1 AND slug = ?2 AND (?3 IS NULL OR tag_id != ?3)
     )",
    params![tenant, slug, exclude],
    |r| r.get(0),
  )?;
  if taken {
    return Err(CoreError::validation(format!("tag {slug:?} already exists")).into());
  }
  Ok(())
}

fn tag_exists(conn: &Connection, tenant: &str, tag_id: &str) -> Result<bool> {
  Ok(conn.query_row(
    "SELECT EXISTS (SELECT 1 FROM tags WHERE tenant_id = ?1 AND tag_id = ?2)",
    params![tenant, tag_id],
    |r| r.get(0),
  )?)
}

fn select_tag(conn: &Connection, tenant: &str, tag_id: &str) -> Result<Option<RawTag>> {
  let sql = format!(
    "SELECT {} FROM tags t WHERE t.tenant_id = ?1 AND t.tag_id = ?2",
    RawTag::COLUMNS
  );
  Ok(conn.query_row(&sql, params![tenant, tag_id], RawTag::from_row).optional()?)
}

fn ensure_visible_idea(conn: &Connection, tenant: &str, idea_id: Uuid) -> Result<String> {
  let idea_str = encode_uuid(idea_id);
  match idea_status(conn, tenant, &idea_str)? {
    Some(status) if status != IdeaStatus::Deleted => Ok(idea_str),
    _ => found(None, format!("idea {idea_id}")),
  }
}

impl TagDirectory for SqliteStore {
  async fn add_tag(&self, scope: &Scope, input: TagInput) -> Result<Tag> {
    let input = input.validate()?;
    let tag = Tag {
      tag_id:     Uuid::new_v4(),
      tenant_id:  scope.tenant_id,
      slug:       input.slug(),
      name:       input.name,
      color:      input.color,
      is_public:  input.is_public,
      created_at: Utc::now(),
    };

    let row = tag.clone();
    self
      .transact(move |conn| {
        let tenant = encode_uuid(row.tenant_id);
        ensure_slug_free(conn, &tenant, &row.slug, None)?;
        conn.execute(
          "INSERT INTO tags (
             tag_id, tenant_id, name, slug, color, is_public, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![
            encode_uuid(row.tag_id),
            tenant,
            row.name,
            row.slug,
            row.color,
            row.is_public,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(tenant = %scope.tenant_id, slug = %tag.slug, "tag added");
    Ok(tag)
  }

  async fn update_tag(
    &self,
    scope: &Scope,
    tag_id: Uuid,
    input: TagInput,
  ) -> Result<Tag> {
    let input = input.validate()?;
    let slug = input.slug();
    let tenant = encode_uuid(scope.tenant_id);
    let tag_str = encode_uuid(tag_id);

    let raw = self
      .transact(move |conn| {
        if !tag_exists(conn, &tenant, &tag_str)? {
          return found(None, format!("tag {tag_id}"));
        }
        ensure_slug_free(conn, &tenant, &slug, Some(&tag_str))?;
        conn.execute(
          "UPDATE tags
           SET name = ?1, slug = ?2, color = ?3, is_public = ?4
           WHERE tenant_id = ?5 AND tag_id = ?6",
          params![input.name, slug, input.color, input.is_public, tenant, tag_str],
        )?;
        found(select_tag(conn, &tenant, &tag_str)?, format!("tag {tag_id}"))
      })
      .await?;

    let tag = raw.into_tag()?;
    tracing::debug!(tenant = %scope.tenant_id, slug = %tag.slug, "tag updated");
    Ok(tag)
  }

  async fn delete_tag(&self, scope: &Scope, tag_id: Uuid) -> Result<()> {
    let tenant = encode_uuid(scope.tenant_id);
    let tag_str = encode_uuid(tag_id);

    let removed = self
      .transact(move |conn| {
        conn.execute(
          "DELETE FROM idea_tags WHERE tenant_id = ?1 AND tag_id = ?2",
          params![tenant, tag_str],
        )?;
        Ok(conn.execute(
          "DELETE FROM tags WHERE tenant_id = ?1 AND tag_id = ?2",
          params![tenant, tag_str],
        )?)
      })
      .await?;

    if removed == 0 {
      return found(None, format!("tag {tag_id}"));
    }
    tracing::debug!(tenant = %scope.tenant_id, %tag_id, "tag deleted");
    Ok(())
  }

  async fn get_tag_by_slug(&self, scope: &Scope, slug: &str) -> Result<Tag> {
    let tenant = encode_uuid(scope.tenant_id);
    let slug_owned = slug.to_owned();

    let raw = self
      .read(move |conn| {
        let sql = format!(
          "SELECT {} FROM tags t WHERE t.tenant_id = ?1 AND t.slug = ?2",
          RawTag::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, params![tenant, slug_owned], RawTag::from_row)
            .optional()?,
        )
      })
      .await?;

    found(raw, format!("tag {slug:?}"))?.into_tag()
  }

  async fn list_tags(&self, scope: &Scope) -> Result<Vec<Tag>> {
    let tenant = encode_uuid(scope.tenant_id);
    let staff = scope.is_staff();

    let raws = self
      .read(move |conn| {
        let sql = format!(
          "SELECT {}
           FROM tags t
           WHERE t.tenant_id = ?1 AND (t.is_public = 1 OR ?2)
           ORDER BY t.created_at, t.rowid",
          RawTag::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![tenant, staff], RawTag::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTag::into_tag).collect()
  }

  async fn assign_tag(&self, scope: &Scope, tag_id: Uuid, idea_id: Uuid) -> Result<()> {
    let tenant = encode_uuid(scope.tenant_id);
    let tag_str = encode_uuid(tag_id);
    let at_str = encode_dt(Utc::now());

    self
      .transact(move |conn| {
        if !tag_exists(conn, &tenant, &tag_str)? {
          return found(None, format!("tag {tag_id}"));
        }
        let idea_str = ensure_visible_idea(conn, &tenant, idea_id)?;
        conn.execute(
          "INSERT OR IGNORE INTO idea_tags (tag_id, idea_id, tenant_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![tag_str, idea_str, tenant, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(tenant = %scope.tenant_id, %tag_id, %idea_id, "tag assigned");
    Ok(())
  }

  async fn unassign_tag(&self, scope: &Scope, tag_id: Uuid, idea_id: Uuid) -> Result<()> {
    let tenant = encode_uuid(scope.tenant_id);
    let tag_str = encode_uuid(tag_id);
    let idea_str = encode_uuid(idea_id);

    self
      .transact(move |conn| {
        conn.execute(
          "DELETE FROM idea_tags
           WHERE tenant_id = ?1 AND tag_id = ?2 AND idea_id = ?3",
          params![tenant, tag_str, idea_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(tenant = %scope.tenant_id, %tag_id, %idea_id, "tag unassigned");
    Ok(())
  }

  async fn assigned_tags(&self, scope: &Scope, idea_id: Uuid) -> Result<Vec<Tag>> {
    let tenant = encode_uuid(scope.tenant_id);

    let raws = self
      .read(move |conn| {
        let idea_str = ensure_visible_idea(conn, &tenant, idea_id)?;
        let sql = format!(
          "SELECT {}
           FROM tags t
           JOIN idea_tags it ON it.tag_id = t.tag_id
           WHERE it.tenant_id = ?1 AND it.idea_id = ?2
           ORDER BY t.created_at, t.rowid",
          RawTag::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![tenant, idea_str], RawTag::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTag::into_tag).collect()
  }
}
