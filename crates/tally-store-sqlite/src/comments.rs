//! [`CommentLog`] for [`SqliteStore`].

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params};
use tally_core::{
  comment::{Comment, validate_content},
  idea::IdeaStatus,
  scope::Scope,
  store::CommentLog,
};
use uuid::Uuid;

use crate::{
  Result, SqliteStore,
  encode::{RawComment, encode_dt, encode_uuid},
  store::found,
  supporters::idea_status,
};

impl CommentLog for SqliteStore {
  async fn add_comment(&self, scope: &Scope, idea_id: Uuid, text: &str) -> Result<Uuid> {
    let author = scope.require_actor()?;
    let content = validate_content(text)?;

    let comment_id = Uuid::new_v4();
    let tenant = encode_uuid(scope.tenant_id);
    let idea_str = encode_uuid(idea_id);
    let comment_str = encode_uuid(comment_id);
    let author_str = encode_uuid(author.user_id);
    let at_str = encode_dt(Utc::now());

    self
      .transact(move |conn| {
        match idea_status(conn, &tenant, &idea_str)? {
          Some(status) if status != IdeaStatus::Deleted => {}
          _ => return found(None, format!("idea {idea_id}")),
        }
        conn.execute(
          "INSERT INTO comments (
             comment_id, idea_id, tenant_id, author_id, content, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![comment_str, idea_str, tenant, author_str, content, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(tenant = %scope.tenant_id, %idea_id, %comment_id, "comment added");
    Ok(comment_id)
  }

  async fn get_comment_by_id(&self, scope: &Scope, comment_id: Uuid) -> Result<Comment> {
    let tenant = encode_uuid(scope.tenant_id);
    let comment_str = encode_uuid(comment_id);

    let raw: Option<RawComment> = self
      .read(move |conn| {
        let sql = format!(
          "SELECT {}
           FROM comments c
           JOIN ideas i ON i.idea_id = c.idea_id
           WHERE c.tenant_id  = ?1
             AND c.comment_id = ?2
             AND i.status    != 'deleted'",
          RawComment::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, params![tenant, comment_str], RawComment::from_row)
            .optional()?,
        )
      })
      .await?;

    found(raw, format!("comment {comment_id}"))?.into_comment()
  }

  async fn get_comments_by_idea(
    &self,
    scope: &Scope,
    idea_id: Uuid,
  ) -> Result<Vec<Comment>> {
    let tenant = encode_uuid(scope.tenant_id);
    let idea_str = encode_uuid(idea_id);

    let raws: Vec<RawComment> = self
      .read(move |conn| {
        match idea_status(conn, &tenant, &idea_str)? {
          Some(status) if status != IdeaStatus::Deleted => {}
          _ => return found(None, format!("idea {idea_id}")),
        }

        let sql = format!(
          "SELECT {}
           FROM comments c
           WHERE c.tenant_id = ?1 AND c.idea_id = ?2
           ORDER BY c.created_at, c.rowid",
          RawComment::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![tenant, idea_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn update_comment(&self, scope: &Scope, comment_id: Uuid, text: &str) -> Result<()> {
    let editor = scope.require_actor()?;
    let content = validate_content(text)?;

    let tenant = encode_uuid(scope.tenant_id);
    let comment_str = encode_uuid(comment_id);
    let editor_str = encode_uuid(editor.user_id);
    let at_str = encode_dt(Utc::now());

    let changed = self
      .transact(move |conn| {
        Ok(conn.execute(
          "UPDATE comments
           SET content = ?1, editor_id = ?2, edited_at = ?3
           WHERE tenant_id  = ?4
             AND comment_id = ?5
             AND idea_id IN (
               SELECT idea_id FROM ideas
               WHERE tenant_id = ?4 AND status != 'deleted'
             )",
          params![content, editor_str, at_str, tenant, comment_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return found(None, format!("comment {comment_id}"));
    }
    tracing::debug!(tenant = %scope.tenant_id, %comment_id, editor = %editor.user_id, "comment edited");
    Ok(())
  }
}
