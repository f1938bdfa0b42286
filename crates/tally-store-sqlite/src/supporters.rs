//! [`SupporterLedger`] for [`SqliteStore`].
//!
//! The `(idea_id, user_id)` primary key makes a second insert of the same pair
//! a no-op at the storage level, so concurrent duplicate adds converge on a
//! single row.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params};
use tally_core::{
  idea::IdeaStatus, lifecycle::accepts_support, scope::Scope,
  store::SupporterLedger,
};
use uuid::Uuid;

use crate::{
  Result, SqliteStore,
  encode::{decode_status, decode_uuid, encode_dt, encode_uuid},
  store::found,
};

/// Status of an idea in the tenant, deleted ones included.
pub(crate) fn idea_status(
  conn: &Connection,
  tenant: &str,
  idea_id: &str,
) -> Result<Option<IdeaStatus>> {
  let raw: Option<String> = conn
    .query_row(
      "SELECT status FROM ideas WHERE tenant_id = ?1 AND idea_id = ?2",
      params![tenant, idea_id],
      |r| r.get(0),
    )
    .optional()?;
  raw.as_deref().map(decode_status).transpose()
}

impl SupporterLedger for SqliteStore {
  async fn add_supporter(
    &self,
    scope: &Scope,
    idea_id: Uuid,
    user_id: Uuid,
  ) -> Result<()> {
    let tenant = encode_uuid(scope.tenant_id);
    let idea_str = encode_uuid(idea_id);
    let user_str = encode_uuid(user_id);
    let at_str = encode_dt(Utc::now());

    let added = self
      .transact(move |conn| {
        let status =
          found(idea_status(conn, &tenant, &idea_str)?, format!("idea {idea_id}"))?;
        if !accepts_support(status) {
          return Ok(false);
        }
        let changed = conn.execute(
          "INSERT OR IGNORE INTO supporters (idea_id, user_id, tenant_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![idea_str, user_str, tenant, at_str],
        )?;
        Ok(changed > 0)
      })
      .await?;

    tracing::debug!(tenant = %scope.tenant_id, %idea_id, %user_id, added, "add supporter");
    Ok(())
  }

  async fn remove_supporter(
    &self,
    scope: &Scope,
    idea_id: Uuid,
    user_id: Uuid,
  ) -> Result<()> {
    let tenant = encode_uuid(scope.tenant_id);
    let idea_str = encode_uuid(idea_id);
    let user_str = encode_uuid(user_id);

    let removed = self
      .transact(move |conn| {
        found(idea_status(conn, &tenant, &idea_str)?, format!("idea {idea_id}"))?;
        let changed = conn.execute(
          "DELETE FROM supporters
           WHERE tenant_id = ?1 AND idea_id = ?2 AND user_id = ?3",
          params![tenant, idea_str, user_str],
        )?;
        Ok(changed > 0)
      })
      .await?;

    tracing::debug!(tenant = %scope.tenant_id, %idea_id, %user_id, removed, "remove supporter");
    Ok(())
  }

  async fn count_supporters(&self, scope: &Scope, idea_id: Uuid) -> Result<u64> {
    let tenant = encode_uuid(scope.tenant_id);
    let idea_str = encode_uuid(idea_id);

    self
      .read(move |conn| {
        let status =
          found(idea_status(conn, &tenant, &idea_str)?, format!("idea {idea_id}"))?;
        if status == IdeaStatus::Deleted {
          return found(None, format!("idea {idea_id}"));
        }
        let count: i64 = conn.query_row(
          "SELECT COUNT(*) FROM supporters WHERE tenant_id = ?1 AND idea_id = ?2",
          params![tenant, idea_str],
          |r| r.get(0),
        )?;
        Ok(count.max(0) as u64)
      })
      .await
  }

  async fn viewer_supports(
    &self,
    scope: &Scope,
    idea_id: Uuid,
    user_id: Uuid,
  ) -> Result<bool> {
    let tenant = encode_uuid(scope.tenant_id);
    let idea_str = encode_uuid(idea_id);
    let user_str = encode_uuid(user_id);

    self
      .read(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (
             SELECT 1 FROM supporters
             WHERE tenant_id = ?1 AND idea_id = ?2 AND user_id = ?3
           )",
          params![tenant, idea_str, user_str],
          |r| r.get(0),
        )?)
      })
      .await
  }

  async fn supported_by(&self, scope: &Scope, user_id: Uuid) -> Result<Vec<Uuid>> {
    let tenant = encode_uuid(scope.tenant_id);
    let user_str = encode_uuid(user_id);

    let ids: Vec<String> = self
      .read(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT s.idea_id
           FROM supporters s
           JOIN ideas i ON i.idea_id = s.idea_id
           WHERE s.tenant_id = ?1
             AND i.tenant_id = ?1
             AND s.user_id   = ?2
             AND i.status   != 'deleted'
           ORDER BY i.number",
        )?;
        let rows = stmt
          .query_map(params![tenant, user_str], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }
}
