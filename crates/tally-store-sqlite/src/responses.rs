//! [`ResponseLedger`] for [`SqliteStore`].
//!
//! The transition itself is decided by [`tally_core::lifecycle`]; this module
//! loads the current rows, applies the decision, and performs the supporter
//! side effects in the same transaction. An idea that a live duplicate still
//! points at cannot be deleted.

use chrono::Utc;
use rusqlite::{Connection, params};
use tally_core::{
  Error as CoreError,
  idea::{IdeaState, IdeaStatus},
  lifecycle,
  scope::Scope,
  store::ResponseLedger,
};
use uuid::Uuid;

use crate::{
  Result, SqliteStore,
  encode::{encode_state, encode_uuid},
  ideas::referenced_by_duplicate,
  store::load_idea,
};

/// Overwrite the status and response columns of one idea.
fn write_state(
  conn: &Connection,
  tenant: &str,
  idea_id: Uuid,
  state: &IdeaState,
) -> Result<()> {
  let cols = encode_state(state);
  conn.execute(
    "UPDATE ideas
     SET status        = ?1,
         response_text = ?2,
         responder_id  = ?3,
         responded_at  = ?4,
         original_id   = ?5
     WHERE idea_id = ?6 AND tenant_id = ?7",
    params![
      cols.status,
      cols.response_text,
      cols.responder_id,
      cols.responded_at,
      cols.original_id,
      encode_uuid(idea_id),
      tenant,
    ],
  )?;
  Ok(())
}

impl ResponseLedger for SqliteStore {
  async fn set_response(
    &self,
    scope: &Scope,
    idea_id: Uuid,
    text: String,
    status: IdeaStatus,
  ) -> Result<()> {
    let actor = scope.require_actor()?;
    let now = Utc::now();
    let tenant = encode_uuid(scope.tenant_id);

    let (number, from) = self
      .transact(move |conn| {
        let idea = load_idea(conn, &tenant, idea_id)?;
        let next =
          lifecycle::respond(&idea.state, status, text, actor.user_id, now)?;

        if next.status() == IdeaStatus::Deleted {
          let id_str = encode_uuid(idea_id);
          if referenced_by_duplicate(conn, &tenant, &id_str)? {
            return Err(
              CoreError::validation(format!(
                "idea #{} is the original of a duplicate and cannot be deleted",
                idea.number
              ))
              .into(),
            );
          }
          conn.execute(
            "DELETE FROM supporters WHERE tenant_id = ?1 AND idea_id = ?2",
            params![tenant, id_str],
          )?;
        }
        write_state(conn, &tenant, idea_id, &next)?;
        Ok((idea.number, idea.status()))
      })
      .await?;

    if status == IdeaStatus::Deleted {
      tracing::info!(tenant = %scope.tenant_id, number, by = %actor.user_id, "idea deleted");
    } else {
      tracing::info!(
        tenant = %scope.tenant_id,
        number,
        %from,
        to = %status,
        by = %actor.user_id,
        "response set"
      );
    }
    Ok(())
  }

  async fn mark_as_duplicate(
    &self,
    scope: &Scope,
    duplicate_id: Uuid,
    original_id: Uuid,
  ) -> Result<()> {
    let actor = scope.require_actor()?;
    let now = Utc::now();
    let tenant = encode_uuid(scope.tenant_id);

    let (duplicate, original, merged) = self
      .transact(move |conn| {
        let duplicate = load_idea(conn, &tenant, duplicate_id)?;
        let original = load_idea(conn, &tenant, original_id)?;
        let next =
          lifecycle::mark_duplicate(&duplicate, &original, actor.user_id, now)?;
        write_state(conn, &tenant, duplicate_id, &next)?;

        // Users already supporting the original hit the primary key and are
        // skipped, so the original ends up with the union of both sets.
        let merged = conn.execute(
          "INSERT OR IGNORE INTO supporters (idea_id, user_id, tenant_id, created_at)
           SELECT ?1, s.user_id, s.tenant_id, s.created_at
           FROM supporters s
           WHERE s.tenant_id = ?2 AND s.idea_id = ?3",
          params![encode_uuid(original_id), tenant, encode_uuid(duplicate_id)],
        )?;
        Ok((duplicate.number, original.number, merged))
      })
      .await?;

    tracing::info!(
      tenant = %scope.tenant_id,
      duplicate,
      original,
      merged,
      by = %actor.user_id,
      "idea marked as duplicate"
    );
    Ok(())
  }
}
