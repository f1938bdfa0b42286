//! [`IdeaLedger`] for [`SqliteStore`]: creation, lookups, listing and edits.

use chrono::Utc;
use rusqlite::{Connection, params};
use tally_core::{
  idea::{Idea, IdeaInput, IdeaState, IdeaView},
  ranking::rank,
  scope::Scope,
  slug::slugify,
  store::{IdeaLedger, IdeaQuery},
};
use uuid::Uuid;

use crate::{
  Result, SqliteStore,
  encode::{RawIdeaView, encode_dt, encode_uuid},
  store::{BoundScope, IdeaKey, load_idea, select_views},
};

/// Pick a slug for idea `number` that no other visible idea in the tenant
/// holds, starting from `base` and appending the number on collision.
fn unique_slug(
  conn: &Connection,
  tenant: &str,
  base: &str,
  number: i64,
  exclude: Option<&str>,
) -> Result<String> {
  let mut stmt = conn.prepare(
    "SELECT EXISTS (
       SELECT 1 FROM ideas
       WHERE tenant_id = ?1
         AND slug      = ?2
         AND status   != 'deleted'
         AND (?3 IS NULL OR idea_id != ?3)
     )",
  )?;

  let base = if base.is_empty() { number.to_string() } else { base.to_owned() };
  let mut candidate = base.clone();
  let mut attempt = 1;
  loop {
    let taken: bool =
      stmt.query_row(params![tenant, candidate, exclude], |r| r.get(0))?;
    if !taken {
      return Ok(candidate);
    }
    candidate = if attempt == 1 {
      format!("{base}-{number}")
    } else {
      format!("{base}-{number}-{attempt}")
    };
    attempt += 1;
  }
}

impl SqliteStore {
  /// Fetch a single view by key, newest first if a slug is shared.
  async fn get_view(&self, scope: &Scope, key: IdeaKey) -> Result<IdeaView> {
    let bound = BoundScope::from(scope);
    let raw: Option<RawIdeaView> = self
      .read(move |conn| Ok(select_views(conn, &bound, &key)?.into_iter().next()))
      .await?;
    crate::store::found(raw, "idea")?.into_view()
  }

  async fn matching_views(
    &self,
    scope: &Scope,
    text: Option<String>,
  ) -> Result<Vec<IdeaView>> {
    let bound = BoundScope::from(scope);
    let raws = self
      .read(move |conn| select_views(conn, &bound, &IdeaKey::Matching(text)))
      .await?;
    raws.into_iter().map(RawIdeaView::into_view).collect()
  }
}

impl IdeaLedger for SqliteStore {
  async fn create_idea(&self, scope: &Scope, input: IdeaInput) -> Result<Idea> {
    let author = scope.require_actor()?;
    let input = input.validate()?;

    let idea_id = Uuid::new_v4();
    let created_at = Utc::now();

    let tenant = encode_uuid(scope.tenant_id);
    let id_str = encode_uuid(idea_id);
    let author_str = encode_uuid(author.user_id);
    let at_str = encode_dt(created_at);
    let base_slug = slugify(&input.title);
    let title = input.title.clone();
    let description = input.description.clone();

    // Number allocation and insert share one IMMEDIATE transaction, so two
    // creations in the same tenant can never read the same MAX(number).
    let (number, slug) = self
      .transact(move |conn| {
        let number: i64 = conn.query_row(
          "SELECT COALESCE(MAX(number), 0) + 1 FROM ideas WHERE tenant_id = ?1",
          params![tenant],
          |r| r.get(0),
        )?;
        let slug = unique_slug(conn, &tenant, &base_slug, number, None)?;

        conn.execute(
          "INSERT INTO ideas (
             idea_id, tenant_id, number, slug, title, description,
             author_id, created_at, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'open')",
          params![
            id_str,
            tenant,
            number,
            slug,
            title,
            description,
            author_str,
            at_str,
          ],
        )?;
        Ok((number, slug))
      })
      .await?;

    tracing::debug!(tenant = %scope.tenant_id, number, %slug, "idea created");

    Ok(Idea {
      idea_id,
      tenant_id: scope.tenant_id,
      number,
      slug,
      title: input.title,
      description: input.description,
      author_id: author.user_id,
      created_at,
      state: IdeaState::Open,
    })
  }

  async fn get_idea_by_id(&self, scope: &Scope, idea_id: Uuid) -> Result<IdeaView> {
    self.get_view(scope, IdeaKey::Id(idea_id)).await
  }

  async fn get_idea_by_number(&self, scope: &Scope, number: i64) -> Result<IdeaView> {
    self.get_view(scope, IdeaKey::Number(number)).await
  }

  async fn get_idea_by_slug(&self, scope: &Scope, slug: &str) -> Result<IdeaView> {
    self.get_view(scope, IdeaKey::Slug(slug.to_owned())).await
  }

  async fn list_ideas(&self, scope: &Scope) -> Result<Vec<IdeaView>> {
    self.matching_views(scope, None).await
  }

  async fn search(&self, scope: &Scope, query: &IdeaQuery) -> Result<Vec<IdeaView>> {
    let text = query
      .text
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(str::to_owned);

    let mut ideas = self.matching_views(scope, text).await?;

    if !query.statuses.is_empty() {
      ideas.retain(|v| query.statuses.contains(&v.idea.status()));
    }
    // View tags are already limited to what the viewer may see, so filtering
    // on a hidden tag matches nothing.
    if !query.tags.is_empty() {
      ideas.retain(|v| query.tags.iter().all(|t| v.tags.contains(t)));
    }

    rank(&mut ideas, query.sort, Utc::now());

    if let Some(limit) = query.limit {
      ideas.truncate(limit);
    }
    Ok(ideas)
  }

  async fn update_idea(
    &self,
    scope: &Scope,
    idea_id: Uuid,
    input: IdeaInput,
  ) -> Result<Idea> {
    let input = input.validate()?;
    let tenant = encode_uuid(scope.tenant_id);
    let base_slug = slugify(&input.title);

    let idea = self
      .transact(move |conn| {
        let mut idea = load_idea(conn, &tenant, idea_id)?;
        let id_str = encode_uuid(idea_id);
        let slug =
          unique_slug(conn, &tenant, &base_slug, idea.number, Some(&id_str))?;

        conn.execute(
          "UPDATE ideas SET title = ?1, description = ?2, slug = ?3
           WHERE idea_id = ?4 AND tenant_id = ?5",
          params![input.title, input.description, slug, id_str, tenant],
        )?;

        idea.title = input.title;
        idea.description = input.description;
        idea.slug = slug;
        Ok(idea)
      })
      .await?;

    tracing::debug!(
      tenant = %scope.tenant_id,
      number = idea.number,
      slug = %idea.slug,
      "idea updated"
    );
    Ok(idea)
  }

  async fn is_referenced(&self, scope: &Scope, idea_id: Uuid) -> Result<bool> {
    let tenant = encode_uuid(scope.tenant_id);
    let id_str = encode_uuid(idea_id);

    self
      .read(move |conn| referenced_by_duplicate(conn, &tenant, &id_str))
      .await
  }
}

/// Whether another live idea points at `idea_id` as its duplicate original.
pub(crate) fn referenced_by_duplicate(
  conn: &Connection,
  tenant: &str,
  idea_id: &str,
) -> Result<bool> {
  Ok(conn.query_row(
    "SELECT EXISTS (
       SELECT 1 FROM ideas
       WHERE tenant_id   = ?1
         AND original_id = ?2
         AND idea_id    != ?2
         AND status     != 'deleted'
     )",
    params![tenant, idea_id],
    |r| r.get(0),
  )?)
}
