use tally_core::{
  ErrorKind,
  idea::IdeaStatus,
  scope::Scope,
  store::{IdeaLedger, IdeaQuery, ResponseLedger, TagDirectory},
  tag::TagInput,
};
use uuid::Uuid;

use super::{admin, assert_kind, new_idea, store, visitor};

fn feature_request() -> TagInput { TagInput::new("Feature Request", "FF0000", true) }

fn bug() -> TagInput { TagInput::new("Bug", "#0000ff", false) }

// ─── Definitions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_tag() {
  let s = store().await;
  let staff = admin(Uuid::new_v4());

  let tag = s.add_tag(&staff, feature_request()).await.unwrap();
  assert_eq!(tag.name, "Feature Request");
  assert_eq!(tag.slug, "feature-request");
  assert_eq!(tag.color, "FF0000");
  assert!(tag.is_public);

  let fetched = s.get_tag_by_slug(&staff, "feature-request").await.unwrap();
  assert_eq!(fetched.tag_id, tag.tag_id);
  assert_eq!(fetched.name, "Feature Request");
  assert_eq!(fetched.color, "FF0000");

  let private = s.add_tag(&staff, bug()).await.unwrap();
  assert_eq!(private.color, "0000FF");
  assert!(!private.is_public);
}

#[tokio::test]
async fn duplicate_tag_slug_is_rejected() {
  let s = store().await;
  let staff = admin(Uuid::new_v4());
  s.add_tag(&staff, feature_request()).await.unwrap();

  assert_kind(
    s.add_tag(&staff, TagInput::new("feature request!", "00FF00", true)).await,
    ErrorKind::Validation,
  );
  assert_kind(
    s.add_tag(&staff, TagInput::new("Bug", "nope", true)).await,
    ErrorKind::Validation,
  );
}

#[tokio::test]
async fn update_tag_regenerates_slug() {
  let s = store().await;
  let staff = admin(Uuid::new_v4());
  let tag = s.add_tag(&staff, feature_request()).await.unwrap();

  let updated = s
    .update_tag(&staff, tag.tag_id, TagInput::new("Bug", "000000", false))
    .await
    .unwrap();
  assert_eq!(updated.tag_id, tag.tag_id);
  assert_eq!(updated.name, "Bug");
  assert_eq!(updated.slug, "bug");
  assert_eq!(updated.color, "000000");
  assert!(!updated.is_public);

  assert_kind(
    s.get_tag_by_slug(&staff, "feature-request").await,
    ErrorKind::NotFound,
  );
  assert_kind(
    s.update_tag(&staff, Uuid::new_v4(), bug()).await,
    ErrorKind::NotFound,
  );
}

#[tokio::test]
async fn list_tags_hides_private_from_visitors() {
  let s = store().await;
  let tenant = Uuid::new_v4();
  let staff = admin(tenant);
  s.add_tag(&staff, feature_request()).await.unwrap();
  s.add_tag(&staff, bug()).await.unwrap();

  let all = s.list_tags(&staff).await.unwrap();
  let names: Vec<_> = all.iter().map(|t| t.name.as_str()).collect();
  assert_eq!(names, vec!["Feature Request", "Bug"]);

  let public = s.list_tags(&visitor(tenant)).await.unwrap();
  assert_eq!(public.len(), 1);
  assert_eq!(public[0].name, "Feature Request");

  let anonymous = s.list_tags(&Scope::anonymous(tenant)).await.unwrap();
  assert_eq!(anonymous.len(), 1);
}

#[tokio::test]
async fn delete_tag_removes_assignments() {
  let s = store().await;
  let staff = admin(Uuid::new_v4());
  let tag = s.add_tag(&staff, feature_request()).await.unwrap();
  let idea = new_idea(&s, &staff, "My new idea").await;
  s.assign_tag(&staff, tag.tag_id, idea.idea_id).await.unwrap();

  s.delete_tag(&staff, tag.tag_id).await.unwrap();

  assert_kind(
    s.get_tag_by_slug(&staff, "feature-request").await,
    ErrorKind::NotFound,
  );
  assert!(s.assigned_tags(&staff, idea.idea_id).await.unwrap().is_empty());
  assert_kind(s.delete_tag(&staff, tag.tag_id).await, ErrorKind::NotFound);
}

// ─── Assignment ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn assign_and_unassign_are_idempotent() {
  let s = store().await;
  let staff = admin(Uuid::new_v4());
  let bug = s.add_tag(&staff, bug()).await.unwrap();
  let feature = s.add_tag(&staff, feature_request()).await.unwrap();
  let idea = new_idea(&s, &staff, "My new idea").await;

  s.assign_tag(&staff, bug.tag_id, idea.idea_id).await.unwrap();
  s.assign_tag(&staff, bug.tag_id, idea.idea_id).await.unwrap();
  s.assign_tag(&staff, feature.tag_id, idea.idea_id).await.unwrap();

  let assigned = s.assigned_tags(&staff, idea.idea_id).await.unwrap();
  let slugs: Vec<_> = assigned.iter().map(|t| t.slug.as_str()).collect();
  assert_eq!(slugs, vec!["bug", "feature-request"]);

  s.unassign_tag(&staff, bug.tag_id, idea.idea_id).await.unwrap();
  s.unassign_tag(&staff, bug.tag_id, idea.idea_id).await.unwrap();

  let assigned = s.assigned_tags(&staff, idea.idea_id).await.unwrap();
  assert_eq!(assigned.len(), 1);
  assert_eq!(assigned[0].tag_id, feature.tag_id);
}

#[tokio::test]
async fn assign_requires_existing_tag_and_idea() {
  let s = store().await;
  let staff = admin(Uuid::new_v4());
  let tag = s.add_tag(&staff, bug()).await.unwrap();
  let idea = new_idea(&s, &staff, "My new idea").await;

  assert_kind(
    s.assign_tag(&staff, Uuid::new_v4(), idea.idea_id).await,
    ErrorKind::NotFound,
  );
  assert_kind(
    s.assign_tag(&staff, tag.tag_id, Uuid::new_v4()).await,
    ErrorKind::NotFound,
  );

  s.set_response(&staff, idea.idea_id, String::new(), IdeaStatus::Deleted)
    .await
    .unwrap();
  assert_kind(s.assign_tag(&staff, tag.tag_id, idea.idea_id).await, ErrorKind::NotFound);
  assert_kind(s.assigned_tags(&staff, idea.idea_id).await, ErrorKind::NotFound);
}

#[tokio::test]
async fn idea_view_shows_only_visible_tags() {
  let s = store().await;
  let tenant = Uuid::new_v4();
  let staff = admin(tenant);
  let bug = s.add_tag(&staff, bug()).await.unwrap();
  let feature = s.add_tag(&staff, feature_request()).await.unwrap();
  let idea = new_idea(&s, &staff, "My new idea").await;
  s.assign_tag(&staff, bug.tag_id, idea.idea_id).await.unwrap();
  s.assign_tag(&staff, feature.tag_id, idea.idea_id).await.unwrap();

  let as_staff = s.get_idea_by_id(&staff, idea.idea_id).await.unwrap();
  assert_eq!(as_staff.tags, vec!["bug", "feature-request"]);

  let as_visitor = s.get_idea_by_id(&visitor(tenant), idea.idea_id).await.unwrap();
  assert_eq!(as_visitor.tags, vec!["feature-request"]);

  let listed = s.list_ideas(&Scope::anonymous(tenant)).await.unwrap();
  assert_eq!(listed[0].tags, vec!["feature-request"]);

  // The unfiltered assignment list still reports both.
  assert_eq!(
    s.assigned_tags(&visitor(tenant), idea.idea_id).await.unwrap().len(),
    2
  );
}

#[tokio::test]
async fn search_by_tags_requires_every_tag() {
  let s = store().await;
  let tenant = Uuid::new_v4();
  let staff = admin(tenant);
  let bug = s.add_tag(&staff, bug()).await.unwrap();
  let feature = s.add_tag(&staff, feature_request()).await.unwrap();
  let both = new_idea(&s, &staff, "Both").await;
  let one = new_idea(&s, &staff, "One").await;
  new_idea(&s, &staff, "None").await;

  for tag in [bug.tag_id, feature.tag_id] {
    s.assign_tag(&staff, tag, both.idea_id).await.unwrap();
  }
  s.assign_tag(&staff, feature.tag_id, one.idea_id).await.unwrap();

  let query = IdeaQuery { tags: vec!["feature-request".into()], ..Default::default() };
  let hits = s.search(&staff, &query).await.unwrap();
  let titles: Vec<_> = hits.iter().map(|v| v.idea.title.as_str()).collect();
  assert_eq!(titles, vec!["One", "Both"]);

  let query = IdeaQuery {
    tags: vec!["feature-request".into(), "bug".into()],
    ..Default::default()
  };
  let hits = s.search(&staff, &query).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].idea.idea_id, both.idea_id);

  // A private tag filters nothing in for a visitor.
  let query = IdeaQuery { tags: vec!["bug".into()], ..Default::default() };
  assert!(s.search(&visitor(tenant), &query).await.unwrap().is_empty());
}
