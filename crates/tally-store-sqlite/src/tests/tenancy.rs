use tally_core::{
  ErrorKind,
  idea::{IdeaInput, IdeaStatus},
  store::{
    CommentLog, IdeaLedger, ResponseLedger, SupporterLedger, TagDirectory,
  },
  tag::TagInput,
};
use uuid::Uuid;

use super::{admin, assert_kind, new_idea, store, visitor};

#[tokio::test]
async fn tenants_are_isolated() {
  let s = store().await;
  let (t1, t2) = (Uuid::new_v4(), Uuid::new_v4());
  let staff1 = admin(t1);
  let staff2 = admin(t2);

  let mine = new_idea(&s, &staff1, "My new idea").await;
  let theirs = new_idea(&s, &staff2, "My new idea").await;

  // Numbers and slugs are allocated per tenant.
  assert_eq!((mine.number, theirs.number), (1, 1));
  assert_eq!(mine.slug, theirs.slug);

  let view = s.get_idea_by_number(&staff1, 1).await.unwrap();
  assert_eq!(view.idea.idea_id, mine.idea_id);
  let view = s.get_idea_by_slug(&staff2, "my-new-idea").await.unwrap();
  assert_eq!(view.idea.idea_id, theirs.idea_id);

  assert_kind(s.get_idea_by_id(&staff1, theirs.idea_id).await, ErrorKind::NotFound);
  assert_kind(s.get_idea_by_id(&staff2, mine.idea_id).await, ErrorKind::NotFound);
  assert_eq!(s.list_ideas(&staff1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn writes_cannot_cross_tenants() {
  let s = store().await;
  let (t1, t2) = (Uuid::new_v4(), Uuid::new_v4());
  let staff1 = admin(t1);
  let intruder = admin(t2);
  let idea = new_idea(&s, &staff1, "My new idea").await;
  let tag = s.add_tag(&staff1, TagInput::new("Bug", "FF0000", true)).await.unwrap();
  let comment = s.add_comment(&staff1, idea.idea_id, "Comment #1").await.unwrap();

  assert_kind(
    s.update_idea(&intruder, idea.idea_id, IdeaInput::new("Hijacked", "")).await,
    ErrorKind::NotFound,
  );
  assert_kind(
    s.set_response(&intruder, idea.idea_id, "x".into(), IdeaStatus::Deleted).await,
    ErrorKind::NotFound,
  );
  assert_kind(
    s.add_supporter(&intruder, idea.idea_id, Uuid::new_v4()).await,
    ErrorKind::NotFound,
  );
  assert_kind(s.add_comment(&intruder, idea.idea_id, "hi").await, ErrorKind::NotFound);
  assert_kind(
    s.update_comment(&intruder, comment, "edited").await,
    ErrorKind::NotFound,
  );
  assert_kind(s.get_tag_by_slug(&intruder, "bug").await, ErrorKind::NotFound);
  assert_kind(s.delete_tag(&intruder, tag.tag_id).await, ErrorKind::NotFound);
  assert_kind(
    s.assign_tag(&intruder, tag.tag_id, idea.idea_id).await,
    ErrorKind::NotFound,
  );

  // The same tag name is free in another tenant.
  s.add_tag(&intruder, TagInput::new("Bug", "00FF00", true)).await.unwrap();

  let view = s.get_idea_by_id(&visitor(t1), idea.idea_id).await.unwrap();
  assert_eq!(view.idea.title, "My new idea");
  assert_eq!(view.idea.status(), IdeaStatus::Open);
  assert_eq!(view.total_supporters, 0);
  assert_eq!(view.total_comments, 1);
  assert_eq!(s.get_comment_by_id(&staff1, comment).await.unwrap().content, "Comment #1");
}

#[tokio::test]
async fn end_to_end_lifecycle() {
  let s = store().await;
  let tenant = Uuid::new_v4();
  let staff = admin(tenant);
  let (alice, bob) = (visitor(tenant), visitor(tenant));

  let idea = new_idea(&s, &alice, "Dark mode").await;
  let dup = new_idea(&s, &bob, "Night theme").await;

  s.add_supporter(&alice, idea.idea_id, alice.viewer_id().unwrap()).await.unwrap();
  s.add_supporter(&bob, dup.idea_id, bob.viewer_id().unwrap()).await.unwrap();
  s.add_comment(&bob, idea.idea_id, "Yes please").await.unwrap();

  s.set_response(&staff, idea.idea_id, "Planned".into(), IdeaStatus::Started)
    .await
    .unwrap();
  s.mark_as_duplicate(&staff, dup.idea_id, idea.idea_id).await.unwrap();

  let view = s.get_idea_by_number(&bob, 1).await.unwrap();
  assert_eq!(view.idea.status(), IdeaStatus::Started);
  assert_eq!(view.total_supporters, 2);
  assert_eq!(view.total_comments, 1);
  assert!(view.viewer_supports);
  assert_eq!(
    s.supported_by(&bob, bob.viewer_id().unwrap()).await.unwrap(),
    vec![idea.idea_id, dup.idea_id]
  );

  s.set_response(&staff, idea.idea_id, "Shipped in 2.0".into(), IdeaStatus::Completed)
    .await
    .unwrap();
  s.add_supporter(&staff, idea.idea_id, Uuid::new_v4()).await.unwrap();
  assert_eq!(s.count_supporters(&staff, idea.idea_id).await.unwrap(), 2);
}
