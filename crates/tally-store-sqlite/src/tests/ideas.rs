use chrono::SubsecRound as _;
use tally_core::{
  ErrorKind,
  idea::{IdeaInput, IdeaState, IdeaStatus},
  ranking::SortMode,
  scope::Scope,
  store::{
    CommentLog, IdeaLedger, IdeaQuery, ResponseLedger, SupporterLedger,
  },
};
use uuid::Uuid;

use super::{admin, assert_kind, new_idea, store, visitor};

// ─── Creation and lookup ─────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_by_every_key() {
  let s = store().await;
  let tenant = Uuid::new_v4();
  let author = visitor(tenant);

  let idea = s
    .create_idea(&author, IdeaInput::new("My new idea", "with this description"))
    .await
    .unwrap();
  assert_eq!(idea.number, 1);
  assert_eq!(idea.slug, "my-new-idea");
  assert_eq!(idea.state, IdeaState::Open);
  assert_eq!(idea.author_id, author.viewer_id().unwrap());

  let by_id = s.get_idea_by_id(&author, idea.idea_id).await.unwrap();
  assert_eq!(by_id.idea.title, "My new idea");
  assert_eq!(by_id.idea.description, "with this description");
  assert_eq!(by_id.idea.status(), IdeaStatus::Open);
  assert_eq!(by_id.idea.created_at, idea.created_at.trunc_subsecs(6));
  assert_eq!(by_id.total_supporters, 0);
  assert_eq!(by_id.total_comments, 0);
  assert!(!by_id.viewer_supports);
  assert!(by_id.tags.is_empty());

  let by_number = s.get_idea_by_number(&author, 1).await.unwrap();
  assert_eq!(by_number.idea.idea_id, idea.idea_id);

  let by_slug = s.get_idea_by_slug(&author, "my-new-idea").await.unwrap();
  assert_eq!(by_slug.idea.idea_id, idea.idea_id);
}

#[tokio::test]
async fn missing_idea_is_not_found() {
  let s = store().await;
  let scope = visitor(Uuid::new_v4());

  assert_kind(s.get_idea_by_id(&scope, Uuid::new_v4()).await, ErrorKind::NotFound);
  assert_kind(s.get_idea_by_number(&scope, 1).await, ErrorKind::NotFound);
  assert_kind(s.get_idea_by_slug(&scope, "nope").await, ErrorKind::NotFound);
}

#[tokio::test]
async fn create_requires_actor_and_title() {
  let s = store().await;
  let tenant = Uuid::new_v4();

  assert_kind(
    s.create_idea(&Scope::anonymous(tenant), IdeaInput::new("Idea", "")).await,
    ErrorKind::Validation,
  );
  assert_kind(
    s.create_idea(&visitor(tenant), IdeaInput::new("   ", "")).await,
    ErrorKind::Validation,
  );
  assert!(s.list_ideas(&visitor(tenant)).await.unwrap().is_empty());
}

#[tokio::test]
async fn numbers_are_sequential_and_never_reused() {
  let s = store().await;
  let tenant = Uuid::new_v4();
  let staff = admin(tenant);

  let first = new_idea(&s, &staff, "First").await;
  let second = new_idea(&s, &staff, "Second").await;
  assert_eq!((first.number, second.number), (1, 2));

  s.set_response(&staff, second.idea_id, "Spam".into(), IdeaStatus::Deleted)
    .await
    .unwrap();

  let third = new_idea(&s, &staff, "Third").await;
  assert_eq!(third.number, 3);
}

#[tokio::test]
async fn list_is_newest_first_and_hides_deleted() {
  let s = store().await;
  let tenant = Uuid::new_v4();
  let staff = admin(tenant);

  new_idea(&s, &staff, "One").await;
  let two = new_idea(&s, &staff, "Two").await;
  new_idea(&s, &staff, "Three").await;
  s.set_response(&staff, two.idea_id, String::new(), IdeaStatus::Deleted)
    .await
    .unwrap();

  let numbers: Vec<i64> = s
    .list_ideas(&visitor(tenant))
    .await
    .unwrap()
    .iter()
    .map(|v| v.idea.number)
    .collect();
  assert_eq!(numbers, vec![3, 1]);
}

// ─── Edits and slugs ─────────────────────────────────────────────────────────

#[tokio::test]
async fn update_regenerates_slug() {
  let s = store().await;
  let scope = visitor(Uuid::new_v4());
  let idea = new_idea(&s, &scope, "My new idea").await;

  let updated = s
    .update_idea(
      &scope,
      idea.idea_id,
      IdeaInput::new("The new comment", "With the new description"),
    )
    .await
    .unwrap();
  assert_eq!(updated.slug, "the-new-comment");

  let view = s.get_idea_by_slug(&scope, "the-new-comment").await.unwrap();
  assert_eq!(view.idea.title, "The new comment");
  assert_eq!(view.idea.description, "With the new description");
  assert_kind(s.get_idea_by_slug(&scope, "my-new-idea").await, ErrorKind::NotFound);
}

#[tokio::test]
async fn colliding_titles_get_distinct_slugs() {
  let s = store().await;
  let scope = visitor(Uuid::new_v4());

  let a = new_idea(&s, &scope, "Dark mode").await;
  let b = new_idea(&s, &scope, "Dark mode!").await;
  assert_eq!(a.slug, "dark-mode");
  assert_eq!(b.slug, "dark-mode-2");

  // Re-saving an idea under its own title keeps its slug.
  let again = s
    .update_idea(&scope, a.idea_id, IdeaInput::new("Dark mode", "again"))
    .await
    .unwrap();
  assert_eq!(again.slug, "dark-mode");

  let view = s.get_idea_by_slug(&scope, "dark-mode-2").await.unwrap();
  assert_eq!(view.idea.idea_id, b.idea_id);
}

#[tokio::test]
async fn untitled_slug_falls_back_to_number() {
  let s = store().await;
  let scope = visitor(Uuid::new_v4());
  let idea = new_idea(&s, &scope, "???").await;
  assert_eq!(idea.slug, "1");
}

#[tokio::test]
async fn update_of_deleted_idea_is_not_found() {
  let s = store().await;
  let staff = admin(Uuid::new_v4());
  let idea = new_idea(&s, &staff, "Gone soon").await;
  s.set_response(&staff, idea.idea_id, String::new(), IdeaStatus::Deleted)
    .await
    .unwrap();

  assert_kind(
    s.update_idea(&staff, idea.idea_id, IdeaInput::new("Back", "")).await,
    ErrorKind::NotFound,
  );
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_matches_title_and_description() {
  let s = store().await;
  let scope = visitor(Uuid::new_v4());
  s.create_idea(&scope, IdeaInput::new("Dark mode", "Easier on the eyes"))
    .await
    .unwrap();
  s.create_idea(&scope, IdeaInput::new("Export to CSV", "For 100% of reports"))
    .await
    .unwrap();

  let query = IdeaQuery { text: Some("EYES".into()), ..Default::default() };
  let hits = s.search(&scope, &query).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].idea.title, "Dark mode");

  let query = IdeaQuery { text: Some("100%".into()), ..Default::default() };
  let hits = s.search(&scope, &query).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].idea.title, "Export to CSV");

  let query = IdeaQuery { text: Some("  ".into()), ..Default::default() };
  assert_eq!(s.search(&scope, &query).await.unwrap().len(), 2);
}

#[tokio::test]
async fn search_sorts_and_limits() {
  let s = store().await;
  let tenant = Uuid::new_v4();
  let scope = visitor(tenant);

  let quiet = new_idea(&s, &scope, "Quiet").await;
  let wanted = new_idea(&s, &scope, "Wanted").await;
  let discussed = new_idea(&s, &scope, "Discussed").await;

  for _ in 0..3 {
    s.add_supporter(&scope, wanted.idea_id, Uuid::new_v4()).await.unwrap();
  }
  s.add_supporter(&scope, quiet.idea_id, Uuid::new_v4()).await.unwrap();
  s.add_comment(&scope, discussed.idea_id, "first").await.unwrap();
  s.add_comment(&scope, discussed.idea_id, "second").await.unwrap();

  let titles = |views: Vec<tally_core::idea::IdeaView>| {
    views.into_iter().map(|v| v.idea.title).collect::<Vec<_>>()
  };

  let query = IdeaQuery { sort: SortMode::MostWanted, ..Default::default() };
  assert_eq!(
    titles(s.search(&scope, &query).await.unwrap()),
    vec!["Wanted", "Quiet", "Discussed"]
  );

  let query = IdeaQuery { sort: SortMode::MostDiscussed, ..Default::default() };
  assert_eq!(
    titles(s.search(&scope, &query).await.unwrap()),
    vec!["Discussed", "Wanted", "Quiet"]
  );

  let query = IdeaQuery { sort: SortMode::Trending, limit: Some(2), ..Default::default() };
  assert_eq!(titles(s.search(&scope, &query).await.unwrap()), vec!["Wanted", "Quiet"]);
}

#[tokio::test]
async fn search_filters_by_status() {
  let s = store().await;
  let staff = admin(Uuid::new_v4());
  let open = new_idea(&s, &staff, "Open one").await;
  let started = new_idea(&s, &staff, "Started one").await;
  s.set_response(&staff, started.idea_id, "On it".into(), IdeaStatus::Started)
    .await
    .unwrap();

  let query = IdeaQuery {
    statuses: vec![IdeaStatus::Started],
    ..Default::default()
  };
  let hits = s.search(&staff, &query).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].idea.idea_id, started.idea_id);

  let query = IdeaQuery {
    statuses: vec![IdeaStatus::Open, IdeaStatus::Deleted],
    ..Default::default()
  };
  let hits = s.search(&staff, &query).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].idea.idea_id, open.idea_id);
}

// ─── Derived counters ────────────────────────────────────────────────────────

#[tokio::test]
async fn view_counts_comments_and_viewer_support() {
  let s = store().await;
  let tenant = Uuid::new_v4();
  let me = visitor(tenant);
  let idea = new_idea(&s, &me, "Counted").await;

  s.add_comment(&me, idea.idea_id, "Comment #1").await.unwrap();
  s.add_supporter(&me, idea.idea_id, me.viewer_id().unwrap())
    .await
    .unwrap();

  let view = s.get_idea_by_id(&me, idea.idea_id).await.unwrap();
  assert_eq!(view.total_comments, 1);
  assert_eq!(view.total_supporters, 1);
  assert!(view.viewer_supports);

  let someone_else = s.get_idea_by_id(&visitor(tenant), idea.idea_id).await.unwrap();
  assert!(!someone_else.viewer_supports);

  let anonymous = s
    .get_idea_by_id(&Scope::anonymous(tenant), idea.idea_id)
    .await
    .unwrap();
  assert!(!anonymous.viewer_supports);
  assert_eq!(anonymous.total_supporters, 1);
}
