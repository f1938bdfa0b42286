//! Integration tests for `SqliteStore` against an in-memory database.

mod ideas;
mod tags;
mod tenancy;

use tally_core::{
  Classify, ErrorKind,
  idea::{Idea, IdeaInput},
  scope::{Actor, Role, Scope},
  store::IdeaLedger,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn scope_as(tenant_id: Uuid, role: Role) -> Scope {
  Scope::acting(tenant_id, Actor::new(Uuid::new_v4(), role))
}

fn admin(tenant_id: Uuid) -> Scope { scope_as(tenant_id, Role::Administrator) }

fn visitor(tenant_id: Uuid) -> Scope { scope_as(tenant_id, Role::Visitor) }

async fn new_idea(s: &SqliteStore, scope: &Scope, title: &str) -> Idea {
  s.create_idea(scope, IdeaInput::new(title, "Description"))
    .await
    .expect("create idea")
}

fn assert_kind<T: std::fmt::Debug>(result: crate::Result<T>, kind: ErrorKind) {
  match result {
    Err(e) => assert_eq!(e.kind(), kind, "unexpected error: {e}"),
    Ok(v) => panic!("expected {kind:?}, got Ok({v:?})"),
  }
}
