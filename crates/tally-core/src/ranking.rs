//! Ordering of idea listings.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::idea::IdeaView;

/// How search results are ordered. Ties always fall back to the newest idea
/// (highest number) first.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortMode {
  /// Most recently created first.
  #[default]
  Recent,
  /// Supporters weighted down by age; see [`trending_score`].
  Trending,
  MostWanted,
  MostDiscussed,
}

/// Age decay exponent for [`trending_score`].
const GRAVITY: f64 = 1.4;

/// `supporters / (age_hours + 2) ^ GRAVITY`.
///
/// Ideas created "in the future" relative to `now` (clock skew) count as
/// brand new.
pub fn trending_score(
  supporters: u64,
  created_at: DateTime<Utc>,
  now: DateTime<Utc>,
) -> f64 {
  let age_hours = (now - created_at).num_seconds().max(0) as f64 / 3600.0;
  supporters as f64 / (age_hours + 2.0).powf(GRAVITY)
}

/// Sort `ideas` in place according to `mode`.
pub fn rank(ideas: &mut [IdeaView], mode: SortMode, now: DateTime<Utc>) {
  let by_number =
    |a: &IdeaView, b: &IdeaView| b.idea.number.cmp(&a.idea.number);

  match mode {
    SortMode::Recent => ideas.sort_by(by_number),
    SortMode::MostWanted => ideas.sort_by(|a, b| {
      b.total_supporters
        .cmp(&a.total_supporters)
        .then_with(|| by_number(a, b))
    }),
    SortMode::MostDiscussed => ideas.sort_by(|a, b| {
      b.total_comments
        .cmp(&a.total_comments)
        .then_with(|| by_number(a, b))
    }),
    SortMode::Trending => ideas.sort_by(|a, b| {
      let sa = trending_score(a.total_supporters, a.idea.created_at, now);
      let sb = trending_score(b.total_supporters, b.idea.created_at, now);
      sb.partial_cmp(&sa)
        .unwrap_or(Ordering::Equal)
        .then_with(|| by_number(a, b))
    }),
  }
}
