//! Integration tests for `SqliteLedger` against an in-memory database.

use tally_core::{
  membership::ToggleState,
  metric::MembershipMetric,
  store::LedgerStore,
  subject::NewSubject,
};

use crate::SqliteLedger;

async fn ledger() -> SqliteLedger {
  SqliteLedger::open_in_memory()
    .await
    .expect("in-memory ledger")
}

fn post(title: &str) -> NewSubject {
  NewSubject {
    title: title.to_string(),
    body:  "body".to_string(),
  }
}

// ─── Subjects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_subject() {
  let l = ledger().await;

  let subject = l.create_subject(post("hello")).await.unwrap();
  assert_eq!(subject.counts.view_count, 0);
  assert_eq!(subject.counts.like_count, 0);
  assert_eq!(subject.counts.scrap_count, 0);

  let fetched = l.get_subject(subject.subject_id).await.unwrap().unwrap();
  assert_eq!(fetched.subject_id, subject.subject_id);
  assert_eq!(fetched.title, "hello");
}

#[tokio::test]
async fn get_subject_missing_returns_none() {
  let l = ledger().await;
  assert!(l.get_subject(404).await.unwrap().is_none());
}

#[tokio::test]
async fn update_content_touches_updated_at() {
  let l = ledger().await;
  let subject = l.create_subject(post("before")).await.unwrap();

  let updated = l
    .update_content(subject.subject_id, post("after"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.title, "after");
  assert!(updated.updated_at >= subject.updated_at);
}

#[tokio::test]
async fn update_content_missing_returns_none() {
  let l = ledger().await;
  assert!(l.update_content(404, post("x")).await.unwrap().is_none());
}

// ─── Toggles ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_toggle_activates_and_increments() {
  let l = ledger().await;
  let s = l.create_subject(post("p")).await.unwrap();

  let outcome = l
    .toggle(MembershipMetric::Likes, 7, s.subject_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(outcome.state, ToggleState::Activated);
  assert_eq!(outcome.count, 1);
  assert!(l.membership(MembershipMetric::Likes, 7, s.subject_id).await.unwrap());
}

#[tokio::test]
async fn second_toggle_deactivates_and_decrements() {
  let l = ledger().await;
  let s = l.create_subject(post("p")).await.unwrap();

  l.toggle(MembershipMetric::Likes, 7, s.subject_id).await.unwrap();
  let outcome = l
    .toggle(MembershipMetric::Likes, 7, s.subject_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(outcome.state, ToggleState::Deactivated);
  assert_eq!(outcome.count, 0);
  assert!(!l.membership(MembershipMetric::Likes, 7, s.subject_id).await.unwrap());
}

#[tokio::test]
async fn toggle_missing_subject_returns_none() {
  let l = ledger().await;
  assert!(
    l.toggle(MembershipMetric::Likes, 7, 404)
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn likes_and_scraps_are_independent() {
  let l = ledger().await;
  let s = l.create_subject(post("p")).await.unwrap();

  l.toggle(MembershipMetric::Likes, 7, s.subject_id).await.unwrap();
  l.toggle(MembershipMetric::Scraps, 7, s.subject_id).await.unwrap();

  let counts = l.counts(s.subject_id).await.unwrap().unwrap();
  assert_eq!(counts.like_count, 1);
  assert_eq!(counts.scrap_count, 1);

  l.toggle(MembershipMetric::Likes, 7, s.subject_id).await.unwrap();
  let counts = l.counts(s.subject_id).await.unwrap().unwrap();
  assert_eq!(counts.like_count, 0);
  assert_eq!(counts.scrap_count, 1, "scrap untouched by like toggle");
}

#[tokio::test]
async fn different_actors_count_separately() {
  let l = ledger().await;
  let s = l.create_subject(post("p")).await.unwrap();

  for actor in 1..=4 {
    let outcome = l
      .toggle(MembershipMetric::Scraps, actor, s.subject_id)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(outcome.state, ToggleState::Activated);
  }
  let counts = l.counts(s.subject_id).await.unwrap().unwrap();
  assert_eq!(counts.scrap_count, 4);
}

#[tokio::test]
async fn toggle_history_is_retained_as_soft_deleted_rows() {
  let l = ledger().await;
  let s = l.create_subject(post("p")).await.unwrap();

  // Three full on/off cycles plus a final on.
  for _ in 0..7 {
    l.toggle(MembershipMetric::Likes, 7, s.subject_id).await.unwrap();
  }

  // Odd number of transitions: active, count 1.
  assert!(l.membership(MembershipMetric::Likes, 7, s.subject_id).await.unwrap());
  let counts = l.counts(s.subject_id).await.unwrap().unwrap();
  assert_eq!(counts.like_count, 1);
}

#[tokio::test]
async fn counter_never_goes_negative() {
  let l = ledger().await;
  let s = l.create_subject(post("p")).await.unwrap();

  // Deactivate with no prior activation: state machine treats the pair
  // as inactive, so this activates rather than decrementing below zero.
  let outcome = l
    .toggle(MembershipMetric::Likes, 7, s.subject_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(outcome.state, ToggleState::Activated);

  let counts = l.counts(s.subject_id).await.unwrap().unwrap();
  assert_eq!(counts.like_count, 1);
}

// ─── View deltas ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn apply_view_delta_accumulates() {
  let l = ledger().await;
  let s = l.create_subject(post("p")).await.unwrap();

  assert_eq!(l.apply_view_delta(s.subject_id, 10).await.unwrap(), Some(10));
  assert_eq!(l.apply_view_delta(s.subject_id, 5).await.unwrap(), Some(15));

  let counts = l.counts(s.subject_id).await.unwrap().unwrap();
  assert_eq!(counts.view_count, 15);
}

#[tokio::test]
async fn apply_view_delta_missing_subject_returns_none() {
  let l = ledger().await;
  assert!(l.apply_view_delta(404, 3).await.unwrap().is_none());
}

#[tokio::test]
async fn apply_view_delta_does_not_touch_updated_at() {
  let l = ledger().await;
  let s = l.create_subject(post("p")).await.unwrap();

  l.apply_view_delta(s.subject_id, 100).await.unwrap();
  let after = l.get_subject(s.subject_id).await.unwrap().unwrap();
  assert_eq!(after.updated_at, s.updated_at, "flush must not look like an edit");
}

#[tokio::test]
async fn toggle_does_not_touch_updated_at() {
  let l = ledger().await;
  let s = l.create_subject(post("p")).await.unwrap();

  l.toggle(MembershipMetric::Likes, 7, s.subject_id).await.unwrap();
  let after = l.get_subject(s.subject_id).await.unwrap().unwrap();
  assert_eq!(after.updated_at, s.updated_at);
}

#[tokio::test]
async fn counts_missing_subject_returns_none() {
  let l = ledger().await;
  assert!(l.counts(404).await.unwrap().is_none());
}
