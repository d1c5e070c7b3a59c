//! Integration tests for `SqliteStore` and the `Scheduler` running on it,
//! against an in-memory database.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use opsdesk_core::{
  Error, Scheduler, SchedulerConfig,
  availability::{TimeWindow, WindowSemantics},
  event::{CalendarEvent, EventCategory, EventPatch, NewEvent, Priority},
  identity::{Identity, NewIdentity, Role},
  shift::{NewShift, OnCallShift, ShiftCategory, ShiftPatch},
  store::{EventFilter, ScheduleStore, ShiftFilter},
};
use serde_json::json;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn scheduler() -> Scheduler<SqliteStore> {
  Scheduler::new(Arc::new(store().await), SchedulerConfig::default())
}

/// 2026-04-06 (a Monday) at `hour`:00 UTC.
fn at(hour: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 4, 6, hour, 0, 0).unwrap()
}

async fn person(s: &Scheduler<SqliteStore>, name: &str) -> Identity {
  s.create_identity(NewIdentity {
    name:  name.into(),
    email: format!("{}@ops.example", name.to_lowercase()),
    role:  Role::Member,
  })
  .await
  .unwrap()
}

async fn event(
  s: &Scheduler<SqliteStore>,
  title: &str,
  owner: &Identity,
  participants: &[&Identity],
  start: DateTime<Utc>,
  end: DateTime<Utc>,
) -> Result<CalendarEvent, Error> {
  let mut input = NewEvent::new(title, EventCategory::Maintenance, owner.identity_id, start, end);
  input.participant_ids = participants.iter().map(|p| p.identity_id).collect();
  s.create_event(input).await
}

async fn shift(
  s: &Scheduler<SqliteStore>,
  assignee: &Identity,
  backup: Option<&Identity>,
  start: DateTime<Utc>,
  end: DateTime<Utc>,
) -> Result<OnCallShift, Error> {
  let mut input = NewShift::new(ShiftCategory::Day, assignee.identity_id, start, end);
  input.backup_id = backup.map(|b| b.identity_id);
  s.create_shift(input).await
}

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn identity_round_trip_and_role_change() {
  let s = scheduler().await;
  let dana = person(&s, "Dana").await;

  let fetched = s.get_identity(dana.identity_id).await.unwrap();
  assert_eq!(fetched, dana);

  let promoted = s.set_role(dana.identity_id, Role::Manager).await.unwrap();
  assert_eq!(promoted.role, Role::Manager);
  assert_eq!(s.get_identity(dana.identity_id).await.unwrap().role, Role::Manager);
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() {
  let s = scheduler().await;
  person(&s, "Dana").await;

  let err = s
    .create_identity(NewIdentity {
      name:  "Other Dana".into(),
      email: "DANA@ops.example".into(),
      role:  Role::Member,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)), "{err}");
}

#[tokio::test]
async fn identities_list_newest_first() {
  let s = scheduler().await;
  let a = person(&s, "Ann").await;
  let b = person(&s, "Bo").await;

  let all = s.list_identities().await.unwrap();
  let ids: Vec<Uuid> = all.iter().map(|i| i.identity_id).collect();
  assert_eq!(ids, vec![b.identity_id, a.identity_id]);
}

#[tokio::test]
async fn set_role_on_missing_identity_is_not_found() {
  let s = scheduler().await;
  let err = s.set_role(Uuid::new_v4(), Role::Manager).await.unwrap_err();
  assert!(matches!(err, Error::IdentityNotFound(_)));
}

// ─── Event conflicts ─────────────────────────────────────────────────────────

#[tokio::test]
async fn owner_busy_as_participant_blocks_new_event() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;

  event(&s, "Patch window", &bob, &[&alice], at(9), at(11)).await.unwrap();

  let err = event(&s, "Vendor call", &alice, &[], at(10), at(12))
    .await
    .unwrap_err();
  match err {
    Error::EventConflict { titles, .. } => assert_eq!(titles, vec!["Patch window".to_string()]),
    other => panic!("expected event conflict, got {other:?}"),
  }
}

#[tokio::test]
async fn back_to_back_events_do_not_conflict() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;

  event(&s, "First", &alice, &[], at(9), at(10)).await.unwrap();
  event(&s, "Second", &alice, &[], at(10), at(11)).await.unwrap();
  event(&s, "Earlier", &alice, &[], at(8), at(9)).await.unwrap();
}

#[tokio::test]
async fn conflict_reports_every_clashing_title() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;

  event(&s, "Morning sync", &alice, &[], at(9), at(10)).await.unwrap();
  event(&s, "DB upgrade", &bob, &[], at(10), at(12)).await.unwrap();

  let err = event(&s, "All hands", &alice, &[&bob], at(9), at(11))
    .await
    .unwrap_err();
  assert_eq!(err.to_string(), "conflicting events: Morning sync, DB upgrade");
  match err {
    Error::EventConflict { titles, event_ids } => {
      assert_eq!(titles.len(), 2);
      assert_eq!(event_ids.len(), 2);
    }
    other => panic!("expected event conflict, got {other:?}"),
  }
}

#[tokio::test]
async fn rejected_event_is_not_persisted() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;

  event(&s, "Kept", &alice, &[], at(9), at(10)).await.unwrap();
  event(&s, "Dropped", &alice, &[], at(9), at(10)).await.unwrap_err();

  let all = s.list_events(EventFilter::default()).await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].title, "Kept");
}

#[tokio::test]
async fn title_only_update_skips_conflict_check() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let ev = event(&s, "Rollout", &alice, &[], at(9), at(10)).await.unwrap();

  let patch = EventPatch { title: Some("Rollout v2".into()), ..Default::default() };
  let updated = s.update_event(ev.event_id, patch).await.unwrap();
  assert_eq!(updated.title, "Rollout v2");
  assert_eq!(updated.start_at, ev.start_at);
  assert_eq!(updated.created_at, ev.created_at);
}

#[tokio::test]
async fn rescheduling_does_not_conflict_with_itself() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let ev = event(&s, "Rollout", &alice, &[], at(9), at(11)).await.unwrap();

  let patch = EventPatch { end_at: Some(at(12)), ..Default::default() };
  let updated = s.update_event(ev.event_id, patch).await.unwrap();
  assert_eq!(updated.end_at, at(12));
}

#[tokio::test]
async fn rescheduling_into_another_event_conflicts() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let ev = event(&s, "Rollout", &alice, &[], at(9), at(10)).await.unwrap();
  event(&s, "Review", &alice, &[], at(13), at(14)).await.unwrap();

  let patch = EventPatch {
    start_at: Some(at(13)),
    end_at: Some(at(15)),
    ..Default::default()
  };
  let err = s.update_event(ev.event_id, patch).await.unwrap_err();
  assert!(matches!(err, Error::EventConflict { .. }));

  let unchanged = s.get_event(ev.event_id).await.unwrap();
  assert_eq!(unchanged.start_at, at(9));
}

#[tokio::test]
async fn update_merges_range_before_validating() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let ev = event(&s, "Rollout", &alice, &[], at(9), at(10)).await.unwrap();

  let patch = EventPatch { start_at: Some(at(11)), ..Default::default() };
  let err = s.update_event(ev.event_id, patch).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn participant_update_replaces_the_set() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;
  let cara = person(&s, "Cara").await;
  let ev = event(&s, "Review", &alice, &[&bob], at(9), at(10)).await.unwrap();

  let patch = EventPatch {
    participant_ids: Some(vec![cara.identity_id]),
    ..Default::default()
  };
  s.update_event(ev.event_id, patch).await.unwrap();

  let fetched = s.get_event(ev.event_id).await.unwrap();
  assert_eq!(fetched.participant_ids, vec![cara.identity_id]);

  // Bob is free again.
  event(&s, "Bob's slot", &bob, &[], at(9), at(10)).await.unwrap();
}

#[tokio::test]
async fn unknown_participant_is_a_validation_error() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;

  let mut input = NewEvent::new("Ghost", EventCategory::Meeting, alice.identity_id, at(9), at(10));
  input.participant_ids = vec![Uuid::new_v4()];
  let err = s.create_event(input).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn deleted_event_frees_the_slot() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let ev = event(&s, "Rollout", &alice, &[], at(9), at(10)).await.unwrap();

  s.delete_event(ev.event_id).await.unwrap();
  assert!(matches!(s.get_event(ev.event_id).await, Err(Error::EventNotFound(_))));
  assert!(matches!(s.delete_event(ev.event_id).await, Err(Error::EventNotFound(_))));

  event(&s, "Replacement", &alice, &[], at(9), at(10)).await.unwrap();
}

// ─── Event listings ──────────────────────────────────────────────────────────

#[tokio::test]
async fn end_bound_alone_admits_everything_starting_before_it() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let yesterday = at(9) - Duration::days(1);

  event(&s, "Old", &alice, &[], yesterday, yesterday + Duration::hours(1)).await.unwrap();
  event(&s, "Noon", &alice, &[], at(12), at(13)).await.unwrap();
  event(&s, "Late", &alice, &[], at(14), at(15)).await.unwrap();

  let filter = EventFilter { window: s.window(None, Some(at(12))), ..Default::default() };
  let titles: Vec<String> = s
    .list_events(filter)
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.title)
    .collect();
  assert_eq!(titles, vec!["Old".to_string(), "Noon".to_string()]);
}

#[tokio::test]
async fn both_bounds_intersect_by_default_and_union_when_configured() {
  let store = Arc::new(store().await);
  let intersect = Scheduler::new(Arc::clone(&store), SchedulerConfig::default());
  let union = Scheduler::new(store, SchedulerConfig {
    range_semantics: WindowSemantics::Union,
    ..Default::default()
  });

  let alice = person(&intersect, "Alice").await;
  event(&intersect, "Before", &alice, &[], at(1), at(2)).await.unwrap();
  event(&intersect, "Inside", &alice, &[], at(10), at(11)).await.unwrap();
  event(&intersect, "After", &alice, &[], at(20), at(21)).await.unwrap();

  let narrowed = intersect
    .list_events(EventFilter { window: intersect.window(Some(at(9)), Some(at(12))), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(narrowed.len(), 1);
  assert_eq!(narrowed[0].title, "Inside");

  let widened = union
    .list_events(EventFilter { window: union.window(Some(at(9)), Some(at(12))), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(widened.len(), 3);
}

#[tokio::test]
async fn listing_filters_by_category_priority_and_involvement() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;

  let mut change = NewEvent::new("Change", EventCategory::Change, alice.identity_id, at(9), at(10));
  change.priority = Priority::High;
  s.create_event(change).await.unwrap();
  event(&s, "Maint", &bob, &[&alice], at(11), at(12)).await.unwrap();
  event(&s, "Solo", &bob, &[], at(13), at(14)).await.unwrap();

  let changes = s
    .list_events(EventFilter { category: Some(EventCategory::Change), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(changes.len(), 1);

  let high = s
    .list_events(EventFilter { priority: Some(Priority::High), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(high[0].title, "Change");

  let alices = s
    .list_events(EventFilter { involving: Some(alice.identity_id), ..Default::default() })
    .await
    .unwrap();
  let titles: Vec<&str> = alices.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(titles, vec!["Change", "Maint"]);

  let owned = s
    .list_events(EventFilter { owner_id: Some(bob.identity_id), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(owned.len(), 2);
}

// ─── Shifts ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn backup_on_one_shift_cannot_be_assignee_on_an_overlapping_one() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;
  let cara = person(&s, "Cara").await;
  let dev = person(&s, "Dev").await;

  shift(&s, &alice, Some(&bob), at(0), at(12)).await.unwrap();

  let err = shift(&s, &bob, None, at(6), at(18)).await.unwrap_err();
  match err {
    Error::ShiftConflict { identity_id, shift_ids } => {
      assert_eq!(identity_id, bob.identity_id);
      assert_eq!(shift_ids.len(), 1);
    }
    other => panic!("expected shift conflict, got {other:?}"),
  }

  // Backup clash is caught too.
  let err = shift(&s, &cara, Some(&alice), at(6), at(18)).await.unwrap_err();
  assert!(matches!(err, Error::ShiftConflict { identity_id, .. } if identity_id == alice.identity_id));

  shift(&s, &cara, Some(&dev), at(6), at(18)).await.unwrap();
}

#[tokio::test]
async fn consecutive_shifts_are_allowed() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  shift(&s, &alice, None, at(0), at(12)).await.unwrap();
  shift(&s, &alice, None, at(12), at(23)).await.unwrap();
}

#[tokio::test]
async fn shift_update_excludes_itself_and_can_clear_backup() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;
  let sh = shift(&s, &alice, Some(&bob), at(0), at(12)).await.unwrap();

  let patch = ShiftPatch {
    end_at: Some(at(14)),
    backup_id: Some(None),
    ..Default::default()
  };
  let updated = s.update_shift(sh.shift_id, patch).await.unwrap();
  assert_eq!(updated.end_at, at(14));
  assert!(updated.backup_id.is_none());

  // Bob is no longer tied up.
  shift(&s, &bob, None, at(6), at(10)).await.unwrap();
}

#[tokio::test]
async fn handover_checklist_round_trips_verbatim() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;

  let mut input = NewShift::new(ShiftCategory::Night, alice.identity_id, at(20), at(23));
  input.notes = Some("watch the queue depth".into());
  input.handover_checklist.insert("pager_tested".into(), json!(true));
  input.handover_checklist.insert("open_incidents".into(), json!(["INC-12", { "sev": 2 }]));
  let created = s.create_shift(input).await.unwrap();

  let fetched = s.get_shift(created.shift_id).await.unwrap();
  assert_eq!(fetched, created);
  assert_eq!(fetched.handover_checklist["open_incidents"][1]["sev"], json!(2));
}

#[tokio::test]
async fn current_shift_is_inclusive_at_both_ends() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let sh = shift(&s, &alice, None, at(8), at(16)).await.unwrap();

  for now in [at(8), at(12), at(16)] {
    let current = s.current_shift(now).await.unwrap();
    assert_eq!(current.map(|c| c.shift_id), Some(sh.shift_id));
  }
  assert!(s.current_shift(at(17)).await.unwrap().is_none());
}

#[tokio::test]
async fn current_shift_prefers_earliest_start_when_several_are_active() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;
  let later = shift(&s, &alice, None, at(8), at(16)).await.unwrap();

  // Bypasses the overlap policy, as a concurrent write race could.
  let earlier = s
    .store()
    .insert_shift(OnCallShift {
      shift_id: Uuid::new_v4(),
      assignee_id: bob.identity_id,
      start_at: at(6),
      end_at: at(12),
      ..later.clone()
    })
    .await
    .unwrap();

  let current = s.current_shift(at(10)).await.unwrap();
  assert_eq!(current.map(|c| c.shift_id), Some(earlier.shift_id));

  let current = s.current_shift(at(14)).await.unwrap();
  assert_eq!(current.map(|c| c.shift_id), Some(later.shift_id));
}

#[tokio::test]
async fn deleted_shift_disappears_from_range_and_current_queries() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let sh = shift(&s, &alice, None, at(8), at(16)).await.unwrap();

  s.delete_shift(sh.shift_id).await.unwrap();

  assert!(s.current_shift(at(12)).await.unwrap().is_none());
  let listed = s
    .list_shifts(ShiftFilter { window: s.window(Some(at(0)), Some(at(23))), ..Default::default() })
    .await
    .unwrap();
  assert!(listed.is_empty());
  assert!(matches!(s.delete_shift(sh.shift_id).await, Err(Error::ShiftNotFound(_))));
}

#[tokio::test]
async fn shift_listing_for_an_identity_includes_backup_duty() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;
  shift(&s, &alice, None, at(0), at(6)).await.unwrap();
  shift(&s, &bob, Some(&alice), at(6), at(12)).await.unwrap();
  shift(&s, &bob, None, at(12), at(18)).await.unwrap();

  let alices = s
    .list_shifts(ShiftFilter { involving: Some(alice.identity_id), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(alices.len(), 2);
  assert!(alices[0].start_at < alices[1].start_at);
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_count_assignees_in_window_most_loaded_first() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;
  let now = at(0);
  let day = |n: i64| now - Duration::days(n);

  shift(&s, &alice, Some(&bob), day(1), day(1) + Duration::hours(8)).await.unwrap();
  shift(&s, &alice, None, day(2), day(2) + Duration::hours(8)).await.unwrap();
  shift(&s, &alice, None, day(3), day(3) + Duration::hours(8)).await.unwrap();
  shift(&s, &bob, None, day(4), day(4) + Duration::hours(8)).await.unwrap();
  shift(&s, &alice, None, day(5), day(5) + Duration::hours(8)).await.unwrap();
  // Outside a 30-day window.
  shift(&s, &alice, None, day(45), day(45) + Duration::hours(8)).await.unwrap();

  let stats = s.shift_stats(None, now).await.unwrap();
  let rows: Vec<(&str, u32)> = stats.iter().map(|r| (r.name.as_str(), r.shift_count)).collect();
  assert_eq!(rows, vec![("Alice", 4), ("Bob", 1)]);

  let wide = s.shift_stats(Some(60), now).await.unwrap();
  assert_eq!(wide[0].shift_count, 5);

  assert!(matches!(s.shift_stats(Some(0), now).await, Err(Error::Validation(_))));
  assert!(matches!(s.shift_stats(Some(u32::MAX), now).await, Err(Error::Validation(_))));
  assert!(matches!(s.shift_stats(Some(36_501), Utc::now()).await, Err(Error::Validation(_))));
  assert!(s.shift_stats(Some(36_500), now).await.is_ok());
}

// ─── Agenda ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn agenda_collects_today_upcoming_and_current_shift() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;

  event(&s, "Standup", &alice, &[], at(9), at(10)).await.unwrap();
  event(&s, "Review", &bob, &[&alice], at(9) + Duration::days(2), at(10) + Duration::days(2))
    .await
    .unwrap();
  event(&s, "Far off", &alice, &[], at(9) + Duration::days(20), at(10) + Duration::days(20))
    .await
    .unwrap();
  event(&s, "Not mine", &bob, &[], at(14), at(15)).await.unwrap();
  let sh = shift(&s, &bob, None, at(0), at(12)).await.unwrap();

  let agenda = s.agenda(alice.identity_id, at(8)).await.unwrap();
  assert_eq!(agenda.current_shift.map(|c| c.shift_id), Some(sh.shift_id));
  let today: Vec<&str> = agenda.today.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(today, vec!["Standup"]);
  let upcoming: Vec<&str> = agenda.upcoming.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(upcoming, vec!["Standup", "Review"]);
}

#[tokio::test]
async fn agenda_today_excludes_events_touching_midnight() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let midnight = at(0);
  let tomorrow = midnight + Duration::days(1);

  event(&s, "Overnight", &alice, &[], midnight - Duration::hours(1), midnight).await.unwrap();
  event(&s, "Early", &alice, &[], midnight, midnight + Duration::minutes(30)).await.unwrap();
  event(&s, "Late", &alice, &[], at(23), tomorrow).await.unwrap();
  event(&s, "Tomorrow", &alice, &[], tomorrow, tomorrow + Duration::hours(1)).await.unwrap();

  let agenda = s.agenda(alice.identity_id, at(8)).await.unwrap();
  let today: Vec<&str> = agenda.today.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(today, vec!["Early", "Late"]);
}

// ─── Store-level ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_events_skips_excluded_and_unrelated() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;
  let a = event(&s, "A", &alice, &[], at(1), at(2)).await.unwrap();
  let b = event(&s, "B", &bob, &[&alice], at(3), at(4)).await.unwrap();
  event(&s, "C", &bob, &[], at(5), at(6)).await.unwrap();

  let found = s
    .store()
    .find_events_for_identities(vec![alice.identity_id], Some(a.event_id))
    .await
    .unwrap();
  assert_eq!(found.iter().map(|e| e.event_id).collect::<Vec<_>>(), vec![b.event_id]);

  let none = s.store().find_events_for_identities(vec![], None).await.unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn store_updates_of_missing_rows_return_none() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let ev = event(&s, "A", &alice, &[], at(1), at(2)).await.unwrap();
  let sh = shift(&s, &alice, None, at(3), at(4)).await.unwrap();

  let ghost_event = CalendarEvent { event_id: Uuid::new_v4(), ..ev };
  assert!(s.store().update_event(ghost_event).await.unwrap().is_none());

  let ghost_shift = OnCallShift { shift_id: Uuid::new_v4(), ..sh };
  assert!(s.store().update_shift(ghost_shift).await.unwrap().is_none());

  assert!(s.store().get_identity(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn window_applied_in_store_matches_admits() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  event(&s, "Touching", &alice, &[], at(8), at(10)).await.unwrap();

  // A record ending exactly at the start bound is admitted.
  let filter = EventFilter {
    window: Some(TimeWindow::new(Some(at(10)), None, WindowSemantics::Intersect)),
    ..Default::default()
  };
  assert_eq!(s.store().list_events(filter).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sql_window_filter_agrees_with_admits() {
  let s = scheduler().await;
  let alice = person(&s, "Alice").await;
  let ranges = [(1, 2), (4, 6), (6, 8), (10, 12), (20, 22)];
  for (i, (start, end)) in ranges.into_iter().enumerate() {
    event(&s, &format!("E{i}"), &alice, &[], at(start), at(end)).await.unwrap();
    shift(&s, &alice, None, at(start), at(end)).await.unwrap();
  }

  let all_events = s.store().list_events(EventFilter::default()).await.unwrap();
  let all_shifts = s.store().list_shifts(ShiftFilter::default()).await.unwrap();
  assert_eq!(all_events.len(), ranges.len());
  assert_eq!(all_shifts.len(), ranges.len());

  let windows = [
    TimeWindow::new(Some(at(6)), None, WindowSemantics::Intersect),
    TimeWindow::new(None, Some(at(6)), WindowSemantics::Intersect),
    TimeWindow::new(Some(at(6)), Some(at(10)), WindowSemantics::Intersect),
    TimeWindow::new(Some(at(6)), Some(at(10)), WindowSemantics::Union),
    TimeWindow::new(Some(at(13)), Some(at(3)), WindowSemantics::Union),
    TimeWindow::at(at(6)),
  ];
  for window in windows {
    let events = s
      .store()
      .list_events(EventFilter { window: Some(window), ..Default::default() })
      .await
      .unwrap();
    let expected: Vec<Uuid> = all_events
      .iter()
      .filter(|e| window.admits(e.start_at, e.end_at))
      .map(|e| e.event_id)
      .collect();
    assert_eq!(events.iter().map(|e| e.event_id).collect::<Vec<_>>(), expected, "{window:?}");

    let shifts = s
      .store()
      .list_shifts(ShiftFilter { window: Some(window), ..Default::default() })
      .await
      .unwrap();
    let expected: Vec<Uuid> = all_shifts
      .iter()
      .filter(|sh| window.admits(sh.start_at, sh.end_at))
      .map(|sh| sh.shift_id)
      .collect();
    assert_eq!(shifts.iter().map(|sh| sh.shift_id).collect::<Vec<_>>(), expected, "{window:?}");
  }
}
