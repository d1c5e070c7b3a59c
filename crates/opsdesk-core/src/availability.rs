//! Read-side queries: range listings, the current on-call shift, and a
//! per-identity agenda.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
  Error, Result,
  event::CalendarEvent,
  shift::OnCallShift,
  store::{EventFilter, ScheduleStore, ShiftFilter},
};

// ─── Windows ─────────────────────────────────────────────────────────────────

/// How the two bounds of a [`TimeWindow`] combine when both are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowSemantics {
  /// Record must satisfy both bounds: it intersects `[start, end]`.
  #[default]
  Intersect,
  /// Record must satisfy either bound. Returns records far outside the
  /// window; kept for clients that relied on the historical behaviour.
  Union,
}

/// An optionally bounded window over record intervals. Both bounds are
/// inclusive: a record ending exactly at `start` is admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindow {
  pub start:     Option<DateTime<Utc>>,
  pub end:       Option<DateTime<Utc>>,
  pub semantics: WindowSemantics,
}

impl TimeWindow {
  pub fn new(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    semantics: WindowSemantics,
  ) -> Self {
    Self { start, end, semantics }
  }

  /// The degenerate window at a single instant.
  pub fn at(instant: DateTime<Utc>) -> Self {
    Self::new(Some(instant), Some(instant), WindowSemantics::Intersect)
  }

  pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
    Self::new(Some(start), Some(end), WindowSemantics::Intersect)
  }

  pub fn is_unbounded(&self) -> bool { self.start.is_none() && self.end.is_none() }

  /// Whether a record spanning `[record_start, record_end)` is admitted.
  pub fn admits(
    &self,
    record_start: DateTime<Utc>,
    record_end: DateTime<Utc>,
  ) -> bool {
    let ends_after = self.start.map(|s| record_end >= s);
    let starts_before = self.end.map(|e| record_start <= e);
    match (ends_after, starts_before) {
      (None, None) => true,
      (Some(a), None) => a,
      (None, Some(b)) => b,
      (Some(a), Some(b)) => match self.semantics {
        WindowSemantics::Intersect => a && b,
        WindowSemantics::Union => a || b,
      },
    }
  }

  fn warn_if_union(&self) {
    if self.semantics == WindowSemantics::Union
      && self.start.is_some()
      && self.end.is_some()
    {
      warn!(
        start = ?self.start,
        end = ?self.end,
        "union window semantics in use; results may fall outside the window"
      );
    }
  }
}

// ─── Range queries ───────────────────────────────────────────────────────────

/// Events matching `filter`, ascending by start.
pub async fn list_events<S: ScheduleStore>(
  store: &S,
  filter: EventFilter,
) -> Result<Vec<CalendarEvent>> {
  if let Some(window) = &filter.window {
    window.warn_if_union();
  }
  store.list_events(filter).await.map_err(Error::store)
}

/// Shifts matching `filter`, ascending by start.
pub async fn list_shifts<S: ScheduleStore>(
  store: &S,
  filter: ShiftFilter,
) -> Result<Vec<OnCallShift>> {
  if let Some(window) = &filter.window {
    window.warn_if_union();
  }
  store.list_shifts(filter).await.map_err(Error::store)
}

// ─── Point query ─────────────────────────────────────────────────────────────

/// The shift covering `now` (both ends inclusive), if any.
///
/// Several matches should be impossible while the overlap policy holds; if
/// they occur anyway the earliest-starting one wins.
pub async fn current_shift<S: ScheduleStore>(
  store: &S,
  now: DateTime<Utc>,
) -> Result<Option<OnCallShift>> {
  let filter = ShiftFilter { window: Some(TimeWindow::at(now)), ..Default::default() };
  let mut active = store.list_shifts(filter).await.map_err(Error::store)?;
  if active.len() > 1 {
    warn!(count = active.len(), %now, "multiple shifts active at once");
  }
  Ok(if active.is_empty() { None } else { Some(active.swap_remove(0)) })
}

// ─── Agenda ──────────────────────────────────────────────────────────────────

/// What an identity needs to know right now.
#[derive(Debug, Clone, Serialize)]
pub struct Agenda {
  pub as_of:         DateTime<Utc>,
  pub current_shift: Option<OnCallShift>,
  /// The identity's events intersecting the current UTC day.
  pub today:         Vec<CalendarEvent>,
  /// The identity's events intersecting the next seven days.
  pub upcoming:      Vec<CalendarEvent>,
}

/// Build the agenda for `identity_id` as of `now`.
pub async fn agenda<S: ScheduleStore>(
  store: &S,
  identity_id: Uuid,
  now: DateTime<Utc>,
) -> Result<Agenda> {
  // Both bounds are inclusive; pull them one tick inside the day so events
  // touching either midnight stay out.
  let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
  let day_start = midnight + Duration::nanoseconds(1);
  let day_end = midnight + Duration::days(1) - Duration::nanoseconds(1);

  let today = list_events(store, EventFilter {
    involving: Some(identity_id),
    window: Some(TimeWindow::between(day_start, day_end)),
    ..Default::default()
  })
  .await?;

  let upcoming = list_events(store, EventFilter {
    involving: Some(identity_id),
    window: Some(TimeWindow::between(now, now + Duration::days(7))),
    ..Default::default()
  })
  .await?;

  Ok(Agenda {
    as_of: now,
    current_shift: current_shift(store, now).await?,
    today,
    upcoming,
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn h(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, hour, 0, 0).unwrap()
  }

  #[test]
  fn unbounded_admits_everything() {
    let w = TimeWindow::default();
    assert!(w.is_unbounded());
    assert!(w.admits(h(0), h(1)));
  }

  #[test]
  fn end_only_admits_anything_starting_before() {
    let w = TimeWindow::new(None, Some(h(12)), WindowSemantics::Intersect);
    let long_ago = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
    assert!(w.admits(long_ago, long_ago + Duration::hours(1)));
    assert!(w.admits(h(12), h(13)));
    assert!(!w.admits(h(13), h(14)));
  }

  #[test]
  fn start_bound_is_inclusive_of_touching_end() {
    let w = TimeWindow::new(Some(h(10)), None, WindowSemantics::Intersect);
    assert!(w.admits(h(9), h(10)));
    assert!(!w.admits(h(8), h(9)));
  }

  #[test]
  fn intersect_and_union_differ_when_both_bounds_set() {
    let intersect = TimeWindow::new(Some(h(10)), Some(h(12)), WindowSemantics::Intersect);
    let union = TimeWindow { semantics: WindowSemantics::Union, ..intersect };

    // Entirely after the window: ends after start, but does not start before end.
    assert!(!intersect.admits(h(14), h(15)));
    assert!(union.admits(h(14), h(15)));

    // Entirely before the window.
    assert!(!intersect.admits(h(1), h(2)));
    assert!(union.admits(h(1), h(2)));

    assert!(intersect.admits(h(11), h(13)));
    assert!(union.admits(h(11), h(13)));
  }

  #[test]
  fn point_window_matches_inclusive_ends() {
    let w = TimeWindow::at(h(10));
    assert!(w.admits(h(8), h(10)));
    assert!(w.admits(h(10), h(12)));
    assert!(!w.admits(h(11), h(12)));
  }

  #[test]
  fn semantics_deserialize_from_config_strings() {
    let s: WindowSemantics = serde_json::from_str("\"union\"").unwrap();
    assert_eq!(s, WindowSemantics::Union);
  }
}
