//! The `ScheduleStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `opsdesk-store-sqlite`).
//! The conflict policies and the [`Scheduler`](crate::schedule::Scheduler)
//! only ever talk to this abstraction.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  availability::TimeWindow,
  event::{CalendarEvent, EventCategory, Priority},
  identity::{Identity, Role},
  shift::OnCallShift,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`ScheduleStore::list_events`]. Every set field narrows the
/// result.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
  pub category:  Option<EventCategory>,
  pub owner_id:  Option<Uuid>,
  pub priority:  Option<Priority>,
  /// Only events this identity owns or participates in.
  pub involving: Option<Uuid>,
  pub window:    Option<TimeWindow>,
}

/// Parameters for [`ScheduleStore::list_shifts`].
#[derive(Debug, Clone, Default)]
pub struct ShiftFilter {
  /// Only shifts where this identity is assignee or backup.
  pub involving:    Option<Uuid>,
  pub window:       Option<TimeWindow>,
  /// Only shifts starting at or after this instant.
  pub started_from: Option<DateTime<Utc>>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an opsdesk record store.
///
/// Entities arrive fully built and validated; the store only persists and
/// retrieves them. Multi-row writes (an event with its participant links)
/// must be atomic.
///
/// All listing methods return records in ascending `start_at` order, and
/// apply any [`TimeWindow`] exactly as [`TimeWindow::admits`] defines it.
pub trait ScheduleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  fn insert_identity(
    &self,
    identity: Identity,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  fn get_identity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  /// Case-insensitive lookup.
  fn find_identity_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  /// All identities, newest first.
  fn list_identities(
    &self,
  ) -> impl Future<Output = Result<Vec<Identity>, Self::Error>> + Send + '_;

  /// Returns the updated identity, or `None` if it does not exist.
  fn set_identity_role(
    &self,
    id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  /// Persist an event together with its participant links, atomically.
  fn insert_event(
    &self,
    event: CalendarEvent,
  ) -> impl Future<Output = Result<CalendarEvent, Self::Error>> + Send + '_;

  /// Overwrite every field of an existing event and replace its participant
  /// links, atomically. Returns `None` if the event no longer exists.
  fn update_event(
    &self,
    event: CalendarEvent,
  ) -> impl Future<Output = Result<Option<CalendarEvent>, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<CalendarEvent>, Self::Error>> + Send + '_;

  /// Returns `true` if a row was removed.
  fn delete_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Events owned by, or with a participant in, any of `identity_ids`,
  /// skipping `exclude`.
  fn find_events_for_identities(
    &self,
    identity_ids: Vec<Uuid>,
    exclude: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<CalendarEvent>, Self::Error>> + Send + '_;

  fn list_events(
    &self,
    filter: EventFilter,
  ) -> impl Future<Output = Result<Vec<CalendarEvent>, Self::Error>> + Send + '_;

  // ── Shifts ────────────────────────────────────────────────────────────

  fn insert_shift(
    &self,
    shift: OnCallShift,
  ) -> impl Future<Output = Result<OnCallShift, Self::Error>> + Send + '_;

  /// Returns `None` if the shift no longer exists.
  fn update_shift(
    &self,
    shift: OnCallShift,
  ) -> impl Future<Output = Result<Option<OnCallShift>, Self::Error>> + Send + '_;

  fn get_shift(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<OnCallShift>, Self::Error>> + Send + '_;

  /// Returns `true` if a row was removed.
  fn delete_shift(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Shifts where `identity_id` is assignee or backup, skipping `exclude`.
  fn find_shifts_for_identity(
    &self,
    identity_id: Uuid,
    exclude: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<OnCallShift>, Self::Error>> + Send + '_;

  fn list_shifts(
    &self,
    filter: ShiftFilter,
  ) -> impl Future<Output = Result<Vec<OnCallShift>, Self::Error>> + Send + '_;
}
