//! [`Scheduler`], the single entry point for reads and writes.
//!
//! Every write follows the same order: validate the input, run the relevant
//! conflict policy against the store, and only then persist. A failed check
//! leaves the store untouched.
//!
//! The read-decide-write sequence is not atomic against concurrent writers.
//! Two overlapping creates racing each other can both pass the check.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::{
  Error, Result,
  availability::{self, Agenda, TimeWindow, WindowSemantics},
  conflict::{check_event_conflicts, check_shift_assignment},
  event::{CalendarEvent, EventPatch, NewEvent, dedup},
  identity::{Identity, NewIdentity, Role},
  interval::Interval,
  shift::{NewShift, OnCallShift, ShiftPatch},
  stats::{self, DEFAULT_WINDOW_DAYS, ShiftStats},
  store::{EventFilter, ScheduleStore, ShiftFilter},
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
  /// How listing bounds combine when a caller supplies both.
  pub range_semantics:   WindowSemantics,
  /// Window used by [`Scheduler::shift_stats`] when the caller gives none.
  pub stats_window_days: u32,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      range_semantics:   WindowSemantics::default(),
      stats_window_days: DEFAULT_WINDOW_DAYS,
    }
  }
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

/// Stateless apart from its configuration; build one per process and share
/// it. Cloning is cheap.
pub struct Scheduler<S> {
  store:  Arc<S>,
  config: SchedulerConfig,
}

impl<S> Clone for Scheduler<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), config: self.config }
  }
}

impl<S: ScheduleStore> Scheduler<S> {
  pub fn new(store: Arc<S>, config: SchedulerConfig) -> Self {
    Self { store, config }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn config(&self) -> &SchedulerConfig { &self.config }

  /// A listing window using the configured bound semantics, or `None` when
  /// neither bound is given.
  pub fn window(
    &self,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
  ) -> Option<TimeWindow> {
    let window = TimeWindow::new(start, end, self.config.range_semantics);
    (!window.is_unbounded()).then_some(window)
  }

  async fn ensure_identities_exist(&self, ids: &[Uuid]) -> Result<()> {
    for &id in ids {
      if self.store.get_identity(id).await.map_err(Error::store)?.is_none() {
        return Err(Error::Validation(format!("unknown identity: {id}")));
      }
    }
    Ok(())
  }

  // ── Identities ────────────────────────────────────────────────────────────

  pub async fn create_identity(&self, input: NewIdentity) -> Result<Identity> {
    let input = input.normalized()?;

    if self
      .store
      .find_identity_by_email(input.email.clone())
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Err(Error::Validation(format!(
        "email already in use: {}",
        input.email
      )));
    }

    let identity = Identity {
      identity_id: Uuid::new_v4(),
      name:        input.name,
      email:       input.email,
      role:        input.role,
      created_at:  Utc::now(),
    };
    let identity = self
      .store
      .insert_identity(identity)
      .await
      .map_err(Error::store)?;
    info!(identity_id = %identity.identity_id, role = %identity.role, "identity created");
    Ok(identity)
  }

  pub async fn get_identity(&self, id: Uuid) -> Result<Identity> {
    self
      .store
      .get_identity(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::IdentityNotFound(id))
  }

  pub async fn list_identities(&self) -> Result<Vec<Identity>> {
    self.store.list_identities().await.map_err(Error::store)
  }

  pub async fn set_role(&self, id: Uuid, role: Role) -> Result<Identity> {
    let identity = self
      .store
      .set_identity_role(id, role)
      .await
      .map_err(Error::store)?
      .ok_or(Error::IdentityNotFound(id))?;
    info!(identity_id = %id, %role, "role changed");
    Ok(identity)
  }

  // ── Events ────────────────────────────────────────────────────────────────

  pub async fn create_event(&self, input: NewEvent) -> Result<CalendarEvent> {
    let event = input.into_event(Utc::now())?;
    self.ensure_identities_exist(&event.involved()).await?;

    let interval = Interval::new(event.start_at, event.end_at)?;
    check_event_conflicts(
      &*self.store,
      event.owner_id,
      &event.participant_ids,
      interval,
      None,
    )
    .await?;

    let event = self.store.insert_event(event).await.map_err(Error::store)?;
    info!(event_id = %event.event_id, owner_id = %event.owner_id, "event created");
    Ok(event)
  }

  /// Apply `patch` to an existing event. The conflict check only runs when
  /// the patch changes the time range, the owner or the participants.
  pub async fn update_event(
    &self,
    id: Uuid,
    patch: EventPatch,
  ) -> Result<CalendarEvent> {
    let existing = self.get_event(id).await?;
    let touches_schedule = patch.touches_schedule();

    let mut added: Vec<Uuid> = Vec::new();
    added.extend(patch.owner_id);
    added.extend(patch.participant_ids.iter().flatten().copied());
    self.ensure_identities_exist(&dedup(added)).await?;

    let merged = patch.apply(&existing, Utc::now())?;

    if touches_schedule {
      let interval = Interval::new(merged.start_at, merged.end_at)?;
      check_event_conflicts(
        &*self.store,
        merged.owner_id,
        &merged.participant_ids,
        interval,
        Some(id),
      )
      .await?;
    }

    let event = self
      .store
      .update_event(merged)
      .await
      .map_err(Error::store)?
      .ok_or(Error::EventNotFound(id))?;
    info!(event_id = %id, rechecked = touches_schedule, "event updated");
    Ok(event)
  }

  pub async fn delete_event(&self, id: Uuid) -> Result<()> {
    if !self.store.delete_event(id).await.map_err(Error::store)? {
      return Err(Error::EventNotFound(id));
    }
    info!(event_id = %id, "event deleted");
    Ok(())
  }

  pub async fn get_event(&self, id: Uuid) -> Result<CalendarEvent> {
    self
      .store
      .get_event(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::EventNotFound(id))
  }

  pub async fn list_events(&self, filter: EventFilter) -> Result<Vec<CalendarEvent>> {
    availability::list_events(&*self.store, filter).await
  }

  // ── Shifts ────────────────────────────────────────────────────────────────

  pub async fn create_shift(&self, input: NewShift) -> Result<OnCallShift> {
    let shift = input.into_shift(Utc::now())?;
    let mut people = vec![shift.assignee_id];
    people.extend(shift.backup_id);
    self.ensure_identities_exist(&people).await?;

    let interval = Interval::new(shift.start_at, shift.end_at)?;
    check_shift_assignment(
      &*self.store,
      shift.assignee_id,
      shift.backup_id,
      interval,
      None,
    )
    .await?;

    let shift = self.store.insert_shift(shift).await.map_err(Error::store)?;
    info!(shift_id = %shift.shift_id, assignee_id = %shift.assignee_id, "shift created");
    Ok(shift)
  }

  /// Apply `patch` to an existing shift. The overlap check only runs when the
  /// patch changes the time range, the assignee or the backup; it then covers
  /// the merged assignee and backup.
  pub async fn update_shift(
    &self,
    id: Uuid,
    patch: ShiftPatch,
  ) -> Result<OnCallShift> {
    let existing = self.get_shift(id).await?;
    let touches_schedule = patch.touches_schedule();

    let mut added: Vec<Uuid> = Vec::new();
    added.extend(patch.assignee_id);
    added.extend(patch.backup_id.flatten());
    self.ensure_identities_exist(&added).await?;

    let merged = patch.apply(&existing, Utc::now())?;

    if touches_schedule {
      let interval = Interval::new(merged.start_at, merged.end_at)?;
      check_shift_assignment(
        &*self.store,
        merged.assignee_id,
        merged.backup_id,
        interval,
        Some(id),
      )
      .await?;
    }

    let shift = self
      .store
      .update_shift(merged)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ShiftNotFound(id))?;
    info!(shift_id = %id, rechecked = touches_schedule, "shift updated");
    Ok(shift)
  }

  pub async fn delete_shift(&self, id: Uuid) -> Result<()> {
    if !self.store.delete_shift(id).await.map_err(Error::store)? {
      return Err(Error::ShiftNotFound(id));
    }
    info!(shift_id = %id, "shift deleted");
    Ok(())
  }

  pub async fn get_shift(&self, id: Uuid) -> Result<OnCallShift> {
    self
      .store
      .get_shift(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ShiftNotFound(id))
  }

  pub async fn list_shifts(&self, filter: ShiftFilter) -> Result<Vec<OnCallShift>> {
    availability::list_shifts(&*self.store, filter).await
  }

  pub async fn current_shift(&self, now: DateTime<Utc>) -> Result<Option<OnCallShift>> {
    availability::current_shift(&*self.store, now).await
  }

  /// Per-assignee shift counts; `days` defaults to the configured window.
  pub async fn shift_stats(
    &self,
    days: Option<u32>,
    now: DateTime<Utc>,
  ) -> Result<Vec<ShiftStats>> {
    let days = days.unwrap_or(self.config.stats_window_days);
    stats::shift_stats(&*self.store, days, now).await
  }

  pub async fn agenda(&self, identity_id: Uuid, now: DateTime<Utc>) -> Result<Agenda> {
    availability::agenda(&*self.store, identity_id, now).await
  }
}
