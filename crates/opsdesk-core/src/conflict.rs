//! Conflict policies run before every schedule-changing write.
//!
//! Both policies fetch the records that share an identity with the proposed
//! write and test each one against the proposed range with
//! [`overlaps`](crate::interval::overlaps). Nothing is written here.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  event::involved_identities,
  interval::Interval,
  store::ScheduleStore,
};

/// The owner and every participant must be free for the whole of `interval`.
///
/// On update, pass the event being modified as `exclude` so it is not
/// compared against itself. Every clashing event is reported, not just the
/// first.
pub async fn check_event_conflicts<S: ScheduleStore>(
  store: &S,
  owner_id: Uuid,
  participant_ids: &[Uuid],
  interval: Interval,
  exclude: Option<Uuid>,
) -> Result<()> {
  let involved = involved_identities(owner_id, participant_ids);
  let candidates = store
    .find_events_for_identities(involved, exclude)
    .await
    .map_err(Error::store)?;
  debug!(candidates = candidates.len(), "checking event conflicts");

  let (titles, event_ids): (Vec<String>, Vec<Uuid>) = candidates
    .into_iter()
    .filter(|e| interval.overlaps(e.start_at, e.end_at))
    .map(|e| (e.title, e.event_id))
    .unzip();

  if event_ids.is_empty() {
    return Ok(());
  }
  warn!(conflicts = event_ids.len(), %owner_id, "event conflict");
  Err(Error::EventConflict { titles, event_ids })
}

/// `identity_id` must not be assignee or backup on any other shift that
/// overlaps `interval`.
pub async fn check_shift_overlaps<S: ScheduleStore>(
  store: &S,
  identity_id: Uuid,
  interval: Interval,
  exclude: Option<Uuid>,
) -> Result<()> {
  let candidates = store
    .find_shifts_for_identity(identity_id, exclude)
    .await
    .map_err(Error::store)?;
  debug!(candidates = candidates.len(), %identity_id, "checking shift overlaps");

  let shift_ids: Vec<Uuid> = candidates
    .iter()
    .filter(|s| interval.overlaps(s.start_at, s.end_at))
    .map(|s| s.shift_id)
    .collect();

  if shift_ids.is_empty() {
    return Ok(());
  }
  warn!(conflicts = shift_ids.len(), %identity_id, "shift overlap");
  Err(Error::ShiftConflict { identity_id, shift_ids })
}

/// Check the assignee, then the backup if there is one. Each is checked on
/// its own; the pair is never checked jointly.
pub async fn check_shift_assignment<S: ScheduleStore>(
  store: &S,
  assignee_id: Uuid,
  backup_id: Option<Uuid>,
  interval: Interval,
  exclude: Option<Uuid>,
) -> Result<()> {
  check_shift_overlaps(store, assignee_id, interval, exclude).await?;
  if let Some(backup_id) = backup_id {
    check_shift_overlaps(store, backup_id, interval, exclude).await?;
  }
  Ok(())
}
