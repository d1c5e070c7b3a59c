//! On-call load per assignee over a trailing window.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  shift::OnCallShift,
  store::{ScheduleStore, ShiftFilter},
};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Longest accepted window, one century.
pub const MAX_WINDOW_DAYS: u32 = 36_500;

/// Display name used when an assignee's identity record is missing.
const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftStats {
  pub identity_id: Uuid,
  pub name:        String,
  pub shift_count: u32,
}

/// Count shifts per assignee, most loaded first. Ties keep the order in which
/// each assignee was first seen. Backups are not counted.
pub fn tally(
  shifts: &[OnCallShift],
  names: &HashMap<Uuid, String>,
) -> Vec<ShiftStats> {
  let mut rows: Vec<ShiftStats> = Vec::new();
  let mut index: HashMap<Uuid, usize> = HashMap::new();

  for shift in shifts {
    match index.get(&shift.assignee_id) {
      Some(&i) => rows[i].shift_count += 1,
      None => {
        index.insert(shift.assignee_id, rows.len());
        rows.push(ShiftStats {
          identity_id: shift.assignee_id,
          name:        names
            .get(&shift.assignee_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_NAME.to_owned()),
          shift_count: 1,
        });
      }
    }
  }

  // `sort_by` is stable, which gives the first-seen tie-break.
  rows.sort_by(|a, b| b.shift_count.cmp(&a.shift_count));
  rows
}

/// Shifts starting within the last `days` days of `now`, tallied per assignee.
pub async fn shift_stats<S: ScheduleStore>(
  store: &S,
  days: u32,
  now: DateTime<Utc>,
) -> Result<Vec<ShiftStats>> {
  if days == 0 {
    return Err(Error::Validation("window must be at least one day".into()));
  }
  if days > MAX_WINDOW_DAYS {
    return Err(Error::Validation(format!(
      "window too large: at most {MAX_WINDOW_DAYS} days"
    )));
  }
  let since = now
    .checked_sub_signed(Duration::days(i64::from(days)))
    .ok_or_else(|| Error::Validation("window too large".into()))?;
  let shifts = store
    .list_shifts(ShiftFilter { started_from: Some(since), ..Default::default() })
    .await
    .map_err(Error::store)?;

  let mut names: HashMap<Uuid, String> = HashMap::new();
  for shift in &shifts {
    if names.contains_key(&shift.assignee_id) {
      continue;
    }
    if let Some(identity) =
      store.get_identity(shift.assignee_id).await.map_err(Error::store)?
    {
      names.insert(identity.identity_id, identity.name);
    }
  }

  Ok(tally(&shifts, &names))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::shift::{HandoverChecklist, ShiftCategory};

  fn shift(assignee_id: Uuid, day: u32) -> OnCallShift {
    let start = Utc.with_ymd_and_hms(2026, 4, day, 8, 0, 0).unwrap();
    OnCallShift {
      shift_id: Uuid::new_v4(),
      category: ShiftCategory::Day,
      start_at: start,
      end_at: start + Duration::hours(12),
      assignee_id,
      backup_id: None,
      notes: None,
      handover_checklist: HandoverChecklist::new(),
      created_at: start,
      updated_at: start,
    }
  }

  #[test]
  fn counts_and_ranks_descending() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let names = HashMap::from([(a, "Alice".to_string()), (b, "Bob".to_string())]);
    let shifts = vec![shift(a, 1), shift(a, 2), shift(a, 3), shift(b, 4), shift(a, 5)];

    let stats = tally(&shifts, &names);
    assert_eq!(stats, vec![
      ShiftStats { identity_id: a, name: "Alice".into(), shift_count: 4 },
      ShiftStats { identity_id: b, name: "Bob".into(), shift_count: 1 },
    ]);
  }

  #[test]
  fn ties_keep_first_seen_order() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let c = Uuid::new_v4();
    let shifts = vec![shift(c, 1), shift(a, 2), shift(b, 3), shift(a, 4), shift(c, 5)];

    let order: Vec<Uuid> = tally(&shifts, &HashMap::new())
      .into_iter()
      .map(|s| s.identity_id)
      .collect();
    assert_eq!(order, vec![c, a, b]);
  }

  #[test]
  fn backups_are_not_counted_and_missing_names_fall_back() {
    let a = Uuid::new_v4();
    let mut s = shift(a, 1);
    s.backup_id = Some(Uuid::new_v4());

    let stats = tally(&[s], &HashMap::new());
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].name, "Unknown");
  }

  #[test]
  fn empty_input_gives_empty_stats() {
    assert!(tally(&[], &HashMap::new()).is_empty());
  }
}
