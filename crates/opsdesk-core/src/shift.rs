//! On-call shifts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Result, interval::Interval};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShiftCategory {
  Day,
  Night,
  Weekend,
}

/// Free-form handover notes keyed by item. Stored verbatim, never interpreted.
pub type HandoverChecklist = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnCallShift {
  pub shift_id:           Uuid,
  pub category:           ShiftCategory,
  pub start_at:           DateTime<Utc>,
  pub end_at:             DateTime<Utc>,
  pub assignee_id:        Uuid,
  pub backup_id:          Option<Uuid>,
  pub notes:              Option<String>,
  pub handover_checklist: HandoverChecklist,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl OnCallShift {
  /// Whether `identity_id` is the assignee or the backup.
  pub fn involves(&self, identity_id: Uuid) -> bool {
    self.assignee_id == identity_id || self.backup_id == Some(identity_id)
  }
}

// ─── NewShift ────────────────────────────────────────────────────────────────

/// Input to [`crate::schedule::Scheduler::create_shift`].
#[derive(Debug, Clone)]
pub struct NewShift {
  pub category:           ShiftCategory,
  pub start_at:           DateTime<Utc>,
  pub end_at:             DateTime<Utc>,
  pub assignee_id:        Uuid,
  pub backup_id:          Option<Uuid>,
  pub notes:              Option<String>,
  pub handover_checklist: HandoverChecklist,
}

impl NewShift {
  pub fn new(
    category: ShiftCategory,
    assignee_id: Uuid,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
  ) -> Self {
    Self {
      category,
      start_at,
      end_at,
      assignee_id,
      backup_id: None,
      notes: None,
      handover_checklist: HandoverChecklist::new(),
    }
  }

  pub(crate) fn into_shift(self, now: DateTime<Utc>) -> Result<OnCallShift> {
    let interval = Interval::new(self.start_at, self.end_at)?;
    Ok(OnCallShift {
      shift_id:           Uuid::new_v4(),
      category:           self.category,
      start_at:           interval.start(),
      end_at:             interval.end(),
      assignee_id:        self.assignee_id,
      backup_id:          self.backup_id,
      notes:              self.notes,
      handover_checklist: self.handover_checklist,
      created_at:         now,
      updated_at:         now,
    })
  }
}

// ─── ShiftPatch ──────────────────────────────────────────────────────────────

/// A partial update. For `backup_id` and `notes`, `Some(None)` clears the
/// field.
#[derive(Debug, Clone, Default)]
pub struct ShiftPatch {
  pub category:           Option<ShiftCategory>,
  pub start_at:           Option<DateTime<Utc>>,
  pub end_at:             Option<DateTime<Utc>>,
  pub assignee_id:        Option<Uuid>,
  pub backup_id:          Option<Option<Uuid>>,
  pub notes:              Option<Option<String>>,
  pub handover_checklist: Option<HandoverChecklist>,
}

impl ShiftPatch {
  /// Whether applying this patch can change who is on call when.
  pub fn touches_schedule(&self) -> bool {
    self.start_at.is_some()
      || self.end_at.is_some()
      || self.assignee_id.is_some()
      || self.backup_id.is_some()
  }

  pub(crate) fn apply(
    self,
    existing: &OnCallShift,
    now: DateTime<Utc>,
  ) -> Result<OnCallShift> {
    let interval = Interval::new(
      self.start_at.unwrap_or(existing.start_at),
      self.end_at.unwrap_or(existing.end_at),
    )?;

    Ok(OnCallShift {
      shift_id:           existing.shift_id,
      category:           self.category.unwrap_or(existing.category),
      start_at:           interval.start(),
      end_at:             interval.end(),
      assignee_id:        self.assignee_id.unwrap_or(existing.assignee_id),
      backup_id:          self.backup_id.unwrap_or(existing.backup_id),
      notes:              self.notes.unwrap_or_else(|| existing.notes.clone()),
      handover_checklist: self
        .handover_checklist
        .unwrap_or_else(|| existing.handover_checklist.clone()),
      created_at:         existing.created_at,
      updated_at:         now,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};
  use serde_json::json;

  use super::*;
  use crate::Error;

  fn monday() -> DateTime<Utc> { Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap() }

  fn sample() -> OnCallShift {
    let mut input =
      NewShift::new(ShiftCategory::Day, Uuid::new_v4(), monday(), monday() + Duration::days(1));
    input.backup_id = Some(Uuid::new_v4());
    input.handover_checklist.insert("pager_tested".into(), json!(true));
    input.into_shift(monday()).unwrap()
  }

  #[test]
  fn involves_assignee_and_backup_only() {
    let s = sample();
    assert!(s.involves(s.assignee_id));
    assert!(s.involves(s.backup_id.unwrap()));
    assert!(!s.involves(Uuid::new_v4()));
  }

  #[test]
  fn new_shift_rejects_inverted_range() {
    let input = NewShift::new(ShiftCategory::Night, Uuid::new_v4(), monday(), monday());
    assert!(matches!(input.into_shift(monday()), Err(Error::Validation(_))));
  }

  #[test]
  fn patch_can_clear_backup_and_keep_checklist() {
    let s = sample();
    let patch = ShiftPatch { backup_id: Some(None), ..Default::default() };
    assert!(patch.touches_schedule());

    let merged = patch.apply(&s, monday()).unwrap();
    assert!(merged.backup_id.is_none());
    assert_eq!(merged.handover_checklist.get("pager_tested"), Some(&json!(true)));
  }

  #[test]
  fn notes_only_patch_does_not_touch_schedule() {
    let patch = ShiftPatch { notes: Some(Some("quiet night".into())), ..Default::default() };
    assert!(!patch.touches_schedule());
  }
}
