//! Calendar events: maintenance windows, changes, meetings and tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result, interval::Interval};

// ─── Classification ──────────────────────────────────────────────────────────

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
pub enum EventCategory {
  Maintenance,
  Change,
  Meeting,
  Task,
}

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
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
  Low,
  #[default]
  Medium,
  High,
}

/// Who is affected when the event happens.
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
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImpactScope {
  Customer,
  Service,
  #[default]
  Internal,
}

// ─── CalendarEvent ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
  pub event_id:        Uuid,
  pub title:           String,
  pub description:     Option<String>,
  pub category:        EventCategory,
  pub priority:        Priority,
  pub impact:          ImpactScope,
  pub start_at:        DateTime<Utc>,
  pub end_at:          DateTime<Utc>,
  pub owner_id:        Uuid,
  /// Deduplicated; may include the owner.
  pub participant_ids: Vec<Uuid>,
  pub tags:            Vec<String>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl CalendarEvent {
  /// The owner followed by every participant, duplicates removed.
  pub fn involved(&self) -> Vec<Uuid> {
    involved_identities(self.owner_id, &self.participant_ids)
  }

  pub fn involves(&self, identity_id: Uuid) -> bool {
    self.owner_id == identity_id || self.participant_ids.contains(&identity_id)
  }
}

/// `{owner} ∪ participants`, keeping first-seen order.
pub fn involved_identities(owner_id: Uuid, participants: &[Uuid]) -> Vec<Uuid> {
  dedup(std::iter::once(owner_id).chain(participants.iter().copied()))
}

pub(crate) fn dedup(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
  let mut out: Vec<Uuid> = Vec::new();
  for id in ids {
    if !out.contains(&id) {
      out.push(id);
    }
  }
  out
}

fn normalize_title(title: &str) -> Result<String> {
  let title = title.trim();
  if title.is_empty() {
    return Err(Error::validation("title must not be empty"));
  }
  Ok(title.to_owned())
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(tags.len());
  for tag in tags {
    let tag = tag.trim();
    if !tag.is_empty() && !out.iter().any(|t| t == tag) {
      out.push(tag.to_owned());
    }
  }
  out
}

// ─── NewEvent ────────────────────────────────────────────────────────────────

/// Input to [`crate::schedule::Scheduler::create_event`].
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub title:           String,
  pub description:     Option<String>,
  pub category:        EventCategory,
  pub priority:        Priority,
  pub impact:          ImpactScope,
  pub start_at:        DateTime<Utc>,
  pub end_at:          DateTime<Utc>,
  pub owner_id:        Uuid,
  pub participant_ids: Vec<Uuid>,
  pub tags:            Vec<String>,
}

impl NewEvent {
  /// Convenience constructor with defaults for everything but the essentials.
  pub fn new(
    title: impl Into<String>,
    category: EventCategory,
    owner_id: Uuid,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
  ) -> Self {
    Self {
      title: title.into(),
      description: None,
      category,
      priority: Priority::default(),
      impact: ImpactScope::default(),
      start_at,
      end_at,
      owner_id,
      participant_ids: Vec::new(),
      tags: Vec::new(),
    }
  }

  /// Validate shape and build the event that will be persisted.
  pub(crate) fn into_event(self, now: DateTime<Utc>) -> Result<CalendarEvent> {
    let interval = Interval::new(self.start_at, self.end_at)?;
    Ok(CalendarEvent {
      event_id:        Uuid::new_v4(),
      title:           normalize_title(&self.title)?,
      description:     self.description,
      category:        self.category,
      priority:        self.priority,
      impact:          self.impact,
      start_at:        interval.start(),
      end_at:          interval.end(),
      owner_id:        self.owner_id,
      participant_ids: dedup(self.participant_ids),
      tags:            normalize_tags(self.tags),
      created_at:      now,
      updated_at:      now,
    })
  }
}

// ─── EventPatch ──────────────────────────────────────────────────────────────

/// A partial update. `None` leaves a field untouched; for `description`,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
  pub title:           Option<String>,
  pub description:     Option<Option<String>>,
  pub category:        Option<EventCategory>,
  pub priority:        Option<Priority>,
  pub impact:          Option<ImpactScope>,
  pub start_at:        Option<DateTime<Utc>>,
  pub end_at:          Option<DateTime<Utc>>,
  pub owner_id:        Option<Uuid>,
  /// Replaces the whole participant set when present.
  pub participant_ids: Option<Vec<Uuid>>,
  pub tags:            Option<Vec<String>>,
}

impl EventPatch {
  /// Whether applying this patch can change who is busy when.
  pub fn touches_schedule(&self) -> bool {
    self.start_at.is_some()
      || self.end_at.is_some()
      || self.owner_id.is_some()
      || self.participant_ids.is_some()
  }

  /// Merge onto `existing`, re-validating the merged fields.
  pub(crate) fn apply(
    self,
    existing: &CalendarEvent,
    now: DateTime<Utc>,
  ) -> Result<CalendarEvent> {
    let interval = Interval::new(
      self.start_at.unwrap_or(existing.start_at),
      self.end_at.unwrap_or(existing.end_at),
    )?;
    let title = match self.title {
      Some(t) => normalize_title(&t)?,
      None => existing.title.clone(),
    };

    Ok(CalendarEvent {
      event_id: existing.event_id,
      title,
      description: self
        .description
        .unwrap_or_else(|| existing.description.clone()),
      category: self.category.unwrap_or(existing.category),
      priority: self.priority.unwrap_or(existing.priority),
      impact: self.impact.unwrap_or(existing.impact),
      start_at: interval.start(),
      end_at: interval.end(),
      owner_id: self.owner_id.unwrap_or(existing.owner_id),
      participant_ids: self
        .participant_ids
        .map(dedup)
        .unwrap_or_else(|| existing.participant_ids.clone()),
      tags: self
        .tags
        .map(normalize_tags)
        .unwrap_or_else(|| existing.tags.clone()),
      created_at: existing.created_at,
      updated_at: now,
    })
  }
}
