//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed nanosecond
//! precision and a `Z` suffix. Enums use their snake_case names. Tags and the
//! handover checklist are compact JSON. UUIDs are hyphenated lowercase.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use opsdesk_core::{
  event::CalendarEvent,
  identity::Identity,
  shift::{HandoverChecklist, OnCallShift},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Column form of any of the core enums.
pub fn encode_enum<E>(value: E) -> &'static str
where
  E: Into<&'static str>,
{
  value.into()
}

pub fn decode_enum<E>(column: &str, s: &str) -> Result<E>
where
  E: FromStr,
{
  E::from_str(s).map_err(|_| Error::Decode(format!("unknown {column}: {s:?}")))
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_checklist(checklist: &HandoverChecklist) -> Result<String> {
  Ok(serde_json::to_string(checklist)?)
}

pub fn decode_checklist(s: &str) -> Result<HandoverChecklist> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `identities` row.
pub struct RawIdentity {
  pub identity_id: String,
  pub name:        String,
  pub email:       String,
  pub role:        String,
  pub created_at:  String,
}

impl RawIdentity {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      identity_id: row.get(0)?,
      name:        row.get(1)?,
      email:       row.get(2)?,
      role:        row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      identity_id: decode_uuid(&self.identity_id)?,
      name:        self.name,
      email:       self.email,
      role:        decode_enum("role", &self.role)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from an `events` row plus its participant links.
pub struct RawEvent {
  pub event_id:     String,
  pub title:        String,
  pub description:  Option<String>,
  pub category:     String,
  pub priority:     String,
  pub impact:       String,
  pub start_at:     String,
  pub end_at:       String,
  pub owner_id:     String,
  pub tags:         String,
  pub created_at:   String,
  pub updated_at:   String,
  // event_participants, in position order
  pub participants: Vec<String>,
}

impl RawEvent {
  /// Expects the column order of [`crate::store::EVENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:     row.get(0)?,
      title:        row.get(1)?,
      description:  row.get(2)?,
      category:     row.get(3)?,
      priority:     row.get(4)?,
      impact:       row.get(5)?,
      start_at:     row.get(6)?,
      end_at:       row.get(7)?,
      owner_id:     row.get(8)?,
      tags:         row.get(9)?,
      created_at:   row.get(10)?,
      updated_at:   row.get(11)?,
      participants: Vec::new(),
    })
  }

  pub fn into_event(self) -> Result<CalendarEvent> {
    let participant_ids = self
      .participants
      .iter()
      .map(|p| decode_uuid(p))
      .collect::<Result<Vec<_>>>()?;

    Ok(CalendarEvent {
      event_id: decode_uuid(&self.event_id)?,
      title: self.title,
      description: self.description,
      category: decode_enum("event category", &self.category)?,
      priority: decode_enum("priority", &self.priority)?,
      impact: decode_enum("impact scope", &self.impact)?,
      start_at: decode_dt(&self.start_at)?,
      end_at: decode_dt(&self.end_at)?,
      owner_id: decode_uuid(&self.owner_id)?,
      participant_ids,
      tags: decode_tags(&self.tags)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `shifts` row.
pub struct RawShift {
  pub shift_id:           String,
  pub category:           String,
  pub start_at:           String,
  pub end_at:             String,
  pub assignee_id:        String,
  pub backup_id:          Option<String>,
  pub notes:              Option<String>,
  pub handover_checklist: String,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawShift {
  /// Expects the column order of [`crate::store::SHIFT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      shift_id:           row.get(0)?,
      category:           row.get(1)?,
      start_at:           row.get(2)?,
      end_at:             row.get(3)?,
      assignee_id:        row.get(4)?,
      backup_id:          row.get(5)?,
      notes:              row.get(6)?,
      handover_checklist: row.get(7)?,
      created_at:         row.get(8)?,
      updated_at:         row.get(9)?,
    })
  }

  pub fn into_shift(self) -> Result<OnCallShift> {
    Ok(OnCallShift {
      shift_id:           decode_uuid(&self.shift_id)?,
      category:           decode_enum("shift category", &self.category)?,
      start_at:           decode_dt(&self.start_at)?,
      end_at:             decode_dt(&self.end_at)?,
      assignee_id:        decode_uuid(&self.assignee_id)?,
      backup_id:          self.backup_id.as_deref().map(decode_uuid).transpose()?,
      notes:              self.notes,
      handover_checklist: decode_checklist(&self.handover_checklist)?,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}
