//! The SQLite implementation of [`ScheduleStore`].

use std::path::Path;

use rusqlite::{
  OptionalExtension as _, TransactionBehavior, params_from_iter,
  types::Value,
};
use uuid::Uuid;

use opsdesk_core::{
  availability::{TimeWindow, WindowSemantics},
  event::CalendarEvent,
  identity::{Identity, Role},
  shift::OnCallShift,
  store::{EventFilter, ScheduleStore, ShiftFilter},
};

use crate::{
  Result,
  encode::{
    RawEvent, RawIdentity, RawShift, encode_checklist, encode_dt, encode_enum,
    encode_tags, encode_uuid,
  },
  schema::SCHEMA,
};

pub(crate) const IDENTITY_COLUMNS: &str =
  "identity_id, name, email, role, created_at";

pub(crate) const EVENT_COLUMNS: &str = "e.event_id, e.title, e.description, \
   e.category, e.priority, e.impact, e.start_at, e.end_at, e.owner_id, \
   e.tags, e.created_at, e.updated_at";

pub(crate) const SHIFT_COLUMNS: &str = "s.shift_id, s.category, s.start_at, \
   s.end_at, s.assignee_id, s.backup_id, s.notes, s.handover_checklist, \
   s.created_at, s.updated_at";

// ─── Row helpers (run on the connection thread) ──────────────────────────────

/// Run an event query and attach each event's participants.
fn query_events(
  conn: &rusqlite::Connection,
  sql: &str,
  args: Vec<Value>,
) -> rusqlite::Result<Vec<RawEvent>> {
  let mut stmt = conn.prepare(sql)?;
  let mut events = stmt
    .query_map(params_from_iter(args), RawEvent::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut links = conn.prepare(
    "SELECT identity_id FROM event_participants
     WHERE event_id = ?1
     ORDER BY position",
  )?;
  for event in &mut events {
    event.participants = links
      .query_map(rusqlite::params![event.event_id], |r| r.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?;
  }
  Ok(events)
}

fn query_shifts(
  conn: &rusqlite::Connection,
  sql: &str,
  args: Vec<Value>,
) -> rusqlite::Result<Vec<RawShift>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt
    .query_map(params_from_iter(args), RawShift::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn insert_participants(
  tx: &rusqlite::Transaction<'_>,
  event_id: &str,
  participants: &[String],
) -> rusqlite::Result<()> {
  let mut stmt = tx.prepare(
    "INSERT INTO event_participants (event_id, identity_id, position)
     VALUES (?1, ?2, ?3)",
  )?;
  for (position, identity_id) in participants.iter().enumerate() {
    stmt.execute(rusqlite::params![event_id, identity_id, position as i64])?;
  }
  Ok(())
}

/// Accumulates `WHERE` conditions with positional parameters.
#[derive(Default)]
struct Conditions {
  clauses: Vec<String>,
  args:    Vec<Value>,
}

impl Conditions {
  /// Add `value` as the next parameter and return its placeholder.
  fn bind(&mut self, value: impl Into<String>) -> String {
    self.args.push(Value::Text(value.into()));
    format!("?{}", self.args.len())
  }

  fn push(&mut self, clause: String) { self.clauses.push(clause); }

  /// Restrict to rows admitted by `window`, with the same rules as
  /// [`TimeWindow::admits`]. Timestamp columns are fixed-width, so string
  /// comparison is chronological.
  fn window(&mut self, window: &TimeWindow, start_col: &str, end_col: &str) {
    let ends_after = window
      .start
      .map(|s| format!("{end_col} >= {}", self.bind(encode_dt(s))));
    let starts_before = window
      .end
      .map(|e| format!("{start_col} <= {}", self.bind(encode_dt(e))));

    let clause = match (ends_after, starts_before) {
      (None, None) => return,
      (Some(c), None) | (None, Some(c)) => c,
      (Some(a), Some(b)) => match window.semantics {
        WindowSemantics::Intersect => format!("{a} AND {b}"),
        WindowSemantics::Union => format!("({a} OR {b})"),
      },
    };
    self.push(clause);
  }

  fn where_clause(&self) -> String {
    if self.clauses.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.clauses.join(" AND "))
    }
  }
}

// ─── Encoded rows ────────────────────────────────────────────────────────────

/// Column values for an `events` row, encoded off the connection thread.
struct EventRow {
  event_id:     String,
  title:        String,
  description:  Option<String>,
  category:     &'static str,
  priority:     &'static str,
  impact:       &'static str,
  start_at:     String,
  end_at:       String,
  owner_id:     String,
  tags:         String,
  created_at:   String,
  updated_at:   String,
  participants: Vec<String>,
}

impl EventRow {
  fn encode(e: &CalendarEvent) -> Result<Self> {
    Ok(Self {
      event_id:     encode_uuid(e.event_id),
      title:        e.title.clone(),
      description:  e.description.clone(),
      category:     encode_enum(e.category),
      priority:     encode_enum(e.priority),
      impact:       encode_enum(e.impact),
      start_at:     encode_dt(e.start_at),
      end_at:       encode_dt(e.end_at),
      owner_id:     encode_uuid(e.owner_id),
      tags:         encode_tags(&e.tags)?,
      created_at:   encode_dt(e.created_at),
      updated_at:   encode_dt(e.updated_at),
      participants: e.participant_ids.iter().copied().map(encode_uuid).collect(),
    })
  }
}

struct ShiftRow {
  shift_id:    String,
  category:    &'static str,
  start_at:    String,
  end_at:      String,
  assignee_id: String,
  backup_id:   Option<String>,
  notes:       Option<String>,
  checklist:   String,
  created_at:  String,
  updated_at:  String,
}

impl ShiftRow {
  fn encode(s: &OnCallShift) -> Result<Self> {
    Ok(Self {
      shift_id:    encode_uuid(s.shift_id),
      category:    encode_enum(s.category),
      start_at:    encode_dt(s.start_at),
      end_at:      encode_dt(s.end_at),
      assignee_id: encode_uuid(s.assignee_id),
      backup_id:   s.backup_id.map(encode_uuid),
      notes:       s.notes.clone(),
      checklist:   encode_checklist(&s.handover_checklist)?,
      created_at:  encode_dt(s.created_at),
      updated_at:  encode_dt(s.updated_at),
    })
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An opsdesk store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// are serialised onto one connection thread, and every multi-row write runs
/// in an `IMMEDIATE` transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_events(&self, sql: String, args: Vec<Value>) -> Result<Vec<CalendarEvent>> {
    let raws = self
      .conn
      .call(move |conn| Ok(query_events(conn, &sql, args)?))
      .await?;
    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn fetch_shifts(&self, sql: String, args: Vec<Value>) -> Result<Vec<OnCallShift>> {
    let raws = self
      .conn
      .call(move |conn| Ok(query_shifts(conn, &sql, args)?))
      .await?;
    raws.into_iter().map(RawShift::into_shift).collect()
  }

  async fn fetch_identity(&self, sql: &'static str, arg: String) -> Result<Option<Identity>> {
    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params![arg], RawIdentity::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawIdentity::into_identity).transpose()
  }
}

// ─── ScheduleStore impl ──────────────────────────────────────────────────────

impl ScheduleStore for SqliteStore {
  type Error = crate::Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn insert_identity(&self, identity: Identity) -> Result<Identity> {
    let id_str = encode_uuid(identity.identity_id);
    let name   = identity.name.clone();
    let email  = identity.email.clone();
    let role   = encode_enum(identity.role);
    let at_str = encode_dt(identity.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO identities (identity_id, name, email, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, email, role, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(identity)
  }

  async fn get_identity(&self, id: Uuid) -> Result<Option<Identity>> {
    self
      .fetch_identity(
        "SELECT identity_id, name, email, role, created_at
         FROM identities WHERE identity_id = ?1",
        encode_uuid(id),
      )
      .await
  }

  async fn find_identity_by_email(&self, email: String) -> Result<Option<Identity>> {
    self
      .fetch_identity(
        "SELECT identity_id, name, email, role, created_at
         FROM identities WHERE email = ?1 COLLATE NOCASE",
        email,
      )
      .await
  }

  async fn list_identities(&self) -> Result<Vec<Identity>> {
    let raws: Vec<RawIdentity> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {IDENTITY_COLUMNS} FROM identities
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawIdentity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIdentity::into_identity).collect()
  }

  async fn set_identity_role(&self, id: Uuid, role: Role) -> Result<Option<Identity>> {
    let id_str   = encode_uuid(id);
    let role_str = encode_enum(role);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE identities SET role = ?2 WHERE identity_id = ?1",
          rusqlite::params![id_str, role_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_identity(id).await
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn insert_event(&self, event: CalendarEvent) -> Result<CalendarEvent> {
    let row = EventRow::encode(&event)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
          "INSERT INTO events (
             event_id, title, description, category, priority, impact,
             start_at, end_at, owner_id, tags, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            row.event_id,
            row.title,
            row.description,
            row.category,
            row.priority,
            row.impact,
            row.start_at,
            row.end_at,
            row.owner_id,
            row.tags,
            row.created_at,
            row.updated_at,
          ],
        )?;
        insert_participants(&tx, &row.event_id, &row.participants)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn update_event(&self, event: CalendarEvent) -> Result<Option<CalendarEvent>> {
    let row = EventRow::encode(&event)?;

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
          "UPDATE events SET
             title = ?2, description = ?3, category = ?4, priority = ?5,
             impact = ?6, start_at = ?7, end_at = ?8, owner_id = ?9,
             tags = ?10, updated_at = ?11
           WHERE event_id = ?1",
          rusqlite::params![
            row.event_id,
            row.title,
            row.description,
            row.category,
            row.priority,
            row.impact,
            row.start_at,
            row.end_at,
            row.owner_id,
            row.tags,
            row.updated_at,
          ],
        )?;
        if changed == 0 {
          return Ok(false);
        }
        tx.execute(
          "DELETE FROM event_participants WHERE event_id = ?1",
          rusqlite::params![row.event_id],
        )?;
        insert_participants(&tx, &row.event_id, &row.participants)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(found.then_some(event))
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<CalendarEvent>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.event_id = ?1");
    let mut events = self
      .fetch_events(sql, vec![Value::Text(encode_uuid(id))])
      .await?;
    Ok(events.pop())
  }

  async fn delete_event(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM events WHERE event_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn find_events_for_identities(
    &self,
    identity_ids: Vec<Uuid>,
    exclude:      Option<Uuid>,
  ) -> Result<Vec<CalendarEvent>> {
    if identity_ids.is_empty() {
      return Ok(Vec::new());
    }

    let mut conds = Conditions::default();
    let placeholders = identity_ids
      .iter()
      .map(|id| conds.bind(encode_uuid(*id)))
      .collect::<Vec<_>>()
      .join(", ");
    conds.push(format!(
      "(e.owner_id IN ({placeholders}) OR EXISTS (
         SELECT 1 FROM event_participants ep
         WHERE ep.event_id = e.event_id AND ep.identity_id IN ({placeholders})))"
    ));
    if let Some(ex) = exclude {
      let p = conds.bind(encode_uuid(ex));
      conds.push(format!("e.event_id != {p}"));
    }

    let sql = format!(
      "SELECT {EVENT_COLUMNS} FROM events e {} ORDER BY e.start_at, e.rowid",
      conds.where_clause()
    );
    self.fetch_events(sql, conds.args).await
  }

  async fn list_events(&self, filter: EventFilter) -> Result<Vec<CalendarEvent>> {
    let mut conds = Conditions::default();
    if let Some(category) = filter.category {
      let p = conds.bind(encode_enum(category));
      conds.push(format!("e.category = {p}"));
    }
    if let Some(owner) = filter.owner_id {
      let p = conds.bind(encode_uuid(owner));
      conds.push(format!("e.owner_id = {p}"));
    }
    if let Some(priority) = filter.priority {
      let p = conds.bind(encode_enum(priority));
      conds.push(format!("e.priority = {p}"));
    }
    if let Some(who) = filter.involving {
      let p = conds.bind(encode_uuid(who));
      conds.push(format!(
        "(e.owner_id = {p} OR EXISTS (
           SELECT 1 FROM event_participants ep
           WHERE ep.event_id = e.event_id AND ep.identity_id = {p}))"
      ));
    }
    if let Some(window) = &filter.window {
      conds.window(window, "e.start_at", "e.end_at");
    }

    let sql = format!(
      "SELECT {EVENT_COLUMNS} FROM events e {} ORDER BY e.start_at, e.rowid",
      conds.where_clause()
    );
    self.fetch_events(sql, conds.args).await
  }

  // ── Shifts ────────────────────────────────────────────────────────────────

  async fn insert_shift(&self, shift: OnCallShift) -> Result<OnCallShift> {
    let row = ShiftRow::encode(&shift)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO shifts (
             shift_id, category, start_at, end_at, assignee_id, backup_id,
             notes, handover_checklist, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            row.shift_id,
            row.category,
            row.start_at,
            row.end_at,
            row.assignee_id,
            row.backup_id,
            row.notes,
            row.checklist,
            row.created_at,
            row.updated_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(shift)
  }

  async fn update_shift(&self, shift: OnCallShift) -> Result<Option<OnCallShift>> {
    let row = ShiftRow::encode(&shift)?;

    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
          "UPDATE shifts SET
             category = ?2, start_at = ?3, end_at = ?4, assignee_id = ?5,
             backup_id = ?6, notes = ?7, handover_checklist = ?8,
             updated_at = ?9
           WHERE shift_id = ?1",
          rusqlite::params![
            row.shift_id,
            row.category,
            row.start_at,
            row.end_at,
            row.assignee_id,
            row.backup_id,
            row.notes,
            row.checklist,
            row.updated_at,
          ],
        )?;
        tx.commit()?;
        Ok(changed)
      })
      .await?;

    Ok((changed > 0).then_some(shift))
  }

  async fn get_shift(&self, id: Uuid) -> Result<Option<OnCallShift>> {
    let sql = format!("SELECT {SHIFT_COLUMNS} FROM shifts s WHERE s.shift_id = ?1");
    let mut shifts = self
      .fetch_shifts(sql, vec![Value::Text(encode_uuid(id))])
      .await?;
    Ok(shifts.pop())
  }

  async fn delete_shift(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM shifts WHERE shift_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn find_shifts_for_identity(
    &self,
    identity_id: Uuid,
    exclude:     Option<Uuid>,
  ) -> Result<Vec<OnCallShift>> {
    let mut conds = Conditions::default();
    let p = conds.bind(encode_uuid(identity_id));
    conds.push(format!("(s.assignee_id = {p} OR s.backup_id = {p})"));
    if let Some(ex) = exclude {
      let p = conds.bind(encode_uuid(ex));
      conds.push(format!("s.shift_id != {p}"));
    }

    let sql = format!(
      "SELECT {SHIFT_COLUMNS} FROM shifts s {} ORDER BY s.start_at, s.rowid",
      conds.where_clause()
    );
    self.fetch_shifts(sql, conds.args).await
  }

  async fn list_shifts(&self, filter: ShiftFilter) -> Result<Vec<OnCallShift>> {
    let mut conds = Conditions::default();
    if let Some(who) = filter.involving {
      let p = conds.bind(encode_uuid(who));
      conds.push(format!("(s.assignee_id = {p} OR s.backup_id = {p})"));
    }
    if let Some(since) = filter.started_from {
      let p = conds.bind(encode_dt(since));
      conds.push(format!("s.start_at >= {p}"));
    }
    if let Some(window) = &filter.window {
      conds.window(window, "s.start_at", "s.end_at");
    }

    let sql = format!(
      "SELECT {SHIFT_COLUMNS} FROM shifts s {} ORDER BY s.start_at, s.rowid",
      conds.where_clause()
    );
    self.fetch_shifts(sql, conds.args).await
  }
}
