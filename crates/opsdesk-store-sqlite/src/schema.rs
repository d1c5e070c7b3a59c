//! SQL schema for the opsdesk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Timestamps are fixed-width RFC 3339 UTC strings, so string comparison and
/// `ORDER BY` agree with chronological order.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS identities (
    identity_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    role        TEXT NOT NULL,   -- 'administrator' | 'manager' | 'member'
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    event_id    TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT,
    category    TEXT NOT NULL,   -- 'maintenance' | 'change' | 'meeting' | 'task'
    priority    TEXT NOT NULL,   -- 'low' | 'medium' | 'high'
    impact      TEXT NOT NULL,   -- 'customer' | 'service' | 'internal'
    start_at    TEXT NOT NULL,
    end_at      TEXT NOT NULL,
    owner_id    TEXT NOT NULL REFERENCES identities(identity_id),
    tags        TEXT NOT NULL DEFAULT '[]',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    CHECK (end_at > start_at)
);

-- Replaced wholesale whenever an event's participant list changes.
CREATE TABLE IF NOT EXISTS event_participants (
    event_id    TEXT NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
    identity_id TEXT NOT NULL REFERENCES identities(identity_id),
    position    INTEGER NOT NULL,
    PRIMARY KEY (event_id, identity_id)
);

CREATE TABLE IF NOT EXISTS shifts (
    shift_id           TEXT PRIMARY KEY,
    category           TEXT NOT NULL,   -- 'day' | 'night' | 'weekend'
    start_at           TEXT NOT NULL,
    end_at             TEXT NOT NULL,
    assignee_id        TEXT NOT NULL REFERENCES identities(identity_id),
    backup_id          TEXT REFERENCES identities(identity_id),
    notes              TEXT,
    handover_checklist TEXT NOT NULL DEFAULT '{}',   -- opaque JSON object
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL,
    CHECK (end_at > start_at)
);

CREATE INDEX IF NOT EXISTS events_owner_idx        ON events(owner_id);
CREATE INDEX IF NOT EXISTS events_start_idx        ON events(start_at);
CREATE INDEX IF NOT EXISTS participants_ident_idx  ON event_participants(identity_id);
CREATE INDEX IF NOT EXISTS shifts_assignee_idx     ON shifts(assignee_id);
CREATE INDEX IF NOT EXISTS shifts_backup_idx       ON shifts(backup_id);
CREATE INDEX IF NOT EXISTS shifts_start_idx        ON shifts(start_at);

PRAGMA user_version = 1;
";
