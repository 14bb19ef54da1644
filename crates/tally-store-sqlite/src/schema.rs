//! SQL schema for the tally SQLite ledger.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subjects (
    subject_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    body        TEXT NOT NULL,
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    updated_at  TEXT NOT NULL,   -- touched by content edits only
    view_count  INTEGER NOT NULL DEFAULT 0 CHECK (view_count  >= 0),
    like_count  INTEGER NOT NULL DEFAULT 0 CHECK (like_count  >= 0),
    scrap_count INTEGER NOT NULL DEFAULT 0 CHECK (scrap_count >= 0)
);

-- Membership rows are soft-deleted, never removed.
-- A toggle-off sets removed_at; a toggle-on inserts a fresh row.
CREATE TABLE IF NOT EXISTS likes (
    membership_id INTEGER PRIMARY KEY AUTOINCREMENT,
    actor_id      INTEGER NOT NULL,
    subject_id    INTEGER NOT NULL REFERENCES subjects(subject_id),
    created_at    TEXT NOT NULL,
    removed_at    TEXT             -- NULL while the row is active
);

CREATE TABLE IF NOT EXISTS scraps (
    membership_id INTEGER PRIMARY KEY AUTOINCREMENT,
    actor_id      INTEGER NOT NULL,
    subject_id    INTEGER NOT NULL REFERENCES subjects(subject_id),
    created_at    TEXT NOT NULL,
    removed_at    TEXT
);

-- At most one ACTIVE row per (actor, subject) pair. The partial index
-- doubles as the natural mutex for racing activations.
CREATE UNIQUE INDEX IF NOT EXISTS likes_active_pair_idx
    ON likes(actor_id, subject_id) WHERE removed_at IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS scraps_active_pair_idx
    ON scraps(actor_id, subject_id) WHERE removed_at IS NULL;

CREATE INDEX IF NOT EXISTS likes_subject_idx  ON likes(subject_id);
CREATE INDEX IF NOT EXISTS scraps_subject_idx ON scraps(subject_id);

PRAGMA user_version = 1;
";
