//! SQL schema for the Sophia SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- AUTOINCREMENT keeps ids from being reused after a delete.
CREATE TABLE IF NOT EXISTS arguments (
    argument_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    conclusion   TEXT    NOT NULL CHECK (conclusion != ''),
    live_version INTEGER NOT NULL DEFAULT 1,
    created_at   TEXT    NOT NULL   -- ISO 8601 UTC
);

-- Versions are append-only; rows are only ever removed together with
-- their argument.
CREATE TABLE IF NOT EXISTS argument_versions (
    argument_id   INTEGER NOT NULL REFERENCES arguments(argument_id) ON DELETE CASCADE,
    version       INTEGER NOT NULL CHECK (version >= 1),
    premises_json TEXT    NOT NULL,  -- JSON array of strings
    recorded_at   TEXT    NOT NULL,  -- ISO 8601 UTC
    PRIMARY KEY (argument_id, version)
);

CREATE INDEX IF NOT EXISTS arguments_conclusion_idx ON arguments(conclusion);

PRAGMA user_version = 1;
";
